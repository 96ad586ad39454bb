//! Enquiry draft entity: the parent and children form payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use eq_shared::phone::{CanonicalPhone, PhoneValidator};
use eq_shared::validation::{validators, Validate, ValidationErrors};

use crate::errors::{DomainError, DomainResult};

/// Maximum number of children on one enquiry
pub const MAX_CHILDREN: usize = 5;

/// Date format the backend expects for `todaysDate`
pub const TODAYS_DATE_FORMAT: &str = "%m/%d/%Y";

pub const MSG_CHILD_REQUIRED: &str =
    "Please add at least one child with name, age, and course selection";
pub const MSG_PARENT_REQUIRED: &str = "Please enter parent name";
pub const MSG_EMAIL_INVALID: &str = "Please enter a valid email address";
pub const MSG_CONSENT_REQUIRED: &str = "Please provide consent to continue";
pub const MSG_TOO_MANY_CHILDREN: &str = "You can add at most 5 children";

/// Programs a child can be enrolled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
    #[serde(rename = "imaths")]
    IMaths,
    Ucmas,
    Obotz,
}

impl Program {
    pub const ALL: [Program; 3] = [Program::IMaths, Program::Ucmas, Program::Obotz];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::IMaths => "imaths",
            Program::Ucmas => "ucmas",
            Program::Obotz => "obotz",
        }
    }

    /// Name shown to the user
    pub fn display_name(&self) -> &'static str {
        match self {
            Program::IMaths => "i-Maths",
            Program::Ucmas => "UCMAS",
            Program::Obotz => "OBOTZ",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imaths" | "i-maths" => Ok(Program::IMaths),
            "ucmas" => Ok(Program::Ucmas),
            "obotz" => Ok(Program::Obotz),
            _ => Err(format!("Unknown program: {}", s)),
        }
    }
}

/// One child on the enquiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub selected_course: Option<Program>,
}

impl ChildRecord {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
            age: String::new(),
            selected_course: None,
        }
    }

    /// Name, age and program all filled in
    pub fn is_complete(&self) -> bool {
        validators::not_empty(&self.name)
            && validators::not_empty(&self.age)
            && self.selected_course.is_some()
    }
}

/// The enquiry form as the user builds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryDraft {
    pub children: Vec<ChildRecord>,

    #[serde(default)]
    pub parent_name: String,

    /// Phone exactly as typed on the form
    #[serde(default)]
    pub contact_number: String,

    /// Canonical dialable form, filled in when the draft is snapshotted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<CanonicalPhone>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub consent: bool,

    /// `MM/DD/YYYY` date the form was started
    #[serde(default = "default_todays_date")]
    pub todays_date: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_todays_date() -> String {
    Utc::now().format(TODAYS_DATE_FORMAT).to_string()
}

impl Default for EnquiryDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl EnquiryDraft {
    /// Creates an empty draft with one blank child
    pub fn new() -> Self {
        Self::created_at(Utc::now())
    }

    /// Creates an empty draft stamped with the given creation time
    pub fn created_at(now: DateTime<Utc>) -> Self {
        Self {
            children: vec![ChildRecord::new(1)],
            parent_name: String::new(),
            contact_number: String::new(),
            phone: None,
            email: None,
            consent: false,
            todays_date: now.format(TODAYS_DATE_FORMAT).to_string(),
            created_at: now,
        }
    }

    /// Appends a blank child and returns its id
    ///
    /// # Returns
    ///
    /// * `Ok(id)` - Id of the new child
    /// * `Err(DomainError::Validation)` - The draft already holds the maximum
    pub fn add_child(&mut self) -> DomainResult<u64> {
        if self.children.len() >= MAX_CHILDREN {
            let mut errors = ValidationErrors::new();
            errors.add_error("children", MSG_TOO_MANY_CHILDREN, "too_many_children");
            return Err(DomainError::Validation(errors));
        }

        let id = self.children.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        self.children.push(ChildRecord::new(id));
        Ok(id)
    }

    /// Removes a child; the last remaining child cannot be removed
    pub fn remove_child(&mut self, id: u64) -> bool {
        if self.children.len() <= 1 {
            return false;
        }
        let before = self.children.len();
        self.children.retain(|c| c.id != id);
        self.children.len() != before
    }

    /// Applies `update` to the child with `id`; returns false if there is none
    pub fn update_child<F>(&mut self, id: u64, update: F) -> bool
    where
        F: FnOnce(&mut ChildRecord),
    {
        match self.children.iter_mut().find(|c| c.id == id) {
            Some(child) => {
                update(child);
                true
            }
            None => false,
        }
    }

    /// Collects every violated field rule for the given phone entry screen
    pub fn validate_with(&self, phone_validator: &PhoneValidator) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.children.iter().any(ChildRecord::is_complete) {
            errors.add_error("children", MSG_CHILD_REQUIRED, "child_required");
        }
        if self.children.len() > MAX_CHILDREN {
            errors.add_error("children", MSG_TOO_MANY_CHILDREN, "too_many_children");
        }

        if !validators::not_empty(&self.parent_name) {
            errors.add_error("parentName", MSG_PARENT_REQUIRED, "required");
        }

        if let Err(e) = phone_validator.validate(&self.contact_number) {
            errors.add_error("contactNumber", e.user_message(), "invalid_phone");
        }

        if let Some(email) = self.email.as_deref().filter(|e| validators::not_empty(e)) {
            if !validators::is_valid_email(email) {
                errors.add_error("email", MSG_EMAIL_INVALID, "invalid_email");
            }
        }

        if !self.consent {
            errors.add_error("consent", MSG_CONSENT_REQUIRED, "consent_required");
        }

        errors.into_result()
    }

    /// Validates the draft and freezes it for a verification session
    ///
    /// The canonical phone is derived from `contact_number` here so the
    /// snapshot always carries the dialable form.
    pub fn into_snapshot(mut self, phone_validator: &PhoneValidator) -> Result<EnquirySnapshot, ValidationErrors> {
        self.validate_with(phone_validator)?;

        let phone = phone_validator.validate(&self.contact_number).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add_error("contactNumber", e.user_message(), "invalid_phone");
            errors
        })?;
        self.phone = Some(phone);

        Ok(EnquirySnapshot(Arc::new(self)))
    }
}

impl Validate for EnquiryDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_with(&PhoneValidator::default())
    }
}

/// Immutable, validated draft shared with the session for the submission step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquirySnapshot(Arc<EnquiryDraft>);

impl Serialize for EnquirySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl EnquirySnapshot {
    /// Canonical phone; always present on a snapshot
    pub fn phone(&self) -> Option<&CanonicalPhone> {
        self.0.phone.as_ref()
    }

    pub fn draft(&self) -> &EnquiryDraft {
        &self.0
    }
}

impl Deref for EnquirySnapshot {
    type Target = EnquiryDraft;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
