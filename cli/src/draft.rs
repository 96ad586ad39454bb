//! Loading the enquiry draft the session verifies

use anyhow::Context;
use std::path::Path;

use eq_core::EnquiryDraft;

/// Read a draft from a JSON file in the wire shape (camelCase)
pub fn load_draft(path: &Path) -> anyhow::Result<EnquiryDraft> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading draft file {}", path.display()))?;
    parse_draft(&text).with_context(|| format!("parsing draft file {}", path.display()))
}

pub fn parse_draft(text: &str) -> anyhow::Result<EnquiryDraft> {
    Ok(serde_json::from_str(text)?)
}
