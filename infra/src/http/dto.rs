//! Wire bodies of the verification backend

use serde::{Deserialize, Serialize};

use eq_core::EnquiryDraft;

/// `POST /request`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestChallengeBody<'a> {
    pub phone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_data: Option<&'a EnquiryDraft>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestChallengeResponse {
    pub request_id: String,
}

/// `POST /verify`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeBody<'a> {
    pub request_id: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeResponse {
    #[serde(default)]
    pub ok: bool,
}

/// `POST /submit` response; the request body is the draft itself
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEnquiryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub enquiry_id: String,
}
