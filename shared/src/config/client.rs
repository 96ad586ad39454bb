//! Backend API client configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Connection settings for the verification backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiClientConfig {
    /// Base URL of the API stage, e.g. `https://api.example.com/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static API key sent as `x-api-key` when the deployment requires one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Transport-level timeout for one request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Path of the request-challenge endpoint
    #[serde(default = "default_request_path")]
    pub request_path: String,

    /// Path of the verify-code endpoint
    #[serde(default = "default_verify_path")]
    pub verify_path: String,

    /// Path of the submit-enquiry endpoint
    #[serde(default = "default_submit_path")]
    pub submit_path: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
            request_path: default_request_path(),
            verify_path: default_verify_path(),
            submit_path: default_submit_path(),
        }
    }
}

impl ApiClientConfig {
    /// Create a configuration pointing at `base_url` with default paths
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Attach a static API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Load from flat environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("ENQUIRY_API_URL").unwrap_or(defaults.base_url),
            api_key: env::var("ENQUIRY_API_KEY").ok().filter(|k| !k.is_empty()),
            request_timeout_secs: env::var("ENQUIRY_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            ..defaults
        }
    }
}

fn default_base_url() -> String {
    String::from("http://localhost:3000")
}

fn default_request_timeout() -> u64 {
    30
}

fn default_request_path() -> String {
    String::from("/request")
}

fn default_verify_path() -> String {
    String::from("/verify")
}

fn default_submit_path() -> String {
    String::from("/submit")
}
