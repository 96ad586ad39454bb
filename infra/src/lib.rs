//! # Infrastructure Layer
//!
//! Concrete [`VerificationTransport`] implementations for the enquiry
//! verification session.
//!
//! ## Transports
//!
//! - **HTTP**: JSON over reqwest against the verification backend
//! - **Mock**: in-memory backend that logs issued codes, for development

use std::sync::Arc;

use eq_core::VerificationTransport;
use eq_shared::AppConfig;

/// HTTP transport, wire bodies and error classification
pub mod http;

/// In-memory development backend
pub mod mock;

pub use http::HttpVerificationTransport;
pub use mock::MockVerificationTransport;

/// Create the verification transport selected by configuration
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `use_mock` - Use the in-memory backend instead of HTTP
pub fn create_transport(
    config: &AppConfig,
    use_mock: bool,
) -> Result<Arc<dyn VerificationTransport>, InfrastructureError> {
    if use_mock {
        tracing::warn!("Using the mock verification backend; codes are printed to the log");
        return Ok(Arc::new(MockVerificationTransport::with_options(
            config.verification.ttl_seconds,
            config.verification.transport_otp_length,
            false,
        )));
    }

    let transport = HttpVerificationTransport::from_config(config)?;
    tracing::info!(base_url = %config.api.base_url, "Using the HTTP verification backend");
    Ok(Arc::new(transport))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed backend URL
    #[error("Invalid backend URL: {0}")]
    Url(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_mock_transport() {
        let config = AppConfig::default();
        let transport = create_transport(&config, true).unwrap();
        let phone = eq_shared::phone::CanonicalPhone::parse("+14155552671").unwrap();
        assert!(transport.request_challenge(&phone, None).await.is_ok());
    }

    #[test]
    fn test_create_http_transport_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "::not a url".to_string();
        assert!(matches!(
            create_transport(&config, false),
            Err(InfrastructureError::Url(_))
        ));
    }
}
