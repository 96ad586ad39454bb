//! reqwest implementation of the verification transport
//!
//! Each operation is one POST with a JSON body. Nothing is retried here;
//! retry is always a user action driven by the session.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, warn};

use eq_core::{ChallengeTicket, EnquiryDraft, RequestId, SubmitReceipt, TransportError, VerificationTransport};
use eq_shared::phone::{mask_phone_number, CanonicalPhone};
use eq_shared::utils::validate_otp_shape;
use eq_shared::{ApiClientConfig, AppConfig, ErrorResponse};

use super::classify::{classify_request_error, classify_submit_error, classify_verify_error};
use super::dto::{
    RequestChallengeBody, RequestChallengeResponse, SubmitEnquiryResponse, VerifyCodeBody, VerifyCodeResponse,
};
use crate::InfrastructureError;

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "x-api-key";

const NETWORK_ERROR_MESSAGE: &str = "Unable to reach the verification service";

const CODE_SHAPE_MESSAGE: &str = "Verification code length does not match the service";

#[derive(Debug, Clone)]
struct Endpoints {
    request: Url,
    verify: Url,
    submit: Url,
}

impl Endpoints {
    fn resolve(config: &ApiClientConfig) -> Result<Self, InfrastructureError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| InfrastructureError::Url(format!("{}: {}", config.base_url, e)))?;

        let join = |path: &str| {
            base.join(path.trim_start_matches('/'))
                .map_err(|e| InfrastructureError::Url(format!("{}: {}", path, e)))
        };

        Ok(Self {
            request: join(&config.request_path)?,
            verify: join(&config.verify_path)?,
            submit: join(&config.submit_path)?,
        })
    }
}

/// Verification transport talking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpVerificationTransport {
    client: Client,
    endpoints: Endpoints,
    otp_length: usize,
}

impl HttpVerificationTransport {
    /// Create a transport for the given backend
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, endpoint paths, API key and timeout
    /// * `otp_length` - Code length checked before a verify request is sent
    pub fn new(config: &ApiClientConfig, otp_length: usize) -> Result<Self, InfrastructureError> {
        let endpoints = Endpoints::resolve(config)?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = config.api_key.as_deref() {
            let value = HeaderValue::from_str(api_key)
                .map_err(|_| InfrastructureError::Config("API key contains invalid header characters".to_string()))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        debug!(
            request = %endpoints.request,
            verify = %endpoints.verify,
            submit = %endpoints.submit,
            "HTTP verification transport initialized"
        );

        Ok(Self {
            client,
            endpoints,
            otp_length,
        })
    }

    /// Create from the application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, InfrastructureError> {
        Self::new(&config.api, config.verification.transport_otp_length)
    }

    async fn post<B, R>(&self, url: &Url, body: &B) -> Result<Result<R, (u16, ErrorResponse)>, TransportError>
    where
        B: serde::Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.client.post(url.clone()).json(body).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Verification backend unreachable");
            TransportError::service(NETWORK_ERROR_MESSAGE)
        })?;

        read_response(url, response).await
    }
}

/// Splits a response into the success body or the status and error body
async fn read_response<R: DeserializeOwned>(
    url: &Url,
    response: Response,
) -> Result<Result<R, (u16, ErrorResponse)>, TransportError> {
    let status = response.status();
    let text = response.text().await.map_err(|e| {
        warn!(url = %url, error = %e, "Failed to read backend response");
        TransportError::service(NETWORK_ERROR_MESSAGE)
    })?;

    if status.is_success() {
        return serde_json::from_str::<R>(&text).map(Ok).map_err(|e| {
            error!(url = %url, status = status.as_u16(), error = %e, "Malformed success body");
            TransportError::service("Unexpected response from the verification service")
        });
    }

    let body = serde_json::from_str::<ErrorResponse>(&text).unwrap_or_else(|_| ErrorResponse::new(String::new()));
    debug!(url = %url, status = status.as_u16(), code = ?body.code, "Backend returned an error");
    Ok(Err((status.as_u16(), body)))
}

#[async_trait]
impl VerificationTransport for HttpVerificationTransport {
    async fn request_challenge(
        &self,
        phone: &CanonicalPhone,
        form: Option<&EnquiryDraft>,
    ) -> Result<ChallengeTicket, TransportError> {
        let masked = mask_phone_number(phone.as_str());

        // Fail closed on anything that is not already canonical
        if CanonicalPhone::parse(phone.as_str()).is_none() {
            error!(phone = %masked, "Refusing to request a code for a malformed phone number");
            return Err(TransportError::InvalidPhone { phone: masked });
        }

        let body = RequestChallengeBody {
            phone: phone.as_str(),
            form_data: form,
        };
        match self
            .post::<_, RequestChallengeResponse>(&self.endpoints.request, &body)
            .await?
        {
            Ok(response) if !response.request_id.is_empty() => Ok(ChallengeTicket {
                request_id: RequestId::new(response.request_id),
            }),
            Ok(_) => Err(TransportError::service("Unexpected response from the verification service")),
            Err((status, body)) => Err(classify_request_error(status, &body, &masked)),
        }
    }

    async fn verify_code(&self, request_id: &RequestId, code: &str) -> Result<(), TransportError> {
        // The session only sends complete codes, so a mismatch is a setup error
        if !validate_otp_shape(code, self.otp_length) {
            error!(
                request_id = %request_id,
                expected = self.otp_length,
                actual = code.len(),
                "Code failed pre-flight shape check"
            );
            return Err(TransportError::service(CODE_SHAPE_MESSAGE));
        }

        let body = VerifyCodeBody {
            request_id: request_id.as_str(),
            otp: code,
        };
        match self
            .post::<_, VerifyCodeResponse>(&self.endpoints.verify, &body)
            .await?
        {
            Ok(VerifyCodeResponse { ok: true }) => Ok(()),
            Ok(VerifyCodeResponse { ok: false }) => Err(TransportError::InvalidCode),
            Err((status, body)) => Err(classify_verify_error(status, &body)),
        }
    }

    async fn submit_enquiry(&self, draft: &EnquiryDraft) -> Result<SubmitReceipt, TransportError> {
        match self
            .post::<_, SubmitEnquiryResponse>(&self.endpoints.submit, draft)
            .await?
        {
            Ok(response) => Ok(SubmitReceipt {
                success: response.success,
                enquiry_id: response.enquiry_id,
            }),
            Err((status, body)) => Err(classify_submit_error(status, &body)),
        }
    }
}
