//! Hosted transactional-email API implementation

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    communication::mailer::{
        DeliveryResult, MailPayload, MailerError, Transport, TransportFactory,
    },
    settings::ConfigSource,
};

/// The provider API key
pub const RESEND_API_KEY: &str = "RESEND_API_KEY";

/// Override for the provider's base URL
pub const RESEND_API_URL: &str = "RESEND_API_URL";

const DEFAULT_API_URL: &str = "https://api.resend.com";

/// Accepted message, as reported by the provider
#[derive(Debug, Deserialize)]
pub struct ApiReceipt {
    /// The provider's message id
    pub id: String,
}

/// Rejection, as reported by the provider
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// What went wrong
    pub message: String,

    /// The provider's error code
    #[serde(default)]
    pub name: Option<String>,
}

/// The provider's result: exactly one of `data` or `error` is expected.
#[derive(Debug, Default, Deserialize)]
pub struct ApiOutcome {
    /// Set when the message was accepted
    #[serde(default)]
    pub data: Option<ApiReceipt>,

    /// Set when the message was rejected
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl ApiOutcome {
    async fn from_response(response: Response) -> Result<Self, MailerError> {
        let status = response.status();
        let body = response.text().await.map_err(MailerError::failed)?;

        if status.is_success() {
            let data = serde_json::from_str::<ApiReceipt>(&body).map_err(MailerError::failed)?;

            return Ok(Self {
                data: Some(data),
                error: None,
            });
        }

        let error = serde_json::from_str::<ApiErrorBody>(&body).unwrap_or_else(|_| ApiErrorBody {
            message: format!("provider responded with {status}"),
            name: None,
        });

        Ok(Self {
            data: None,
            error: Some(error),
        })
    }

    /// Turns a populated `error` into a raised delivery error.
    pub fn into_result(self) -> Result<DeliveryResult, MailerError> {
        match (self.data, self.error) {
            (_, Some(error)) => {
                debug!(name = ?error.name, "provider rejected email");

                Err(MailerError::rejected(error.message))
            }
            (Some(data), None) => Ok(DeliveryResult::Api { id: data.id }),
            (None, None) => Err(MailerError::rejected(
                "provider returned neither a receipt nor an error",
            )),
        }
    }
}

/// Builds [`ResendMailer`]s from `RESEND_*` settings
#[derive(Debug, Default, Clone, Copy)]
pub struct ResendTransportFactory;

impl TransportFactory for ResendTransportFactory {
    type Transport = ResendMailer;

    fn build(&self, config: &dyn ConfigSource) -> Result<ResendMailer, MailerError> {
        let api_key = config.get_non_empty(RESEND_API_KEY).ok_or_else(|| {
            MailerError::configuration(format!("{RESEND_API_KEY} is not set"))
        })?;

        let api_url = config
            .get_non_empty(RESEND_API_URL)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        ResendMailer::new(api_url.trim(), api_key.trim())
    }
}

/// Hosted API mailer
pub struct ResendMailer {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ResendMailer {
    /// Create a new API mailer
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, MailerError> {
        let client = Client::builder().build().map_err(|e| {
            MailerError::configuration(format!("could not build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendMailer")
            .field("api_url", &self.api_url)
            .field("api_key", &"********")
            .finish()
    }
}

#[async_trait]
impl Transport for ResendMailer {
    async fn deliver(&self, payload: &MailPayload) -> Result<DeliveryResult, MailerError> {
        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(MailerError::failed)?;

        ApiOutcome::from_response(response).await?.into_result()
    }
}
