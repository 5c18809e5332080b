//! Mailer errors

use thiserror::Error;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The transport could not be built from the current configuration
    #[error("mail transport is not configured: {0}")]
    TransportConfiguration(String),

    /// The backend rejected the message or failed to transmit it
    #[error("could not send email: {message}")]
    DeliverySend {
        /// The backend's description of the failure
        message: String,

        /// The underlying backend error, when one was raised
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MailerError {
    /// A configuration error naming the missing or invalid settings.
    pub fn configuration(detail: impl Into<String>) -> Self {
        MailerError::TransportConfiguration(detail.into())
    }

    /// A delivery error reported as a value by the backend.
    pub fn rejected(message: impl Into<String>) -> Self {
        MailerError::DeliverySend {
            message: message.into(),
            source: None,
        }
    }

    /// A delivery error raised by the backend client.
    pub fn failed<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MailerError::DeliverySend {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
