//! Transport strategies

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::settings::ConfigSource;

use super::{errors::MailerError, message::MailPayload};

/// What the backend reported after accepting a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum DeliveryResult {
    /// The relay's reply to the submission
    Relay {
        /// The SMTP reply code
        code: String,

        /// The reply text, one entry per line
        message: Vec<String>,
    },

    /// The provider's acknowledgement
    Api {
        /// The provider's message id
        id: String,
    },
}

/// A constructed client able to deliver messages through one backend.
///
/// Implementations report every failure as [`MailerError::DeliverySend`],
/// whether the backend raised it or returned it as a value.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Deliver a single payload
    async fn deliver(&self, payload: &MailPayload) -> Result<DeliveryResult, MailerError>;
}

/// Builds a [`Transport`] from settings.
pub trait TransportFactory: Send + Sync + 'static {
    /// The transport produced by this factory
    type Transport: Transport;

    /// Reads credentials from `config` and builds the transport.
    ///
    /// Must return [`MailerError::TransportConfiguration`] without side effects
    /// when a mandatory setting is missing.
    fn build(&self, config: &dyn ConfigSource) -> Result<Self::Transport, MailerError>;
}
