//! Email service module

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

mod errors;
mod gateway;
mod message;
mod sender;
mod transport;

pub use errors::MailerError;
pub use gateway::MailGateway;
pub use message::{Body, MailPayload, Message, Recipients};
pub use sender::{SenderDefaults, APP_ENV, FROM_EMAIL, NODE_ENV};
pub use transport::{DeliveryResult, Transport, TransportFactory};

/// Email service
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send an email
    ///
    /// # Arguments
    /// * `message` - The [`Message`] to send.
    ///
    /// # Returns
    /// - [`Ok`] with the backend's [`DeliveryResult`] if the message was accepted.
    /// - [`Err`] with [`MailerError::TransportConfiguration`] if the transport could not be built.
    /// - [`Err`] with [`MailerError::DeliverySend`] if the backend failed to send it.
    async fn send_mail(&self, message: &Message) -> Result<DeliveryResult, MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn send_mail(&self, message: &Message) -> Result<DeliveryResult, MailerError>;
    }
}

#[cfg(test)]
pub mod tests {
    pub use super::MockMailer;
}
