//! Email transports
//!
//! Both transports are always compiled. The `hosted-api` cargo feature picks
//! the one the binaries deliver through.

pub mod resend;
pub mod smtp;

use std::sync::Arc;

use clap::Parser;

use crate::{
    domain::communication::mailer::{MailGateway, SenderDefaults},
    infrastructure::config::EnvConfig,
};

/// The transport factory selected at build time
#[cfg(not(feature = "hosted-api"))]
pub type DefaultTransportFactory = smtp::SmtpTransportFactory;

/// The transport factory selected at build time
#[cfg(feature = "hosted-api")]
pub type DefaultTransportFactory = resend::ResendTransportFactory;

/// The gateway the binaries send through
pub type DefaultMailGateway = MailGateway<DefaultTransportFactory>;

/// Mailer configuration
///
/// Transport credentials are not part of this: they are read from the
/// environment when the first message is sent.
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct MailerConfig {
    /// Sender used in production when `FROM_EMAIL` is not set
    #[arg(
        long,
        env = "MAIL_FALLBACK_FROM_PRODUCTION",
        default_value = "no-reply@example.com"
    )]
    pub fallback_from_production: String,

    /// Sender used outside production when `FROM_EMAIL` is not set
    #[arg(
        long,
        env = "MAIL_FALLBACK_FROM_DEVELOPMENT",
        default_value = "no-reply@localhost"
    )]
    pub fallback_from_development: String,
}

impl MailerConfig {
    /// The fallback sender addresses
    pub fn sender_defaults(&self) -> SenderDefaults {
        SenderDefaults {
            production: self.fallback_from_production.clone(),
            development: self.fallback_from_development.clone(),
        }
    }

    /// A gateway over the build-time transport, reading credentials from the environment.
    pub fn gateway(&self) -> DefaultMailGateway {
        MailGateway::new(
            DefaultTransportFactory::default(),
            Arc::new(EnvConfig),
            self.sender_defaults(),
        )
    }
}
