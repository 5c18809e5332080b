//! SMTP email service implementation

use std::fmt;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Mailboxes, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
        response::Response,
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::domain::{
    communication::mailer::{
        DeliveryResult, MailPayload, MailerError, Transport, TransportFactory,
    },
    settings::ConfigSource,
};

/// The SMTP host
pub const SMTP_HOST: &str = "SMTP_HOST";
/// The SMTP port
pub const SMTP_PORT: &str = "SMTP_PORT";
/// The SMTP username
pub const SMTP_USER: &str = "SMTP_USER";
/// The SMTP password
pub const SMTP_PASS: &str = "SMTP_PASS";
/// Force implicit TLS on or off
pub const SMTP_SECURE: &str = "SMTP_SECURE";
/// Verify the relay's TLS certificate
pub const SMTP_VERIFY_TLS: &str = "SMTP_VERIFY_TLS";

const DEFAULT_PORT: u16 = 587;
const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP configuration
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// The SMTP host
    pub host: String,

    /// The SMTP port
    pub port: u16,

    /// The SMTP username
    pub username: String,

    /// The SMTP password
    pub password: String,

    /// Explicit choice of implicit TLS, if any
    pub secure: Option<bool>,

    /// Verify the TLS certificate
    pub verify_tls: bool,
}

impl SmtpConfig {
    /// Reads the SMTP settings, failing if any credential is missing.
    pub fn from_source(config: &dyn ConfigSource) -> Result<Self, MailerError> {
        let missing: Vec<&str> = [SMTP_HOST, SMTP_USER, SMTP_PASS]
            .into_iter()
            .filter(|key| config.get_non_empty(key).is_none())
            .collect();

        let (Some(host), Some(username), Some(password)) = (
            config.get_non_empty(SMTP_HOST),
            config.get_non_empty(SMTP_USER),
            config.get_non_empty(SMTP_PASS),
        ) else {
            return Err(MailerError::configuration(format!(
                "SMTP credentials missing, set {}",
                missing.join(", ")
            )));
        };

        let port = match config.get_non_empty(SMTP_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                MailerError::configuration(format!("{SMTP_PORT} is not a valid port: \"{raw}\""))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: host.trim().to_string(),
            port,
            username,
            password,
            secure: flag(config, SMTP_SECURE)?,
            verify_tls: flag(config, SMTP_VERIFY_TLS)?.unwrap_or(true),
        })
    }

    /// Whether to connect with implicit TLS.
    ///
    /// An explicit setting wins; otherwise only the standard implicit TLS
    /// port is secure.
    pub fn secure(&self) -> bool {
        self.secure.unwrap_or(self.port == IMPLICIT_TLS_PORT)
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("secure", &self.secure)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

fn flag(config: &dyn ConfigSource, key: &str) -> Result<Option<bool>, MailerError> {
    config
        .get_non_empty(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(MailerError::configuration(format!(
                "{key} must be true or false, got \"{raw}\""
            ))),
        })
        .transpose()
}

/// Builds [`SmtpMailer`]s from `SMTP_*` settings
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpTransportFactory;

impl TransportFactory for SmtpTransportFactory {
    type Transport = SmtpMailer;

    fn build(&self, config: &dyn ConfigSource) -> Result<SmtpMailer, MailerError> {
        SmtpMailer::new(&SmtpConfig::from_source(config)?)
    }
}

/// SMTP mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a new SMTP mailer. No connection is made until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let parameters = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| {
                MailerError::configuration(format!("invalid TLS settings for {}: {e}", config.host))
            })?;

        let tls = if config.secure() {
            Tls::Wrapper(parameters)
        } else {
            Tls::Opportunistic(parameters)
        };

        debug!(
            host = %config.host,
            port = config.port,
            secure = config.secure(),
            "configured SMTP relay"
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SmtpMailer {
    async fn deliver(&self, payload: &MailPayload) -> Result<DeliveryResult, MailerError> {
        let email = build_message(payload)?;

        self.transport
            .send(email)
            .await
            .map(|response| receipt(&response))
            .map_err(MailerError::failed)
    }
}

fn build_message(payload: &MailPayload) -> Result<Message, MailerError> {
    let mut builder = Message::builder()
        .from(payload.from.parse::<Mailbox>().map_err(MailerError::failed)?)
        .subject(payload.subject.clone());

    for recipient in payload.to.iter() {
        let mailboxes: Mailboxes = recipient.parse().map_err(MailerError::failed)?;

        for mailbox in mailboxes {
            builder = builder.to(mailbox);
        }
    }

    let email = match (&payload.text, &payload.html) {
        (Some(text), Some(html)) => {
            builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (Some(text), None) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
        (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        (None, None) => builder.header(ContentType::TEXT_PLAIN).body(String::new()),
    };

    email.map_err(MailerError::failed)
}

fn receipt(response: &Response) -> DeliveryResult {
    DeliveryResult::Relay {
        code: response.code().to_string(),
        message: response.message().map(|line| line.to_string()).collect(),
    }
}
