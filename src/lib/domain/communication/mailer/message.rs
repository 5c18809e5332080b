//! Email message

use std::fmt;

use serde::{Deserialize, Serialize};

/// One or more destinations for a message.
///
/// Addresses are passed through to the transport as given; it is up to the
/// backend to reject malformed ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A single address
    One(String),

    /// A list of addresses
    Many(Vec<String>),
}

impl Recipients {
    /// Iterates over every address.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let addresses: &[String] = match self {
            Recipients::One(address) => std::slice::from_ref(address),
            Recipients::Many(addresses) => addresses,
        };

        addresses.iter().map(String::as_str)
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Recipients::One(address.to_string())
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Recipients::One(address)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Recipients::Many(addresses)
    }
}

impl fmt::Display for Recipients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().collect::<Vec<_>>().join(", "))
    }
}

/// The content of a message. At least one representation is always present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// Plain text only
    Text(String),

    /// HTML only
    Html(String),

    /// Plain text with an HTML alternative
    Both {
        /// The plain text version
        text: String,

        /// The HTML version
        html: String,
    },
}

impl Body {
    /// The plain text version, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Body::Text(text) | Body::Both { text, .. } => Some(text.as_str()),
            Body::Html(_) => None,
        }
    }

    /// The HTML version, if any.
    pub fn html(&self) -> Option<&str> {
        match self {
            Body::Html(html) | Body::Both { html, .. } => Some(html.as_str()),
            Body::Text(_) => None,
        }
    }

    /// Builds a body from optional parts, or `None` when both are missing.
    pub fn from_parts(text: Option<String>, html: Option<String>) -> Option<Self> {
        match (text, html) {
            (Some(text), Some(html)) => Some(Body::Both { text, html }),
            (Some(text), None) => Some(Body::Text(text)),
            (None, Some(html)) => Some(Body::Html(html)),
            (None, None) => None,
        }
    }
}

/// Email message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The recipients of the email
    pub to: Recipients,

    /// The subject of the email
    pub subject: String,

    /// The body of the email
    pub body: Body,
}

impl Message {
    /// Create a new message
    pub fn new(to: impl Into<Recipients>, subject: impl Into<String>, body: Body) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body,
        }
    }
}

/// What a transport is asked to deliver: the message plus the resolved sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MailPayload {
    /// The sender address
    pub from: String,

    /// The recipients
    pub to: Recipients,

    /// The subject line
    pub subject: String,

    /// The plain text body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// The HTML body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl MailPayload {
    /// Combines a message with its resolved sender.
    pub fn new(from: String, message: &Message) -> Self {
        Self {
            from,
            to: message.to.clone(),
            subject: message.subject.clone(),
            text: message.body.text().map(str::to_string),
            html: message.body.html().map(str::to_string),
        }
    }
}
