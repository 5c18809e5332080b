//! Outbound communication with users

pub mod mailer;
