//! Sender identity resolution

use crate::domain::settings::ConfigSource;

/// Setting that overrides the sender address
pub const FROM_EMAIL: &str = "FROM_EMAIL";

/// Setting naming the deployment environment
pub const NODE_ENV: &str = "NODE_ENV";

/// Alias for [`NODE_ENV`], read only when that is unset
pub const APP_ENV: &str = "APP_ENV";

/// Fallback sender addresses, used when [`FROM_EMAIL`] is not set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SenderDefaults {
    /// Fallback when `NODE_ENV` is `production`
    pub production: String,

    /// Fallback in every other environment
    pub development: String,
}

impl Default for SenderDefaults {
    fn default() -> Self {
        Self {
            production: "no-reply@example.com".to_string(),
            development: "no-reply@localhost".to_string(),
        }
    }
}

impl SenderDefaults {
    /// Resolves the sender address from the current settings.
    ///
    /// An explicit [`FROM_EMAIL`] always wins, whatever the environment.
    pub fn resolve(&self, config: &dyn ConfigSource) -> String {
        if let Some(from) = config.get_non_empty(FROM_EMAIL) {
            return from;
        }

        let environment = config
            .get_non_empty(NODE_ENV)
            .or_else(|| config.get_non_empty(APP_ENV));

        match environment.as_deref().map(str::trim) {
            Some("production") => self.production.clone(),
            _ => self.development.clone(),
        }
    }
}
