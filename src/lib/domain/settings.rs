//! Process-wide key/value settings

use std::fmt::Debug;

/// A source of key/value settings.
///
/// Mail credentials are read through this trait on first use rather than at
/// startup, so secrets injected after the process starts are still picked up.
pub trait ConfigSource: Debug + Send + Sync + 'static {
    /// Returns the value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns the value for `key`, treating empty values as unset.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }
}
