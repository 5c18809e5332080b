//! Application state module

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};

use crate::domain::communication::mailer::Mailer;

/// Global application state
pub struct AppState<M: Mailer> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// Mail dispatch, held here for the handlers that notify users about bookings
    pub mailer: Arc<M>,
}

/// Implementation of the application state
impl<M: Mailer> AppState<M> {
    /// Create a new application state
    pub fn new(mailer: M) -> Self {
        Self {
            start_time: Utc::now(),
            mailer: Arc::new(mailer),
        }
    }
}

impl<M: Mailer> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            start_time: self.start_time,
            mailer: self.mailer.clone(),
        }
    }
}

impl<M: Mailer> fmt::Debug for AppState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("mailer", &"Mailer")
            .finish()
    }
}
