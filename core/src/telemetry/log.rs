use crate::prelude::SessionToken;
use log::{debug, info, warn};

/// Session-scoped log lines for the workflow reducer.
pub struct SessionLog;

impl SessionLog {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, token: SessionToken, message: &str) {
        info!("[{}] {}", token, message);
    }

    pub fn warn(&self, token: SessionToken, message: &str) {
        warn!("[{}] {}", token, message);
    }

    /// Notes an event that arrived for a session that is no longer current.
    pub fn discard(&self, current: SessionToken, stale: SessionToken, what: &str) {
        debug!("[{}] dropped {} from {}", current, what, stale);
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}
