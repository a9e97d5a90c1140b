//! Session lock and presence timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Timing parameters for the single-session lock and presence debounce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// A held session older than this many hours may be re-acquired even if
    /// its release was never observed.
    #[serde(default = "default_stale_session_hours")]
    pub stale_session_hours: u64,
    /// Delay between the last live connection closing and the user being
    /// declared offline.
    #[serde(default = "default_offline_debounce_ms")]
    pub offline_debounce_ms: u64,
    /// A logout recorded within this window suppresses the disconnect-driven
    /// logout bookkeeping.
    #[serde(default = "default_logout_dedup_window_ms")]
    pub logout_dedup_window_ms: u64,
}

impl SessionConfig {
    /// Reject windows that do not fit a `chrono::Duration`.
    pub fn validate(&self) -> Result<(), AppError> {
        if hours_delta(self.stale_session_hours).is_none() {
            return Err(AppError::configuration(format!(
                "session.stale_session_hours out of range: {}",
                self.stale_session_hours
            )));
        }
        if millis_delta(self.logout_dedup_window_ms).is_none() {
            return Err(AppError::configuration(format!(
                "session.logout_dedup_window_ms out of range: {}",
                self.logout_dedup_window_ms
            )));
        }
        Ok(())
    }

    /// Stale-session safety window. Saturates for values `validate` rejects.
    pub fn stale_after(&self) -> chrono::Duration {
        hours_delta(self.stale_session_hours).unwrap_or(chrono::Duration::MAX)
    }

    /// Offline debounce delay.
    pub fn offline_debounce(&self) -> Duration {
        Duration::from_millis(self.offline_debounce_ms)
    }

    /// Explicit-logout dedup window. Saturates for values `validate` rejects.
    pub fn logout_dedup_window(&self) -> chrono::Duration {
        millis_delta(self.logout_dedup_window_ms).unwrap_or(chrono::Duration::MAX)
    }
}

fn hours_delta(hours: u64) -> Option<chrono::Duration> {
    i64::try_from(hours).ok().and_then(chrono::Duration::try_hours)
}

fn millis_delta(ms: u64) -> Option<chrono::Duration> {
    i64::try_from(ms).ok().and_then(chrono::Duration::try_milliseconds)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stale_session_hours: default_stale_session_hours(),
            offline_debounce_ms: default_offline_debounce_ms(),
            logout_dedup_window_ms: default_logout_dedup_window_ms(),
        }
    }
}

fn default_stale_session_hours() -> u64 {
    12
}

fn default_offline_debounce_ms() -> u64 {
    800
}

fn default_logout_dedup_window_ms() -> u64 {
    4000
}
