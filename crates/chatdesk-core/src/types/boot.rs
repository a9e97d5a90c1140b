//! Process boot epoch.
//!
//! Every process run gets a distinct epoch (whole seconds since the Unix
//! epoch at start-up). Sessions and credentials stamped with an earlier
//! epoch belong to a previous run and are void.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch at which this process started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BootEpoch(i64);

impl BootEpoch {
    /// Capture the epoch for the current process. Call once at start-up.
    pub fn capture() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Build an epoch from a known second count.
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// The epoch as whole seconds.
    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Whether a credential issued at `issued_at` (seconds) predates this run.
    pub fn predates(&self, issued_at: i64) -> bool {
        issued_at < self.0
    }

    /// The epoch as a timestamp.
    pub fn started_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl fmt::Display for BootEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predates() {
        let boot = BootEpoch::from_secs(1_000);
        assert!(boot.predates(999));
        assert!(!boot.predates(1_000));
        assert!(!boot.predates(1_001));
    }

    #[test]
    fn test_capture_is_now() {
        let before = Utc::now().timestamp();
        let boot = BootEpoch::capture();
        assert!(boot.as_secs() >= before);
        assert_eq!(boot.started_at().timestamp(), boot.as_secs());
    }
}
