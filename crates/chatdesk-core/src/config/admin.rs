//! Admin surface configuration.

use serde::{Deserialize, Serialize};

/// Restrictions on what administrators may do to each other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Accounts only other protected accounts may force out or toggle.
    /// Matched trimmed and case-insensitively.
    #[serde(default)]
    pub protected_usernames: Vec<String>,
}

impl AdminConfig {
    /// Whether `username` names a protected account.
    pub fn is_protected(&self, username: &str) -> bool {
        let name = username.trim();
        !name.is_empty()
            && self
                .protected_usernames
                .iter()
                .any(|p| p.trim().eq_ignore_ascii_case(name))
    }
}
