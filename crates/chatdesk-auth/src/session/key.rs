//! Session key generation.

use std::fmt::Write;

use chatdesk_core::types::SessionKey;

/// Random bytes per session key.
const SESSION_KEY_BYTES: usize = 18;

/// A fresh session key: 18 random bytes, lowercase hex.
pub fn generate_session_key() -> SessionKey {
    let bytes: [u8; SESSION_KEY_BYTES] = rand::random();
    let mut hex = String::with_capacity(SESSION_KEY_BYTES * 2);
    for b in bytes {
        let _ = write!(hex, "{b:02x}");
    }
    SessionKey::new(hex)
}
