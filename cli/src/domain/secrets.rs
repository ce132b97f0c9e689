//! Secret generation.

use rand::RngCore;

/// Raw bytes behind an agent API key (64 hex characters).
pub const API_KEY_BYTES: usize = 32;

/// Raw bytes behind the OAuth cookie secret. The OAuth proxy accepts only
/// 16, 24 or 32 byte secrets.
pub const COOKIE_SECRET_BYTES: usize = 16;

fn random_hex(len: usize) -> String {
    let mut buf = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Generate a new agent API key.
#[must_use]
pub fn generate_api_key() -> String {
    random_hex(API_KEY_BYTES)
}

/// Generate a new OAuth cookie secret.
#[must_use]
pub fn generate_cookie_secret() -> String {
    random_hex(COOKIE_SECRET_BYTES)
}
