/// Session token generation and hashing
///
/// Tokens have the form `tds_{48 base62 chars}`. The plaintext goes into the
/// session cookie exactly once; the database keeps only the SHA-256 hex digest.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::session_token::{generate_session_token, hash_session_token};
///
/// let (token, hash) = generate_session_token();
/// assert!(token.starts_with("tds_"));
/// assert_eq!(hash, hash_session_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Prefix on every session token
pub const TOKEN_PREFIX: &str = "tds_";

/// Length of the random part of a token
pub const TOKEN_RANDOM_LENGTH: usize = 48;

/// Returns `(plaintext_token, sha256_hex)`
pub fn generate_session_token() -> (String, String) {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random_part: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_session_token(&token);
    (token, hash)
}

/// Hex-encoded SHA-256 of a token (64 chars)
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap shape check before touching the database
pub fn looks_like_session_token(token: &str) -> bool {
    token
        .strip_prefix(TOKEN_PREFIX)
        .map(|rest| rest.len() == TOKEN_RANDOM_LENGTH && rest.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(false)
}
