//! Account key fingerprinting for startup logs.
//!
//! Lets operators confirm which storage key is loaded without exposing it.

use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of the SHA-256 of `key`, as 16 lowercase hex characters.
///
/// # Examples
/// ```
/// use trailshare::outbound::blob::key_fingerprint;
///
/// let fp = key_fingerprint(b"secret");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
