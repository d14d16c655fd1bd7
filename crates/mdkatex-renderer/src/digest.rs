//! Cache keys for rendered fragments.

use sha2::{Digest, Sha256};

/// Computes the cache key for rendering `text` with `argv`.
///
/// The SHA-256 hash covers the UTF-8 bytes of `text` followed by each argv
/// token in order, so any change to the input, an option value, or the
/// option order yields a different key.
#[must_use]
pub fn cache_digest<S: AsRef<str>>(text: &str, argv: &[S]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    for part in argv {
        hasher.update(part.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}
