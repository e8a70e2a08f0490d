//! Change detection across runs.
//!
//! Every source key's content is fingerprinted with a checksum and stored
//! in a lock file, keyed by path identity (the unresolved path pattern, so
//! all target locales of one file share one record). On the next run the
//! delta engine classifies each key as added, updated, renamed or
//! unchanged; only the first two (plus forced runs) reach the backend.

mod delta;
mod lockfile;

pub use delta::{compute_delta, fingerprint_source, Delta};
pub use lockfile::{LockFile, LockFileError, FingerprintRecord, LOCK_FILE_NAME, LOCK_FILE_VERSION};

use sha2::{Digest, Sha256};

/// Content checksum of one translatable value. Doubles as the anchor for
/// rename detection, so it must depend on the value alone, not the key.
pub fn checksum(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    // 16 bytes of hex is plenty for equality and keeps the lock file legible.
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_and_content_only() {
        assert_eq!(checksum("Hello"), checksum("Hello"));
        assert_ne!(checksum("Hello"), checksum("hello"));
        assert_eq!(checksum("Hello").len(), 32);
    }
}
