use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub const LOCK_FILE_NAME: &str = "locflow.lock";
pub const LOCK_FILE_VERSION: u32 = 1;

/// Fingerprints for one path identity: key → content checksum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

impl FingerprintRecord {
    pub fn is_empty(&self) -> bool {
        self.checksums.is_empty()
    }

    /// Reverse index checksum → key, for rename anchoring. If two keys
    /// share a checksum the first in key order wins; good enough, since a
    /// rename of either is indistinguishable anyway.
    pub fn by_checksum(&self) -> BTreeMap<&str, &str> {
        let mut out = BTreeMap::new();
        for (key, sum) in &self.checksums {
            out.entry(sum.as_str()).or_insert(key.as_str());
        }
        out
    }
}

#[derive(Debug, Error)]
pub enum LockFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to serialize lock file: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The persisted fingerprint store. BTreeMaps keep the serialized form
/// stable across runs, so lock-file diffs only show real changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockFile {
    pub version: u32,
    #[serde(default)]
    pub files: BTreeMap<String, FingerprintRecord>,
}

impl LockFile {
    pub fn new() -> Self {
        LockFile {
            version: LOCK_FILE_VERSION,
            files: BTreeMap::new(),
        }
    }

    /// Load the lock file; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, LockFileError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(LockFileError::Read {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        let parsed: LockFile = toml::from_str(&raw).map_err(|e| LockFileError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(parsed)
    }

    pub fn save(&self, path: &Path) -> Result<(), LockFileError> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| LockFileError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Fingerprints for one path identity; absent ⇒ empty record.
    pub fn record(&self, path_identity: &str) -> FingerprintRecord {
        self.files.get(path_identity).cloned().unwrap_or_default()
    }

    pub fn set_record(&mut self, path_identity: &str, record: FingerprintRecord) {
        self.files.insert(path_identity.to_string(), record);
    }
}
