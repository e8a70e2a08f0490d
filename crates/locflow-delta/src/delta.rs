use crate::{checksum, FingerprintRecord};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Classification of source keys against the previous run's fingerprints.
/// Every source key lands in exactly one of added/updated/unchanged;
/// renamed pairs are reported on the side and excluded from added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    /// (old key, new key) pairs whose content checksum matches.
    pub renamed: Vec<(String, String)>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.renamed.is_empty()
    }

    /// Keys that need translation: added and updated, in source order.
    /// Renamed keys keep their existing translation and are not included.
    pub fn translatable(&self) -> BTreeSet<&str> {
        self.added
            .iter()
            .chain(self.updated.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Classify `source` against `fingerprints`.
///
/// - added: key absent from the fingerprints and not explained by a rename
/// - updated: key present with a different checksum
/// - renamed: a fingerprinted key that disappeared from the source while
///   its checksum reappears under a new key
///
/// Keys present only in the previous fingerprints (deleted content) are
/// deliberately not reported; deletion is never inferred here.
pub fn compute_delta(
    source: &IndexMap<String, String>,
    fingerprints: &FingerprintRecord,
) -> Delta {
    let mut delta = Delta::default();

    // Old keys no longer present in the source are rename candidates.
    let mut vanished_by_checksum: IndexMap<&str, &str> = IndexMap::new();
    for (old_key, old_sum) in &fingerprints.checksums {
        if !source.contains_key(old_key) {
            vanished_by_checksum
                .entry(old_sum.as_str())
                .or_insert(old_key.as_str());
        }
    }

    for (key, value) in source {
        let current = checksum(value);
        match fingerprints.checksums.get(key) {
            Some(stored) if *stored == current => {}
            Some(_) => delta.updated.push(key.clone()),
            None => {
                // Each vanished key explains at most one new key.
                if let Some(old_key) = vanished_by_checksum.shift_remove(current.as_str()) {
                    delta.renamed.push((old_key.to_string(), key.clone()));
                } else {
                    delta.added.push(key.clone());
                }
            }
        }
    }

    delta
}

/// Fingerprints of the current source content, to persist after a run.
pub fn fingerprint_source(source: &IndexMap<String, String>) -> FingerprintRecord {
    let mut record = FingerprintRecord::default();
    for (key, value) in source {
        record.checksums.insert(key.clone(), checksum(value));
    }
    record
}
