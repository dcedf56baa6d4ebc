//! Redaction ledger: the deduplicated, ordered audit trail of one scan.

use crate::types::mask_tokens;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use zeroize::Zeroize;

/// `original` of records produced without per-value granularity.
pub const APPROXIMATE_ORIGINAL: &str = "(approximate)";

/// `masked` of an approximate record when no mask token could be recovered.
pub const APPROXIMATE_MODIFIED: &str = "(modified)";

/// One logical redaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionRecord {
    /// Exact substring that was detected – zeroized on drop
    pub original: String,
    pub masked: String,
    /// 1-based
    pub line_number: usize,
    /// Reconstructed from a before/after diff rather than a direct match
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub approximate: bool,
}

impl RedactionRecord {
    pub fn new(original: impl Into<String>, masked: impl Into<String>, line_number: usize) -> Self {
        Self {
            original: original.into(),
            masked: masked.into(),
            line_number,
            approximate: false,
        }
    }

    fn new_approximate(masked: impl Into<String>, line_number: usize) -> Self {
        Self {
            original: APPROXIMATE_ORIGINAL.to_string(),
            masked: masked.into(),
            line_number,
            approximate: true,
        }
    }
}

impl Zeroize for RedactionRecord {
    fn zeroize(&mut self) {
        self.original.zeroize();
    }
}

impl Drop for RedactionRecord {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Collapse records sharing `(line_number, original)`.
///
/// The first occurrence wins, including its `masked` value, and first-seen
/// order is kept.
pub fn build_ledger(records: Vec<RedactionRecord>) -> Vec<RedactionRecord> {
    let mut seen: HashSet<(usize, String)> = HashSet::with_capacity(records.len());
    let mut ledger = Vec::with_capacity(records.len());

    for record in records {
        if seen.insert((record.line_number, record.original.clone())) {
            ledger.push(record);
        }
    }

    for (_, mut original) in seen.drain() {
        original.zeroize();
    }
    ledger
}

/// Coarse ledger for masking strategies that only produce before/after text.
///
/// Lines are paired positionally. Each distinct mask token found on a
/// changed line yields one approximate record at its first line. A changed
/// text with no recognisable token still yields one record, so the ledger is
/// never empty when `original != masked`.
pub fn from_diff(original: &str, masked: &str) -> Vec<RedactionRecord> {
    if original == masked {
        return Vec::new();
    }

    let line_count = original.split('\n').count();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();
    let mut first_changed = None;

    for (idx, (before, after)) in original.split('\n').zip(masked.split('\n')).enumerate() {
        if before == after {
            continue;
        }
        first_changed.get_or_insert(idx + 1);
        for token in mask_tokens(after) {
            if seen.insert(token) {
                records.push(RedactionRecord::new_approximate(token, idx + 1));
            }
        }
    }

    if records.is_empty() {
        // Paired lines all equal: the texts differ only in trailing lines
        let line = first_changed.unwrap_or(line_count);
        records.push(RedactionRecord::new_approximate(APPROXIMATE_MODIFIED, line));
    }

    records
}

/// Count of ledger entries per mask token, for display.
pub fn summarize(records: &[RedactionRecord]) -> BTreeMap<String, usize> {
    let mut summary = BTreeMap::new();
    for record in records {
        *summary.entry(record.masked.clone()).or_insert(0) += 1;
    }
    summary
}
