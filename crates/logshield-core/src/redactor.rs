use crate::{
    detector::apply_redactions,
    error::Result,
    ledger::{self, RedactionRecord},
    policy::RedactionPolicy,
    registry::PatternRegistry,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Output of one scan: the masked text and its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub masked_log: String,
    pub redactions: Vec<RedactionRecord>,
}

impl ScanResult {
    /// Nothing was redacted.
    pub fn is_clean(&self) -> bool {
        self.redactions.is_empty()
    }
}

/// Core redaction engine – applies the registry line by line
///
/// Stateless after construction: one instance can be shared across threads
/// and scans never observe each other.
#[derive(Debug, Clone)]
pub struct Redactor {
    registry: PatternRegistry,
}

impl Redactor {
    /// Build the registry for `policy`
    pub fn new(policy: &RedactionPolicy) -> Result<Self> {
        Ok(Self::from_registry(PatternRegistry::new(policy)?))
    }

    pub fn from_registry(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Mask `text` and record every replaced value.
    ///
    /// Lines are split on `\n`; a trailing `\r` is carried through untouched
    /// so the line count and newline convention of the output match the
    /// input exactly.
    pub fn scan(&self, text: &str) -> ScanResult {
        let mut records = Vec::new();
        let mut masked = String::with_capacity(text.len());

        for (idx, raw_line) in text.split('\n').enumerate() {
            if idx > 0 {
                masked.push('\n');
            }
            let (line, cr) = match raw_line.strip_suffix('\r') {
                Some(line) => (line, "\r"),
                None => (raw_line, ""),
            };
            masked.push_str(&self.scan_line(line, idx + 1, &mut records));
            masked.push_str(cr);
        }

        ScanResult {
            masked_log: masked,
            redactions: ledger::build_ledger(records),
        }
    }

    /// Redact text without keeping a ledger – returns Cow<str> for zero-copy
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.is_empty() {
            return Cow::Borrowed(text);
        }

        let result = self.scan(text);
        if result.is_clean() {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(result.masked_log)
        }
    }

    /// Run every rule over one line, in registry order, each against the
    /// output of the previous one.
    fn scan_line<'a>(
        &self,
        line: &'a str,
        line_number: usize,
        records: &mut Vec<RedactionRecord>,
    ) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(line);
        if line.is_empty() {
            return current;
        }

        for rule in self.registry.rules() {
            let detections = rule.detect(&current);
            if detections.is_empty() {
                continue;
            }

            records.extend(detections.iter().map(|d| {
                RedactionRecord::new(d.original.clone(), d.masked.clone(), line_number)
            }));
            current = Cow::Owned(apply_redactions(&current, &detections));
        }

        current
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(&RedactionPolicy::default()).expect("built-in patterns should compile")
    }
}

/// Degraded mode for maskers that only return rewritten text.
///
/// The ledger is rebuilt with [`ledger::from_diff`], so every record is
/// flagged approximate.
pub fn mask_then_diff<F>(text: &str, masker: F) -> ScanResult
where
    F: FnOnce(&str) -> String,
{
    let masked_log = masker(text);
    let redactions = ledger::from_diff(text, &masked_log);
    ScanResult {
        masked_log,
        redactions,
    }
}
