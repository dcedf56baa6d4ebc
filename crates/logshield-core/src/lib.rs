//! LogShield masking engine
//!
//! Finds personally identifiable and secret-looking values in log text,
//! replaces them with `[REDACTED_*]` tokens and reports what was replaced:
//! - Ordered pattern registry (email, IP, URL, path, API key, timestamp, SSN,
//!   phone, credit card, street address, sensitive `key: value` fields)
//! - Line-oriented scanner that keeps keys and line structure intact
//! - Deduplicated redaction ledger, with a diff-based fallback
//!
//! ```
//! use logshield_core::Redactor;
//!
//! let result = Redactor::default().scan(r#"email: "alice@example.com""#);
//! assert_eq!(result.masked_log, r#"email: "[REDACTED_EMAIL]""#);
//! assert_eq!(result.redactions[0].line_number, 1);
//! ```

pub mod detector;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod redactor;
pub mod registry;
pub mod types;

pub use detector::{Detection, MaskStrategy, PatternRule};
pub use error::{MaskError, Result};
pub use ledger::{build_ledger, RedactionRecord};
pub use policy::{CardPolicy, CustomPattern, PolicyBuilder, PolicyConfig, RedactionPolicy};
pub use redactor::{mask_then_diff, Redactor, ScanResult};
pub use registry::PatternRegistry;
pub use types::{is_mask_token, Category};
