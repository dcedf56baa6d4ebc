//! Upload checks and naming for log files passing through the proxy.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::ApiError;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["log", "txt", "json"];

/// Reject oversized content and, when a file name is given, unknown extensions.
pub fn validate(content: &str, file_name: Option<&str>, limit: usize) -> Result<(), ApiError> {
    if content.len() > limit {
        return Err(ApiError::PayloadTooLarge {
            size: content.len(),
            limit,
        });
    }

    if let Some(name) = file_name {
        let allowed = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !allowed {
            return Err(ApiError::UnsupportedFileType(name.to_string()));
        }
    }

    Ok(())
}

/// Lowercase hex SHA-256 of the original text.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// `<stem>_masked.log`
pub fn download_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("log");
    format!("{stem}_masked.log")
}
