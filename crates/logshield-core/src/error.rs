use std::path::PathBuf;

/// Errors raised while building a registry from a policy.
///
/// Scanning itself never fails; only configuration can.
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    #[error("invalid pattern {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MaskError>;
