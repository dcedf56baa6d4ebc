use serde::{Deserialize, Serialize};

/// Categories of sensitive data the registry knows how to find.
///
/// Design principles:
/// - Every category owns a bracketed `[REDACTED_*]` token that no detector
///   can match, so masking a masked log is a no-op
/// - Key/value categories keep the key and only replace the value
/// - No heap allocations in enum (all variants are `Copy`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Email,
    IpAddress,
    Url,
    FilePath,
    ApiKey,
    Timestamp,
    Ssn,
    Phone,
    CreditCard,
    Address,
    SecretField,
    UsernameField,
    GenericQuotedValue,
    /// User-defined pattern from the policy
    Custom,
}

impl Category {
    /// Every built-in category, in no particular order.
    pub const ALL: [Category; 13] = [
        Self::Email,
        Self::IpAddress,
        Self::Url,
        Self::FilePath,
        Self::ApiKey,
        Self::Timestamp,
        Self::Ssn,
        Self::Phone,
        Self::CreditCard,
        Self::Address,
        Self::SecretField,
        Self::UsernameField,
        Self::GenericQuotedValue,
    ];

    /// Default mask token (configurable via Policy)
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Email => "[REDACTED_EMAIL]",
            Self::IpAddress => "[REDACTED_IP]",
            Self::Url => "[REDACTED_URL]",
            Self::FilePath => "[REDACTED_PATH]",
            Self::ApiKey => "[REDACTED_API_KEY]",
            Self::Timestamp => "[REDACTED_TIMESTAMP]",
            Self::Ssn => "[REDACTED_SSN]",
            Self::Phone => "[REDACTED_PHONE]",
            Self::CreditCard => "[REDACTED_CREDIT_CARD]",
            Self::Address => "[REDACTED_ADDRESS]",
            Self::SecretField => "[REDACTED_SECRET]",
            Self::UsernameField => "[REDACTED_USER]",
            Self::GenericQuotedValue => "[REDACTED_VALUE]",
            Self::Custom => "[REDACTED]",
        }
    }

    /// Stable label used in config files and CLI flags.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::IpAddress => "IP_ADDRESS",
            Self::Url => "URL",
            Self::FilePath => "FILE_PATH",
            Self::ApiKey => "API_KEY",
            Self::Timestamp => "TIMESTAMP",
            Self::Ssn => "SSN",
            Self::Phone => "PHONE",
            Self::CreditCard => "CREDIT_CARD",
            Self::Address => "ADDRESS",
            Self::SecretField => "SECRET_FIELD",
            Self::UsernameField => "USERNAME_FIELD",
            Self::GenericQuotedValue => "GENERIC_QUOTED_VALUE",
            Self::Custom => "CUSTOM",
        }
    }

    /// Whether the category masks only the value half of a `key: value` shape.
    pub fn is_key_value(&self) -> bool {
        matches!(
            self,
            Self::SecretField | Self::UsernameField | Self::GenericQuotedValue
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// True when `value` is a token from the reserved `[REDACTED_*]` vocabulary.
pub fn is_mask_token(value: &str) -> bool {
    let Some(inner) = value
        .strip_prefix("[REDACTED")
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return false;
    };
    inner.is_empty()
        || (inner.starts_with('_')
            && inner[1..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
}

/// Every `[REDACTED_*]` token in `text`, left to right.
pub fn mask_tokens(text: &str) -> Vec<&str> {
    mask_token_spans(text)
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .collect()
}

/// Byte ranges of the `[REDACTED_*]` tokens in `text`, left to right.
pub fn mask_token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut rest = 0;
    while let Some(offset) = text[rest..].find("[REDACTED") {
        let start = rest + offset;
        match text[start..].find(']') {
            Some(len) => {
                let end = start + len + 1;
                if is_mask_token(&text[start..end]) {
                    spans.push((start, end));
                    rest = end;
                } else {
                    rest = start + 1;
                }
            }
            None => break,
        }
    }
    spans
}
