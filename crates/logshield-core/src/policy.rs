use crate::error::{MaskError, Result};
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Keys whose values carry no identifying information.
pub const DEFAULT_KEY_ALLOWLIST: [&str; 4] = ["currency", "country", "state", "payment_method"];

/// When card-shaped digit runs are masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPolicy {
    /// Any 13-16 digit run, grouped or not
    #[default]
    Unconditional,
    /// Only on lines that mention a payment keyword
    PaymentContext,
}

/// User-defined detector compiled as a fixed-token rule after the built-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub name: String,
    pub pattern: String,
    /// Defaults to `[REDACTED_<NAME>]`
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl CustomPattern {
    pub fn placeholder(&self) -> String {
        self.placeholder.clone().unwrap_or_else(|| {
            let name: String = self
                .name
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
                .collect();
            format!("[REDACTED_{name}]")
        })
    }
}

/// Redaction policy – defines WHAT to redact and HOW to redact it
#[derive(Debug, Clone)]
pub struct RedactionPolicy {
    /// Enabled categories (default: everything but the values-only rule)
    enabled_types: HashSet<Category>,

    /// Custom placeholder per category (overrides defaults)
    placeholder_map: HashMap<Category, String>,

    /// Keys whose values are never masked (lowercased)
    key_allowlist: Vec<String>,

    card_policy: CardPolicy,

    custom_patterns: Vec<CustomPattern>,
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        let enabled = Category::ALL
            .into_iter()
            .filter(|c| *c != Category::GenericQuotedValue)
            .collect();

        Self {
            enabled_types: enabled,
            placeholder_map: HashMap::new(),
            key_allowlist: DEFAULT_KEY_ALLOWLIST.iter().map(|k| k.to_string()).collect(),
            card_policy: CardPolicy::default(),
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionPolicy {
    /// Builder pattern for ergonomic configuration
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Check if a category should be scanned for
    pub fn is_enabled(&self, category: Category) -> bool {
        self.enabled_types.contains(&category)
    }

    /// Get the mask token for a category
    pub fn placeholder_for(&self, category: Category) -> &str {
        self.placeholder_map
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| category.placeholder())
    }

    pub fn key_allowlist(&self) -> &[String] {
        &self.key_allowlist
    }

    pub fn card_policy(&self) -> CardPolicy {
        self.card_policy
    }

    pub fn custom_patterns(&self) -> &[CustomPattern] {
        &self.custom_patterns
    }
}

/// Builder for RedactionPolicy – enables fluent configuration
#[derive(Default)]
pub struct PolicyBuilder {
    policy: RedactionPolicy,
}

impl PolicyBuilder {
    /// Start from an existing policy instead of the default.
    pub fn from_policy(policy: RedactionPolicy) -> Self {
        Self { policy }
    }

    pub fn enable(mut self, category: Category) -> Self {
        self.policy.enabled_types.insert(category);
        self
    }

    pub fn disable(mut self, category: Category) -> Self {
        self.policy.enabled_types.remove(&category);
        self
    }

    pub fn only(mut self, categories: &[Category]) -> Self {
        self.policy.enabled_types = categories.iter().copied().collect();
        self
    }

    pub fn with_placeholder(mut self, category: Category, placeholder: &str) -> Self {
        self.policy
            .placeholder_map
            .insert(category, placeholder.to_string());
        self
    }

    /// Same placeholder for both sensitive-field categories (e.g. `xxxxxx`).
    pub fn with_field_placeholder(self, placeholder: &str) -> Self {
        self.with_placeholder(Category::SecretField, placeholder)
            .with_placeholder(Category::UsernameField, placeholder)
    }

    /// Replace the key allowlist.
    pub fn with_allowlist(mut self, keys: Vec<&str>) -> Self {
        self.policy.key_allowlist = keys.into_iter().map(str::to_ascii_lowercase).collect();
        self
    }

    pub fn allow_key(mut self, key: &str) -> Self {
        self.policy.key_allowlist.push(key.to_ascii_lowercase());
        self
    }

    pub fn card_policy(mut self, card_policy: CardPolicy) -> Self {
        self.policy.card_policy = card_policy;
        self
    }

    pub fn custom_pattern(mut self, pattern: CustomPattern) -> Self {
        self.policy.custom_patterns.push(pattern);
        self
    }

    pub fn build(self) -> RedactionPolicy {
        self.policy
    }
}

/// Predefined profiles
impl RedactionPolicy {
    /// Values-only: every quoted `key: "value"` pair is masked unless allowlisted
    pub fn strict() -> Self {
        PolicyBuilder::default()
            .enable(Category::GenericQuotedValue)
            .build()
    }

    /// GDPR profile: Focus on identifiers + online identifiers
    pub fn gdpr() -> Self {
        PolicyBuilder::default()
            .disable(Category::Ssn) // US-specific
            .build()
    }

    /// PCI-DSS profile: cardholder data and the secrets around it
    pub fn pci_dss() -> Self {
        PolicyBuilder::default()
            .only(&[
                Category::CreditCard,
                Category::SecretField,
                Category::ApiKey,
            ])
            .card_policy(CardPolicy::Unconditional)
            .build()
    }

    /// Look up a profile by name.
    pub fn from_profile(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::default()),
            "strict" => Some(Self::strict()),
            "gdpr" => Some(Self::gdpr()),
            "pci" | "pci_dss" | "pci-dss" => Some(Self::pci_dss()),
            _ => None,
        }
    }
}

/// On-disk form of a policy.
///
/// ```toml
/// profile = "strict"
/// disable = ["FILE_PATH"]
/// field_placeholder = "xxxxxx"
/// card_policy = "payment_context"
///
/// [placeholders]
/// EMAIL = "[REDACTED_MAIL]"
///
/// [[custom_patterns]]
/// name = "employee_id"
/// pattern = 'EMP-\d{6}'
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub profile: Option<String>,
    pub enable: Vec<Category>,
    pub disable: Vec<Category>,
    /// Replaces the default allowlist when present
    pub allowlist: Option<Vec<String>>,
    pub placeholders: HashMap<String, String>,
    pub field_placeholder: Option<String>,
    pub card_policy: Option<CardPolicy>,
    pub custom_patterns: Vec<CustomPattern>,
}

impl PolicyConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| MaskError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn into_policy(self) -> Result<RedactionPolicy> {
        let base = match self.profile.as_deref() {
            Some(name) => RedactionPolicy::from_profile(name).ok_or_else(|| {
                MaskError::InvalidConfig {
                    reason: format!("unknown profile: {name}"),
                }
            })?,
            None => RedactionPolicy::default(),
        };

        let mut builder = PolicyBuilder::from_policy(base);
        for category in self.enable {
            builder = builder.enable(category);
        }
        for category in self.disable {
            builder = builder.disable(category);
        }
        if let Some(keys) = &self.allowlist {
            builder = builder.with_allowlist(keys.iter().map(String::as_str).collect());
        }
        if let Some(placeholder) = &self.field_placeholder {
            builder = builder.with_field_placeholder(placeholder);
        }
        for (label, placeholder) in &self.placeholders {
            let category: Category = label
                .parse()
                .map_err(|reason| MaskError::InvalidConfig { reason })?;
            if placeholder.trim().is_empty() {
                return Err(MaskError::InvalidConfig {
                    reason: format!("empty placeholder for {category}"),
                });
            }
            builder = builder.with_placeholder(category, placeholder);
        }
        if let Some(card_policy) = self.card_policy {
            builder = builder.card_policy(card_policy);
        }
        for pattern in self.custom_patterns {
            builder = builder.custom_pattern(pattern);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_enables_core_types() {
        let policy = RedactionPolicy::default();
        assert!(policy.is_enabled(Category::Email));
        assert!(policy.is_enabled(Category::CreditCard));
        assert!(policy.is_enabled(Category::SecretField));
        assert!(!policy.is_enabled(Category::GenericQuotedValue));
    }

    #[test]
    fn test_custom_placeholder() {
        let policy = PolicyBuilder::default()
            .with_field_placeholder("xxxxxx")
            .build();

        assert_eq!(policy.placeholder_for(Category::SecretField), "xxxxxx");
        assert_eq!(policy.placeholder_for(Category::UsernameField), "xxxxxx");
        assert_eq!(policy.placeholder_for(Category::Ssn), "[REDACTED_SSN]"); // unchanged
    }

    #[test]
    fn test_default_key_allowlist() {
        let policy = RedactionPolicy::default();
        assert_eq!(
            policy.key_allowlist(),
            ["currency", "country", "state", "payment_method"]
        );
    }

    #[test]
    fn test_strict_profile_enables_values_only_rule() {
        assert!(RedactionPolicy::strict().is_enabled(Category::GenericQuotedValue));
    }

    #[test]
    fn test_gdpr_profile_excludes_ssn() {
        let policy = RedactionPolicy::gdpr();
        assert!(!policy.is_enabled(Category::Ssn));
        assert!(policy.is_enabled(Category::IpAddress));
    }

    #[test]
    fn test_custom_pattern_default_placeholder() {
        let pattern = CustomPattern {
            name: "employee-id".into(),
            pattern: r"EMP-\d{6}".into(),
            placeholder: None,
        };
        assert_eq!(pattern.placeholder(), "[REDACTED_EMPLOYEE_ID]");
    }

    #[test]
    fn test_config_from_toml() {
        let config = PolicyConfig::from_toml_str(
            r#"
profile = "strict"
disable = ["FILE_PATH"]
allowlist = ["region"]
field_placeholder = "xxxxxx"
card_policy = "payment_context"

[placeholders]
EMAIL = "[REDACTED_MAIL]"

[[custom_patterns]]
name = "employee_id"
pattern = 'EMP-\d{6}'
"#,
        )
        .unwrap();

        let policy = config.into_policy().unwrap();
        assert!(policy.is_enabled(Category::GenericQuotedValue));
        assert!(!policy.is_enabled(Category::FilePath));
        assert_eq!(policy.key_allowlist(), ["region"]);
        assert_eq!(policy.placeholder_for(Category::Email), "[REDACTED_MAIL]");
        assert_eq!(policy.placeholder_for(Category::SecretField), "xxxxxx");
        assert_eq!(policy.card_policy(), CardPolicy::PaymentContext);
        assert_eq!(policy.custom_patterns().len(), 1);
    }

    #[test]
    fn test_config_rejects_unknown_profile() {
        let config = PolicyConfig {
            profile: Some("hipaa".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.into_policy(),
            Err(MaskError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_config_rejects_unknown_placeholder_category() {
        let config = PolicyConfig::from_toml_str("[placeholders]\nNAME = \"[X]\"\n").unwrap();
        assert!(config.into_policy().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "profile = \"gdpr\"\ncard_policy = \"payment_context\"\n").unwrap();

        let policy = PolicyConfig::from_file(&path).unwrap().into_policy().unwrap();
        assert!(!policy.is_enabled(Category::Ssn));
        assert_eq!(policy.card_policy(), CardPolicy::PaymentContext);
    }

    #[test]
    fn test_config_file_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "profile = [").unwrap();

        match PolicyConfig::from_file(&path) {
            Err(MaskError::ConfigParse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
