//! Proxy configuration, read from `LOGSHIELD_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use logshield_core::{PolicyConfig, RedactionPolicy};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_ANALYZER_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub addr: SocketAddr,
    pub max_upload_bytes: usize,
    /// Analysis service endpoint; `/api/analyze` reports an error without it
    pub analyzer_url: Option<String>,
    pub analyzer_timeout: Duration,
    /// TOML policy file, takes precedence over `profile`
    pub policy_path: Option<PathBuf>,
    pub profile: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            analyzer_url: None,
            analyzer_timeout: Duration::from_secs(DEFAULT_ANALYZER_TIMEOUT_SECS),
            policy_path: None,
            profile: "default".to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("LOGSHIELD_ADDR") {
            config.addr = addr
                .trim()
                .parse()
                .with_context(|| format!("LOGSHIELD_ADDR is not a socket address: {addr}"))?;
        }
        if let Some(bytes) = get("LOGSHIELD_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = bytes
                .trim()
                .parse()
                .with_context(|| format!("LOGSHIELD_MAX_UPLOAD_BYTES is not a number: {bytes}"))?;
        }
        if let Some(secs) = get("LOGSHIELD_ANALYZER_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().with_context(|| {
                format!("LOGSHIELD_ANALYZER_TIMEOUT_SECS is not a number: {secs}")
            })?;
            config.analyzer_timeout = Duration::from_secs(secs);
        }
        config.analyzer_url = get("LOGSHIELD_ANALYZER_URL").map(|url| url.trim().to_string());
        config.policy_path = get("LOGSHIELD_POLICY").map(PathBuf::from);
        if let Some(profile) = get("LOGSHIELD_PROFILE") {
            config.profile = profile.trim().to_string();
        }

        Ok(config)
    }

    /// Resolve the redaction policy this proxy serves with.
    pub fn load_policy(&self) -> anyhow::Result<RedactionPolicy> {
        if let Some(path) = &self.policy_path {
            let config = PolicyConfig::from_file(path)
                .with_context(|| format!("failed to load policy {}", path.display()))?;
            return Ok(config.into_policy()?);
        }
        RedactionPolicy::from_profile(&self.profile)
            .ok_or_else(|| anyhow!("unknown policy profile: {}", self.profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ProxyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.analyzer_timeout, Duration::from_secs(60));
        assert!(config.analyzer_url.is_none());
        assert_eq!(config.profile, "default");
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = ProxyConfig::from_lookup(lookup(&[
            ("LOGSHIELD_ADDR", "127.0.0.1:9000"),
            ("LOGSHIELD_MAX_UPLOAD_BYTES", "1024"),
            ("LOGSHIELD_ANALYZER_URL", "http://analyzer:8000/analyze"),
            ("LOGSHIELD_ANALYZER_TIMEOUT_SECS", "5"),
            ("LOGSHIELD_PROFILE", "strict"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(
            config.analyzer_url.as_deref(),
            Some("http://analyzer:8000/analyze")
        );
        assert_eq!(config.analyzer_timeout, Duration::from_secs(5));
        assert_eq!(config.profile, "strict");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = ProxyConfig::from_lookup(lookup(&[("LOGSHIELD_ANALYZER_URL", "  ")])).unwrap();
        assert!(config.analyzer_url.is_none());
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let err = ProxyConfig::from_lookup(lookup(&[("LOGSHIELD_MAX_UPLOAD_BYTES", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("LOGSHIELD_MAX_UPLOAD_BYTES"));
    }

    #[test]
    fn test_unknown_profile_fails_to_load() {
        let config = ProxyConfig {
            profile: "hipaa".to_string(),
            ..ProxyConfig::default()
        };
        assert!(config.load_policy().is_err());
    }
}
