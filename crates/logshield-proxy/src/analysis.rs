//! Client for the external log-analysis service and its result cache.
//!
//! Only masked text ever leaves the process: callers hand
//! [`AnalysisClient::analyze`] the output of a scan, never the raw upload.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverviewSummary {
    pub total_entries: u64,
    pub info_logs: u64,
    pub error_logs: u64,
    pub security_alerts: u64,
    pub db_failures: u64,
    pub payment_failures: u64,
    pub auth_failures: u64,
    pub file_upload_failures: u64,
    pub api_failures: u64,
    pub suspicious_requests: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategorizedLogSummary {
    pub authentication_and_authorization: Vec<String>,
    pub database: Vec<String>,
    pub payments: Vec<String>,
    pub api: Vec<String>,
    pub file_upload: Vec<String>,
    pub security: Vec<String>,
    pub user_actions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorLogEntry {
    pub severity: String,
    pub service: String,
    pub message: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityAlert {
    pub alert_type: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyStatistics {
    pub requests_processed: u64,
    pub successful_actions: u64,
    pub errors: u64,
    pub critical_errors: u64,
    pub security_alerts: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinalConclusion {
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Structured report returned by the analysis service.
///
/// The six sections are required; fields inside a section default when the
/// service omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub overview_summary: OverviewSummary,
    pub categorized_log_summary: CategorizedLogSummary,
    pub error_log_extraction: Vec<ErrorLogEntry>,
    pub security_alerts: Vec<SecurityAlert>,
    pub key_statistics: KeyStatistics,
    pub final_conclusion: FinalConclusion,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis service is not configured")]
    NotConfigured,

    #[error("analysis request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("analysis service returned an invalid report: {0}")]
    InvalidReport(#[source] serde_json::Error),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    log_content: &'a str,
}

/// HTTP client bound to one analysis endpoint.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    url: String,
}

impl AnalysisClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// POST `{ "logContent": masked_log }` and parse the report.
    pub async fn analyze(&self, masked_log: &str) -> Result<AnalysisReport, AnalysisError> {
        let response = self
            .client
            .post(&self.url)
            .json(&AnalyzeRequest {
                log_content: masked_log,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > 200 {
                let cut = (0..=200).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
                body.truncate(cut);
            }
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(AnalysisError::InvalidReport)
    }
}

/// Reports keyed by the content hash of the original upload.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: DashMap<String, Arc<AnalysisReport>>,
    capacity: usize,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl AnalysisCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, content_hash: &str) -> Option<Arc<AnalysisReport>> {
        self.entries
            .get(content_hash)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Store a report, evicting an arbitrary entry when full.
    pub fn insert(&self, content_hash: String, report: Arc<AnalysisReport>) {
        if !self.entries.contains_key(&content_hash) && self.entries.len() >= self.capacity {
            let victim = self.entries.iter().next().map(|entry| entry.key().clone());
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(content_hash, report);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AnalysisReport {
        serde_json::from_value(serde_json::json!({
            "overviewSummary": {"totalEntries": 3, "errorLogs": 1},
            "categorizedLogSummary": {"database": ["connection refused"]},
            "errorLogExtraction": [
                {"severity": "high", "service": "db", "message": "refused", "details": "[REDACTED_IP]"}
            ],
            "securityAlerts": [],
            "keyStatistics": {"requestsProcessed": 3, "errors": 1},
            "finalConclusion": {"summary": "one failure", "recommendations": ["retry"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_report_sections_default_missing_fields() {
        let report = sample_report();
        assert_eq!(report.overview_summary.total_entries, 3);
        assert_eq!(report.overview_summary.info_logs, 0);
        assert!(report.categorized_log_summary.payments.is_empty());
        assert_eq!(report.error_log_extraction[0].service, "db");
    }

    #[test]
    fn test_report_requires_sections() {
        let parsed = serde_json::from_str::<AnalysisReport>(r#"{"overviewSummary": {}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let value = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(value["keyStatistics"]["requestsProcessed"], 3);
        assert_eq!(value["finalConclusion"]["recommendations"][0], "retry");
    }

    #[test]
    fn test_cache_evicts_when_full() {
        let cache = AnalysisCache::with_capacity(2);
        let report = Arc::new(sample_report());
        cache.insert("a".into(), report.clone());
        cache.insert("b".into(), report.clone());
        cache.insert("c".into(), report.clone());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_cache_overwrite_does_not_evict() {
        let cache = AnalysisCache::with_capacity(1);
        let report = Arc::new(sample_report());
        cache.insert("a".into(), report.clone());
        cache.insert("a".into(), report);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("a").is_some());
    }
}
