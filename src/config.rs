//! Centralized configuration management for docverify

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::verification::ActionPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the document-management API
    pub api_base_url: String,
    /// Local JSON document set; when present the console works offline
    pub documents_file: Option<PathBuf>,
    /// What happens to rows once approved or rejected
    pub action_policy: ActionPolicy,
    /// Lifetime of a session after OTP verification (minutes)
    pub session_ttl_minutes: i64,
    /// Log file written by both the CLI and the console
    pub log_file: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "docverify/0.1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            documents_file: None,
            action_policy: ActionPolicy::default(),
            session_ttl_minutes: 60,
            log_file: "docverify.log".into(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let api_base_url = std::env::var("DOCVERIFY_API_URL").unwrap_or(defaults.api_base_url);

        let documents_file = std::env::var("DOCVERIFY_DOCUMENTS_FILE")
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let log_file = std::env::var("DOCVERIFY_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        let http = HttpConfig {
            timeout_seconds: parse_env_var("DOCVERIFY_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.http.timeout_seconds),
            user_agent: std::env::var("DOCVERIFY_USER_AGENT").unwrap_or(defaults.http.user_agent),
        };

        Ok(Config {
            api_base_url,
            documents_file,
            action_policy: parse_env_var("DOCVERIFY_ACTION_POLICY")?
                .unwrap_or(defaults.action_policy),
            session_ttl_minutes: parse_env_var("DOCVERIFY_SESSION_TTL_MINUTES")?
                .unwrap_or(defaults.session_ttl_minutes),
            log_file,
            http,
        })
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Get session lifetime
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.documents_file {
            if !path.is_file() {
                return Err(anyhow::anyhow!(
                    "Documents file does not exist: {}",
                    path.display()
                ));
            }
        }

        reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API URL: {}", self.api_base_url))?;

        if self.session_ttl_minutes <= 0 {
            return Err(anyhow::anyhow!(
                "Session lifetime must be positive, got {} minutes",
                self.session_ttl_minutes
            ));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8000/api");
        assert_eq!(config.action_policy, ActionPolicy::RetainWithBadge);
        assert_eq!(config.session_ttl(), chrono::Duration::minutes(60));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert!(config.documents_file.is_none());
    }

    #[test]
    fn test_config_validation() {
        Config::default().validate().unwrap();

        let bad_url = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(bad_url.validate().is_err());

        let bad_ttl = Config {
            session_ttl_minutes: 0,
            ..Config::default()
        };
        assert!(bad_ttl.validate().is_err());
    }

    #[test]
    fn test_missing_documents_file_fails_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            documents_file: Some(dir.path().join("documents.json")),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_var_reports_bad_values() {
        std::env::set_var("DOCVERIFY_TEST_POLICY", "archive");
        let parsed: Result<Option<ActionPolicy>> = parse_env_var("DOCVERIFY_TEST_POLICY");
        assert!(parsed.is_err());

        std::env::set_var("DOCVERIFY_TEST_POLICY", "remove");
        let parsed: Option<ActionPolicy> = parse_env_var("DOCVERIFY_TEST_POLICY").unwrap();
        assert_eq!(parsed, Some(ActionPolicy::RemoveFromView));

        let unset: Option<u64> = parse_env_var("DOCVERIFY_TEST_UNSET_VARIABLE").unwrap();
        assert_eq!(unset, None);
    }
}
