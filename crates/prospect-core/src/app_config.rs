use std::time::Duration;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub google_maps_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub link_check_timeout_secs: u64,
    pub max_redirects: usize,
    pub max_response_bytes: u64,
    pub link_sample_size: usize,
    pub max_concurrent_businesses: usize,
    pub max_concurrent_subrequests: usize,
    pub courtesy_delay_ms: u64,
    pub retry_backoff_ms: u64,
    pub user_agent: String,
    pub places_page_delay_ms: u64,
}

impl AppConfig {
    /// Returns the Places API key, or the configuration failure that must abort
    /// a discovery run before any business is processed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `GOOGLE_MAPS_API_KEY` is unset
    /// or blank.
    pub fn require_places_api_key(&self) -> Result<&str, ConfigError> {
        self.google_maps_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_MAPS_API_KEY".to_string()))
    }

    /// Projects the pipeline settings into the value the orchestrator is built with.
    #[must_use]
    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            link_check_timeout: Duration::from_secs(self.link_check_timeout_secs),
            max_redirects: self.max_redirects,
            max_response_bytes: self.max_response_bytes,
            link_sample_size: self.link_sample_size,
            max_concurrent_businesses: self.max_concurrent_businesses.max(1),
            max_concurrent_subrequests: self.max_concurrent_subrequests.max(1),
            courtesy_delay: Duration::from_millis(self.courtesy_delay_ms),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            user_agent: self.user_agent.clone(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("link_check_timeout_secs", &self.link_check_timeout_secs)
            .field("max_redirects", &self.max_redirects)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("link_sample_size", &self.link_sample_size)
            .field("max_concurrent_businesses", &self.max_concurrent_businesses)
            .field(
                "max_concurrent_subrequests",
                &self.max_concurrent_subrequests,
            )
            .field("courtesy_delay_ms", &self.courtesy_delay_ms)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("user_agent", &self.user_agent)
            .field("places_page_delay_ms", &self.places_page_delay_ms)
            .finish()
    }
}

/// Settings consumed by the audit pipeline. Constructed once and handed to the
/// orchestrator; nothing in the pipeline reads the environment.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub request_timeout: Duration,
    pub link_check_timeout: Duration,
    pub max_redirects: usize,
    pub max_response_bytes: u64,
    pub link_sample_size: usize,
    pub max_concurrent_businesses: usize,
    pub max_concurrent_subrequests: usize,
    pub courtesy_delay: Duration,
    pub retry_backoff: Duration,
    pub user_agent: String,
}

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            link_check_timeout: Duration::from_secs(5),
            max_redirects: 5,
            max_response_bytes: 10 * 1024 * 1024,
            link_sample_size: 10,
            max_concurrent_businesses: 4,
            max_concurrent_subrequests: 4,
            courtesy_delay: Duration::from_millis(250),
            retry_backoff: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
