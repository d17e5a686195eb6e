use crate::app_config::{AppConfig, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let log_level = or_default("PROSPECT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("PROSPECT_REQUEST_TIMEOUT_SECS", "10")?;
    let link_check_timeout_secs = parse_u64("PROSPECT_LINK_CHECK_TIMEOUT_SECS", "5")?;
    let max_redirects = parse_usize("PROSPECT_MAX_REDIRECTS", "5")?;
    let max_response_bytes = parse_u64("PROSPECT_MAX_RESPONSE_BYTES", "10485760")?;
    let link_sample_size = parse_usize("PROSPECT_LINK_SAMPLE_SIZE", "10")?;
    let max_concurrent_businesses = parse_usize("PROSPECT_MAX_CONCURRENT_BUSINESSES", "4")?;
    let max_concurrent_subrequests = parse_usize("PROSPECT_MAX_CONCURRENT_SUBREQUESTS", "4")?;
    let courtesy_delay_ms = parse_u64("PROSPECT_COURTESY_DELAY_MS", "250")?;
    let retry_backoff_ms = parse_u64("PROSPECT_RETRY_BACKOFF_MS", "1000")?;
    let user_agent = or_default("PROSPECT_USER_AGENT", DEFAULT_USER_AGENT);
    let places_page_delay_ms = parse_u64("PROSPECT_PLACES_PAGE_DELAY_MS", "2000")?;

    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROSPECT_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if link_check_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROSPECT_LINK_CHECK_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        google_maps_api_key,
        request_timeout_secs,
        link_check_timeout_secs,
        max_redirects,
        max_response_bytes,
        link_sample_size,
        max_concurrent_businesses,
        max_concurrent_subrequests,
        courtesy_delay_ms,
        retry_backoff_ms,
        user_agent,
        places_page_delay_ms,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
