use crate::app_config::{derive_ws_base_url, AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("HINTS_ENV", "development"))?;

    let api_base_url = or_default("HINTS_API_BASE_URL", DEFAULT_API_BASE_URL);
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "HINTS_API_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{api_base_url}'"),
        });
    }
    let api_base_url = api_base_url.trim_end_matches('/').to_string();
    let ws_base_url = lookup("HINTS_WS_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| derive_ws_base_url(&api_base_url));

    let data_dir = PathBuf::from(or_default("HINTS_DATA_DIR", "./.getsomehints"));
    let log_level = or_default("HINTS_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("HINTS_REQUEST_TIMEOUT_SECS", "30")?;
    let poll_interval_ms = parse_u64("HINTS_POLL_INTERVAL_MS", "1000")?;
    if poll_interval_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "HINTS_POLL_INTERVAL_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let max_retries = parse_u32("HINTS_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("HINTS_RETRY_BACKOFF_BASE_MS", "500")?;
    let log_max_lines = parse_usize("HINTS_LOG_MAX_LINES", "100")?;

    Ok(AppConfig {
        env,
        api_base_url,
        ws_base_url,
        data_dir,
        log_level,
        request_timeout_secs,
        poll_interval_ms,
        max_retries,
        retry_backoff_base_ms,
        log_max_lines,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HINTS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
