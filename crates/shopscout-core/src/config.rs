use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Desktop Chrome UA sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

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
/// Every variable is optional; the lookup is injected so tests can use a
/// plain `HashMap` instead of mutating the process environment.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    // Zero page caps are rejected.
    let parse_page_cap = |var: &str, default: &str| -> Result<usize, ConfigError> {
        match parse_usize(var, default)? {
            0 => Err(invalid(var, "must be at least 1".to_string())),
            n => Ok(n),
        }
    };

    let env = parse_environment(&or_default("SHOPSCOUT_ENV", "development"));

    // An explicit bind address wins; otherwise honor the platform-provided PORT.
    let bind_raw = match lookup("SHOPSCOUT_BIND_ADDR") {
        Ok(addr) => addr,
        Err(_) => match lookup("PORT") {
            Ok(port) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| invalid("PORT", e.to_string()))?;
                format!("0.0.0.0:{port}")
            }
            Err(_) => "0.0.0.0:8080".to_string(),
        },
    };
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SHOPSCOUT_BIND_ADDR", e.to_string()))?;

    let log_level = or_default("SHOPSCOUT_LOG_LEVEL", "info");
    let heuristics_path = lookup("SHOPSCOUT_HEURISTICS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let scraper_request_timeout_secs = parse_u64("SHOPSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS", "15")?;
    let scraper_probe_timeout_secs = parse_u64("SHOPSCOUT_SCRAPER_PROBE_TIMEOUT_SECS", "10")?;
    let scraper_user_agent = or_default("SHOPSCOUT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_inter_request_delay_ms =
        parse_u64("SHOPSCOUT_SCRAPER_INTER_REQUEST_DELAY_MS", "800")?;
    let scraper_challenge_retry_delay_ms =
        parse_u64("SHOPSCOUT_SCRAPER_CHALLENGE_RETRY_DELAY_MS", "3000")?;
    let scraper_max_listing_pages = parse_page_cap("SHOPSCOUT_SCRAPER_MAX_LISTING_PAGES", "50")?;
    let scraper_max_sitemaps = parse_page_cap("SHOPSCOUT_SCRAPER_MAX_SITEMAPS", "25")?;
    let rate_limit_per_minute = parse_usize("SHOPSCOUT_RATE_LIMIT_PER_MINUTE", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        heuristics_path,
        scraper_request_timeout_secs,
        scraper_probe_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_challenge_retry_delay_ms,
        scraper_max_listing_pages,
        scraper_max_sitemaps,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
