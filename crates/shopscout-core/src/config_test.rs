use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn config_with(pairs: &[(&'static str, &'static str)]) -> Result<AppConfig, ConfigError> {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    build_app_config(lookup_from_map(&map))
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn empty_environment_yields_defaults() {
    let cfg = config_with(&[]).expect("defaults should load");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.heuristics_path.is_none());
    assert_eq!(cfg.scraper_request_timeout_secs, 15);
    assert_eq!(cfg.scraper_probe_timeout_secs, 10);
    assert_eq!(cfg.scraper_user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.scraper_inter_request_delay_ms, 800);
    assert_eq!(cfg.scraper_challenge_retry_delay_ms, 3000);
    assert_eq!(cfg.scraper_max_listing_pages, 50);
    assert_eq!(cfg.scraper_max_sitemaps, 25);
    assert_eq!(cfg.rate_limit_per_minute, 30);
}

#[test]
fn port_is_used_when_bind_addr_absent() {
    let cfg = config_with(&[("PORT", "5055")]).unwrap();
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5055");
}

#[test]
fn bind_addr_takes_precedence_over_port() {
    let cfg = config_with(&[("PORT", "5055"), ("SHOPSCOUT_BIND_ADDR", "127.0.0.1:9000")]).unwrap();
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
}

#[test]
fn invalid_port_is_rejected() {
    let result = config_with(&[("PORT", "eighty")]);
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PORT"
        ),
        "expected InvalidEnvVar(PORT), got: {result:?}"
    );
}

#[test]
fn invalid_bind_addr_is_rejected() {
    let result = config_with(&[("SHOPSCOUT_BIND_ADDR", "not-a-socket-addr")]);
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPSCOUT_BIND_ADDR"
        ),
        "expected InvalidEnvVar(SHOPSCOUT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn heuristics_path_override() {
    let cfg = config_with(&[("SHOPSCOUT_HEURISTICS_PATH", "./config/heuristics.yaml")]).unwrap();
    assert_eq!(
        cfg.heuristics_path.as_deref(),
        Some(std::path::Path::new("./config/heuristics.yaml"))
    );
}

#[test]
fn blank_heuristics_path_is_ignored() {
    let cfg = config_with(&[("SHOPSCOUT_HEURISTICS_PATH", "  ")]).unwrap();
    assert!(cfg.heuristics_path.is_none());
}

#[test]
fn scraper_overrides_are_applied() {
    let cfg = config_with(&[
        ("SHOPSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS", "30"),
        ("SHOPSCOUT_SCRAPER_PROBE_TIMEOUT_SECS", "5"),
        ("SHOPSCOUT_SCRAPER_USER_AGENT", "custom-agent/2.0"),
        ("SHOPSCOUT_SCRAPER_INTER_REQUEST_DELAY_MS", "0"),
        ("SHOPSCOUT_SCRAPER_CHALLENGE_RETRY_DELAY_MS", "100"),
        ("SHOPSCOUT_SCRAPER_MAX_LISTING_PAGES", "3"),
        ("SHOPSCOUT_SCRAPER_MAX_SITEMAPS", "4"),
        ("SHOPSCOUT_RATE_LIMIT_PER_MINUTE", "2"),
    ])
    .unwrap();
    assert_eq!(cfg.scraper_request_timeout_secs, 30);
    assert_eq!(cfg.scraper_probe_timeout_secs, 5);
    assert_eq!(cfg.scraper_user_agent, "custom-agent/2.0");
    assert_eq!(cfg.scraper_inter_request_delay_ms, 0);
    assert_eq!(cfg.scraper_challenge_retry_delay_ms, 100);
    assert_eq!(cfg.scraper_max_listing_pages, 3);
    assert_eq!(cfg.scraper_max_sitemaps, 4);
    assert_eq!(cfg.rate_limit_per_minute, 2);
}

#[test]
fn non_numeric_delay_is_rejected() {
    let result = config_with(&[("SHOPSCOUT_SCRAPER_INTER_REQUEST_DELAY_MS", "soon")]);
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPSCOUT_SCRAPER_INTER_REQUEST_DELAY_MS"
        ),
        "expected InvalidEnvVar, got: {result:?}"
    );
}

#[test]
fn zero_listing_pages_is_rejected() {
    let result = config_with(&[("SHOPSCOUT_SCRAPER_MAX_LISTING_PAGES", "0")]);
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPSCOUT_SCRAPER_MAX_LISTING_PAGES"
        ),
        "expected InvalidEnvVar, got: {result:?}"
    );
}

#[test]
fn zero_sitemap_cap_is_rejected() {
    let result = config_with(&[("SHOPSCOUT_SCRAPER_MAX_SITEMAPS", "0")]);
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPSCOUT_SCRAPER_MAX_SITEMAPS"
        ),
        "expected InvalidEnvVar, got: {result:?}"
    );
}
