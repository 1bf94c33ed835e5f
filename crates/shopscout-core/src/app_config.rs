use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML file overriding individual heuristic tables.
    pub heuristics_path: Option<PathBuf>,
    /// Timeout for product and listing page requests.
    pub scraper_request_timeout_secs: u64,
    /// Timeout for sitemap and category-path probes.
    pub scraper_probe_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    /// Wait before the single retry after a challenge page.
    pub scraper_challenge_retry_delay_ms: u64,
    pub scraper_max_listing_pages: usize,
    pub scraper_max_sitemaps: usize,
    pub rate_limit_per_minute: usize,
}
