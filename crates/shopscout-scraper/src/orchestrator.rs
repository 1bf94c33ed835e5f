//! End-to-end site scrape: discovery, classification and extraction.

use std::time::Duration;

use reqwest::Url;
use scraper::Html;
use shopscout_core::config::DEFAULT_USER_AGENT;
use shopscout_core::{load_heuristics, AppConfig, HeuristicTables, ProductRecord, ScrapeResult};

use crate::classify::{classify_product, VariantSignal};
use crate::client::Fetcher;
use crate::error::ScraperError;
use crate::extract::extract_fields;
use crate::harvest;
use crate::links::{normalize_base_url, DiscoverySet};
use crate::rules::Rules;
use crate::{category, sitemap};

/// Network and pacing knobs for a [`SiteScraper`].
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub user_agent: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    /// Pause between consecutive product page requests.
    pub inter_request_delay: Duration,
    pub challenge_retry_delay: Duration,
    pub max_listing_pages: usize,
    pub max_sitemaps: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(15),
            probe_timeout: Duration::from_secs(10),
            inter_request_delay: Duration::from_millis(800),
            challenge_retry_delay: Duration::from_millis(3000),
            max_listing_pages: 50,
            max_sitemaps: 25,
        }
    }
}

impl ScraperSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.scraper_user_agent.clone(),
            request_timeout: Duration::from_secs(config.scraper_request_timeout_secs),
            probe_timeout: Duration::from_secs(config.scraper_probe_timeout_secs),
            inter_request_delay: Duration::from_millis(config.scraper_inter_request_delay_ms),
            challenge_retry_delay: Duration::from_millis(config.scraper_challenge_retry_delay_ms),
            max_listing_pages: config.scraper_max_listing_pages,
            max_sitemaps: config.scraper_max_sitemaps,
        }
    }
}

/// Result of processing one product page.
#[derive(Debug)]
pub enum PageOutcome {
    Extracted(ProductRecord),
    /// The page offers selectable variants and was discarded.
    NotSimple(VariantSignal),
    Failed(ScraperError),
}

pub struct SiteScraper {
    fetcher: Fetcher,
    rules: Rules,
    settings: ScraperSettings,
}

impl SiteScraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] or [`ScraperError::Pattern`]
    /// if `tables` do not compile, and [`ScraperError::Http`] if the HTTP
    /// client cannot be built.
    pub fn new(settings: ScraperSettings, tables: HeuristicTables) -> Result<Self, ScraperError> {
        let rules = Rules::compile(tables)?;
        let fetcher = Fetcher::new(
            &settings.user_agent,
            settings.request_timeout,
            settings.probe_timeout,
            settings.challenge_retry_delay,
        )?;
        Ok(Self {
            fetcher,
            rules,
            settings,
        })
    }

    /// Builds a scraper from application config, loading the heuristics file
    /// when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Heuristics`] if the heuristics file cannot be
    /// loaded, plus anything [`SiteScraper::new`] returns.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let tables = match &config.heuristics_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading heuristic tables");
                load_heuristics(path)?
            }
            None => HeuristicTables::default(),
        };
        Self::new(ScraperSettings::from_app_config(config), tables)
    }

    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[must_use]
    pub fn settings(&self) -> &ScraperSettings {
        &self.settings
    }

    pub async fn discover_from_sitemaps(&self, base: &Url) -> DiscoverySet {
        sitemap::discover_from_sitemaps(
            &self.fetcher,
            &self.rules,
            base,
            self.settings.max_sitemaps,
        )
        .await
    }

    pub async fn locate_category(&self, base: &Url) -> Url {
        category::locate_category(&self.fetcher, &self.rules, base).await
    }

    pub async fn harvest_links(&self, listing: &Url) -> DiscoverySet {
        harvest::harvest_links(
            &self.fetcher,
            &self.rules,
            listing,
            self.settings.max_listing_pages,
        )
        .await
    }

    /// Runs the discovery cascade: sitemaps, then the located listing page,
    /// then the homepage itself.
    pub async fn discover(&self, base: &Url) -> DiscoverySet {
        let mut links = self.discover_from_sitemaps(base).await;

        if links.is_empty() {
            tracing::info!("no products in sitemaps, trying listing pages");
            let listing = self.locate_category(base).await;
            links = self.harvest_links(&listing).await;

            if links.is_empty() && listing != *base {
                tracing::info!(base = %base, "listing page yielded nothing, trying homepage");
                links = self.harvest_links(base).await;
            }
        }

        links
    }

    /// Fetches, classifies and (for simple products) extracts one page.
    pub async fn scrape_product(&self, url: &str) -> PageOutcome {
        let page_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                return PageOutcome::Failed(ScraperError::InvalidUrl {
                    url: url.to_owned(),
                    reason: e.to_string(),
                })
            }
        };

        let html = match self.fetcher.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => return PageOutcome::Failed(e),
        };

        classify_and_extract(&html, &page_url, &self.rules)
    }

    /// Scrapes every simple product reachable from `base_url`.
    ///
    /// Product pages are processed one at a time in discovery order with
    /// the configured delay between requests. A failing page is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `base_url` cannot be parsed.
    /// Nothing else is fatal: an undiscoverable site yields an empty result.
    pub async fn scrape_site(&self, base_url: &str) -> Result<ScrapeResult, ScraperError> {
        let base = normalize_base_url(base_url)?;
        tracing::info!(base = %base, "starting site scrape");

        let links = self.discover(&base).await;
        tracing::info!(count = links.len(), "discovered product links");
        if links.is_empty() {
            tracing::warn!(base = %base, "no product links discovered");
            return Ok(ScrapeResult::default());
        }

        let total = links.len();
        let mut result = ScrapeResult::default();

        for (i, url) in links.iter().enumerate() {
            if i > 0 && !self.settings.inter_request_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_request_delay).await;
            }
            let index = i + 1;
            tracing::info!(index, total, url, "processing {index}/{total}");

            match self.scrape_product(url).await {
                PageOutcome::Extracted(record) => {
                    if record.is_blank() {
                        tracing::debug!(url, "extracted record has neither name nor price");
                    }
                    result.products.push(record);
                }
                PageOutcome::NotSimple(signal) => {
                    tracing::debug!(url, %signal, "skipping product with variants");
                    result.skipped += 1;
                }
                PageOutcome::Failed(e) => {
                    tracing::warn!(url, error = %e, "failed to scrape product page");
                    result.skipped += 1;
                }
            }
        }

        tracing::info!(
            base = %base,
            attempted = result.attempted(),
            scraped = result.products.len(),
            skipped = result.skipped,
            "site scrape complete"
        );
        Ok(result)
    }
}

/// Synchronous tail of [`SiteScraper::scrape_product`]; keeps the parsed
/// document off the async stack.
fn classify_and_extract(html: &str, page_url: &Url, rules: &Rules) -> PageOutcome {
    let doc = Html::parse_document(html);
    match classify_product(&doc, rules) {
        Some(signal) => PageOutcome::NotSimple(signal),
        None => PageOutcome::Extracted(extract_fields(&doc, page_url, rules)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_documented_defaults() {
        let settings = ScraperSettings::default();
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert_eq!(settings.probe_timeout, Duration::from_secs(10));
        assert_eq!(settings.inter_request_delay, Duration::from_millis(800));
        assert_eq!(settings.max_listing_pages, 50);
    }

    #[test]
    fn settings_follow_app_config() {
        let config = shopscout_core::config::build_app_config(|key| match key {
            "SHOPSCOUT_SCRAPER_INTER_REQUEST_DELAY_MS" => Ok("0".to_string()),
            "SHOPSCOUT_SCRAPER_MAX_SITEMAPS" => Ok("3".to_string()),
            _ => Err(std::env::VarError::NotPresent),
        })
        .unwrap();
        let settings = ScraperSettings::from_app_config(&config);
        assert!(settings.inter_request_delay.is_zero());
        assert_eq!(settings.max_sitemaps, 3);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn variant_page_is_not_extracted() {
        let rules = Rules::builtin().unwrap();
        let url = Url::parse("https://shop.test/product/tee").unwrap();
        let html = r#"<form class="variations_form cart"><select name="attribute_pa_size">
            <option>S</option><option>M</option></select></form>"#;
        assert!(matches!(
            classify_and_extract(html, &url, &rules),
            PageOutcome::NotSimple(VariantSignal::WooCommerceMarkup)
        ));
    }

    #[test]
    fn simple_page_is_extracted() {
        let rules = Rules::builtin().unwrap();
        let url = Url::parse("https://shop.test/product/mug").unwrap();
        let html = r#"<h1 class="product_title">Mug</h1><p class="price">$9.00</p>"#;
        let PageOutcome::Extracted(record) = classify_and_extract(html, &url, &rules) else {
            panic!("expected an extracted record");
        };
        assert_eq!(record.name, "Mug");
        assert_eq!(record.price, "$9.00");
    }
}
