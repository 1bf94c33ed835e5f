use std::path::Path;

use serde::Serialize;
use shopscout_core::{AppConfig, ProductRecord, ScrapeResult};
use shopscout_scraper::SiteScraper;

/// Same envelope as the HTTP response, without request metadata.
#[derive(Debug, Serialize)]
pub(crate) struct ScrapeOutput<'a> {
    status: &'static str,
    result: &'a [ProductRecord],
    skipped: usize,
}

impl<'a> From<&'a ScrapeResult> for ScrapeOutput<'a> {
    fn from(result: &'a ScrapeResult) -> Self {
        Self {
            status: "ok",
            result: &result.products,
            skipped: result.skipped,
        }
    }
}

pub(crate) fn render_output(result: &ScrapeResult, pretty: bool) -> anyhow::Result<String> {
    let output = ScrapeOutput::from(result);
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(json)
}

pub(crate) async fn run_scrape(
    config: &AppConfig,
    url: &str,
    pretty: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let scraper = SiteScraper::from_app_config(config)?;
    let result = scraper.scrape_site(url).await?;
    let json = render_output(&result, pretty)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n")).map_err(|e| {
                anyhow::anyhow!("failed to write output to {}: {e}", path.display())
            })?;
            tracing::info!(
                path = %path.display(),
                products = result.products.len(),
                "wrote scrape results"
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
