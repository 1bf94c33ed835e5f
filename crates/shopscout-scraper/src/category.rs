//! Locates a product listing page by probing conventional paths.

use reqwest::Url;

use crate::client::Fetcher;
use crate::rules::Rules;

/// Returns the first conventional listing path that answers 200 with
/// "product" somewhere in its body, or `base` unchanged when none does.
///
/// Probing stops at the first match; per-path failures are swallowed.
pub async fn locate_category(fetcher: &Fetcher, rules: &Rules, base: &Url) -> Url {
    tracing::info!(base = %base, "searching for product listing page");

    for path in &rules.tables.category_paths {
        let Ok(candidate) = base.join(path) else {
            continue;
        };

        match fetcher.probe(candidate.as_str()).await {
            Ok(page) if page.is_ok() && body_mentions_products(&page.body) => {
                tracing::info!(url = %candidate, "found product listing page");
                return candidate;
            }
            Ok(page) => {
                tracing::debug!(url = %candidate, status = page.status, "not a listing page");
            }
            Err(e) => {
                tracing::debug!(url = %candidate, error = %e, "category probe failed");
            }
        }
    }

    tracing::info!(base = %base, "no listing page discovered, using homepage");
    base.clone()
}

fn body_mentions_products(body: &str) -> bool {
    body.to_lowercase().contains("product")
}
