use serde::{Deserialize, Serialize};

/// One product scraped from a detail page.
///
/// Every field is a plain `String` and defaults to `""` when the extractor
/// could not resolve it, so consumers can rely on all five keys being present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    /// Currency-prefixed amount exactly as displayed, e.g. `"$25.00"` or `"Rs. 1,299"`.
    pub price: String,
    pub description: String,
    /// Absolute URL of the primary product image.
    pub image_url: String,
    /// The detail page the record was extracted from.
    pub url: String,
}

impl ProductRecord {
    /// Returns `true` when neither a name nor a price could be extracted.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.price.is_empty()
    }
}

/// Output of one site scrape: extracted records in discovery order plus the
/// number of detail pages that were visited but rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub products: Vec<ProductRecord>,
    /// Pages that failed to fetch, were blocked, or were not simple products.
    pub skipped: usize,
}

impl ScrapeResult {
    /// Total number of detail pages the scrape attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.products.len() + self.skipped
    }
}
