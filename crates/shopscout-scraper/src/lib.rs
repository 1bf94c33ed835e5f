pub mod category;
pub mod classify;
pub mod client;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod links;
mod matcher;
pub mod orchestrator;
pub mod rules;
pub mod sitemap;

pub use classify::{classify_product, is_simple_product, VariantSignal};
pub use client::{FetchedPage, Fetcher};
pub use error::ScraperError;
pub use extract::extract_fields;
pub use links::DiscoverySet;
pub use orchestrator::{PageOutcome, ScraperSettings, SiteScraper};
pub use rules::Rules;
pub use shopscout_core::{ProductRecord, ScrapeResult};
