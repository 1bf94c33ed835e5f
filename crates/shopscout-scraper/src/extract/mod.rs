//! Per-field extraction from a product detail page.
//!
//! Each field runs its own ordered fallback chain and independently falls
//! back to an empty string, so a record is always fully populated.

mod description;
mod image;
mod price;

use reqwest::Url;
use scraper::Html;
use shopscout_core::ProductRecord;

use crate::matcher::{first_match, FirstText, Matcher, Page};
use crate::rules::Rules;

pub use price::clean_price;

/// Extracts name, price, description and image from `doc`; `page_url` is
/// recorded unchanged and used to resolve relative image URLs.
#[must_use]
pub fn extract_fields(doc: &Html, page_url: &Url, rules: &Rules) -> ProductRecord {
    let page = Page {
        doc,
        url: page_url,
        rules,
    };

    ProductRecord {
        name: run(&page, &[&FirstText(&rules.name)]),
        price: run(
            &page,
            &[
                &price::SelectorPrice(&rules.sale_price),
                &price::SelectorPrice(&rules.price),
                &price::UnitPriceCell,
                &price::PriceClassScan,
            ],
        ),
        description: run(
            &page,
            &[
                &FirstText(&rules.description),
                &description::ParagraphScan,
            ],
        ),
        image_url: run(
            &page,
            &[
                &image::PrimaryImage,
                &image::GalleryImage,
                &image::SizedImageScan,
            ],
        ),
        url: page_url.as_str().to_owned(),
    }
}

fn run(page: &Page<'_>, chain: &[&dyn Matcher]) -> String {
    first_match(page, chain).unwrap_or_default()
}
