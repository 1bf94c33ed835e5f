//! Product link harvesting from listing pages, with single next-link pagination.

use std::collections::HashSet;

use reqwest::Url;
use scraper::Html;

use crate::client::Fetcher;
use crate::links::{contains_any, looks_like_product_url, resolve_link, same_site, DiscoverySet};
use crate::rules::Rules;

/// Links found on one listing page and its "next page" link, if any.
#[derive(Debug, Default)]
pub struct ListingScan {
    pub links: Vec<String>,
    pub next_page: Option<Url>,
}

/// Harvests product links from `listing` and every page reached through
/// its "next page" chain.
///
/// Visited listing URLs are tracked and at most `max_pages` pages are
/// fetched; next links that leave the listing's domain are not followed.
/// A failed fetch ends the chain and keeps what was already collected.
pub async fn harvest_links(
    fetcher: &Fetcher,
    rules: &Rules,
    listing: &Url,
    max_pages: usize,
) -> DiscoverySet {
    let mut links = DiscoverySet::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut next = Some(listing.clone());

    while let Some(page_url) = next.take() {
        if !visited.insert(page_url.as_str().to_owned()) {
            tracing::debug!(url = %page_url, "pagination revisits a listing page, stopping");
            break;
        }
        if visited.len() > max_pages {
            tracing::warn!(max_pages, "listing page limit reached");
            break;
        }

        let body = match fetcher.page(page_url.as_str()).await {
            Ok(page) if page.is_ok() => page.body,
            Ok(page) => {
                tracing::warn!(
                    url = %page_url,
                    status = page.status,
                    "failed to load listing page"
                );
                break;
            }
            Err(e) => {
                tracing::warn!(url = %page_url, error = %e, "failed to load listing page");
                break;
            }
        };

        let scan = scan_listing_page(&body, &page_url, rules);
        tracing::debug!(url = %page_url, found = scan.links.len(), "scanned listing page");
        for link in scan.links {
            links.insert(link);
        }

        next = scan.next_page.filter(|n| same_site(n, listing));
    }

    links
}

/// Extracts same-domain product links and the next-page link from one
/// listing page.
///
/// The ordered selector pass runs first; only when it yields nothing is
/// every anchor scanned, with navigation-looking hrefs excluded.
#[must_use]
pub fn scan_listing_page(html: &str, page_url: &Url, rules: &Rules) -> ListingScan {
    let doc = Html::parse_document(html);
    let markers = &rules.tables.product_url_markers;

    let accept = |href: &str| -> Option<String> {
        let url = resolve_link(page_url, href)?;
        if !same_site(&url, page_url) || !looks_like_product_url(url.as_str(), markers) {
            return None;
        }
        Some(url.into())
    };

    let mut found = DiscoverySet::new();
    for selector in &rules.listing_links {
        for el in doc.select(selector) {
            if let Some(link) = el.value().attr("href").and_then(accept) {
                found.insert(link);
            }
        }
    }

    if found.is_empty() {
        let exclusions = &rules.tables.navigation_exclusions;
        for el in doc.select(&rules.base.anchor) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            if contains_any(&href.to_lowercase(), exclusions) {
                continue;
            }
            if let Some(link) = accept(href) {
                found.insert(link);
            }
        }
    }

    let next_page = rules.next_page.iter().find_map(|selector| {
        doc.select(selector)
            .find_map(|el| el.value().attr("href"))
            .and_then(|href| resolve_link(page_url, href))
    });

    ListingScan {
        links: found.into_vec(),
        next_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(html: &str, page: &str) -> ListingScan {
        let rules = Rules::builtin().unwrap();
        scan_listing_page(html, &Url::parse(page).unwrap(), &rules)
    }

    #[test]
    fn woocommerce_loop_links_are_collected() {
        let html = r#"<ul class="products">
            <li class="product"><a class="woocommerce-LoopProduct-link" href="/product/a">A</a></li>
            <li class="product"><a class="woocommerce-LoopProduct-link" href="/product/b">B</a></li>
        </ul>"#;
        let result = scan(html, "https://shop.test/shop/");
        assert_eq!(
            result.links,
            vec!["https://shop.test/product/a", "https://shop.test/product/b"]
        );
    }

    #[test]
    fn foreign_domains_are_never_included() {
        let html = r#"
            <a class="product-item-link" href="https://other.test/products/x">X</a>
            <a class="product-item-link" href="https://www.shop.test/products/y">Y</a>
            <a class="product-item-link" href="/products/z">Z</a>"#;
        let result = scan(html, "https://shop.test/catalog/");
        assert_eq!(result.links, vec!["https://shop.test/products/z"]);
    }

    #[test]
    fn selector_matches_still_need_a_product_marker() {
        let html = r#"<a class="product-item-link" href="/about-us">About</a>"#;
        let result = scan(html, "https://shop.test/");
        assert!(result.links.is_empty());
    }

    #[test]
    fn fallback_scan_excludes_navigation_links() {
        let html = r#"
            <a href="/widget-blue.html">Blue widget</a>
            <a href="/category/widgets.html">Widgets</a>
            <a href="/cart.html">Cart</a>
            <a href="/shop/page/2">Page 2</a>"#;
        let result = scan(html, "https://shop.test/");
        assert_eq!(result.links, vec!["https://shop.test/widget-blue.html"]);
    }

    #[test]
    fn next_page_link_is_resolved() {
        let html =
            r#"<a href="/products/a">A</a><a class="next page-numbers" href="?page=2">Next</a>"#;
        let result = scan(html, "https://shop.test/shop/");
        assert_eq!(
            result.next_page.map(String::from).as_deref(),
            Some("https://shop.test/shop/?page=2")
        );
    }

    #[test]
    fn duplicate_links_are_collapsed() {
        let html = r#"<a href="/products/a">img</a><a href="/products/a#details">title</a>"#;
        let result = scan(html, "https://shop.test/");
        assert_eq!(result.links, vec!["https://shop.test/products/a"]);
    }
}
