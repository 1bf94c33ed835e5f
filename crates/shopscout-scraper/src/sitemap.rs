//! Product discovery through `sitemap.xml` documents and sitemap indexes.

use std::collections::{HashSet, VecDeque};

use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Url;

use crate::client::Fetcher;
use crate::error::ScraperError;
use crate::links::{looks_like_product_url, DiscoverySet};
use crate::rules::Rules;

/// `<loc>` values of one sitemap document, split by parent element.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// `<sitemap><loc>` entries of a sitemap index.
    pub sitemaps: Vec<String>,
    /// `<url><loc>` entries of a URL set.
    pub urls: Vec<String>,
}

/// Parses a sitemap or sitemap index.
///
/// Elements are matched on their local names, so both the default
/// `sitemaps.org/schemas/sitemap/0.9` namespace and prefixed documents work.
///
/// # Errors
///
/// Returns the underlying `quick_xml::Error` for malformed XML.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = SitemapDocument::default();
    let mut stack: Vec<String> = Vec::new();
    let mut loc = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "loc" {
                    loc.clear();
                }
                stack.push(name);
            }
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    continue;
                };
                if name != "loc" {
                    continue;
                }
                let value = loc.trim();
                if value.is_empty() {
                    continue;
                }
                match stack.last().map(String::as_str) {
                    Some("sitemap") => doc.sitemaps.push(value.to_owned()),
                    Some("url") => doc.urls.push(value.to_owned()),
                    _ => {}
                }
            }
            Event::Text(e) => {
                if stack.last().is_some_and(|n| n == "loc") {
                    loc.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if stack.last().is_some_and(|n| n == "loc") {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(doc)
}

/// Tries each candidate sitemap in order and returns the product links of
/// the first one (including nested product sitemaps) that yields any.
///
/// `visited` is shared across candidates so a sitemap reachable from several
/// places is only fetched once, and `max_sitemaps` caps total fetches.
pub async fn discover_from_sitemaps(
    fetcher: &Fetcher,
    rules: &Rules,
    base: &Url,
    max_sitemaps: usize,
) -> DiscoverySet {
    let mut visited: HashSet<String> = HashSet::new();
    let mut fetched = 0usize;

    for path in &rules.tables.sitemap_paths {
        let Ok(candidate) = base.join(path) else {
            continue;
        };
        tracing::info!(url = %candidate, "checking sitemap");

        let links = walk_sitemap_tree(
            fetcher,
            rules,
            candidate.into(),
            &mut visited,
            &mut fetched,
            max_sitemaps,
        )
        .await;

        if !links.is_empty() {
            tracing::info!(count = links.len(), "product links found in sitemaps");
            return links;
        }
    }

    DiscoverySet::new()
}

/// Fetches and parses one sitemap document; `Ok(None)` when the server
/// answers with anything other than 200.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] on transport failure and
/// [`ScraperError::Xml`] when the body is not well-formed XML.
pub async fn fetch_sitemap(
    fetcher: &Fetcher,
    url: &str,
) -> Result<Option<SitemapDocument>, ScraperError> {
    let page = fetcher.probe(url).await?;
    if !page.is_ok() {
        tracing::debug!(url, status = page.status, "sitemap not available");
        return Ok(None);
    }
    parse_sitemap(&page.body)
        .map(Some)
        .map_err(|source| ScraperError::Xml {
            url: url.to_owned(),
            source,
        })
}

async fn walk_sitemap_tree(
    fetcher: &Fetcher,
    rules: &Rules,
    root: String,
    visited: &mut HashSet<String>,
    fetched: &mut usize,
    max_sitemaps: usize,
) -> DiscoverySet {
    let mut links = DiscoverySet::new();
    let mut queue: VecDeque<String> = VecDeque::from([root]);

    while let Some(sitemap_url) = queue.pop_front() {
        if !visited.insert(sitemap_url.clone()) {
            continue;
        }
        if *fetched >= max_sitemaps {
            tracing::warn!(max_sitemaps, "sitemap fetch limit reached");
            break;
        }
        *fetched += 1;

        let doc = match fetch_sitemap(fetcher, &sitemap_url).await {
            Ok(Some(doc)) => doc,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(url = %sitemap_url, error = %e, "failed fetching sitemap");
                continue;
            }
        };

        for nested in doc.sitemaps {
            if nested.to_lowercase().contains("product") && !visited.contains(&nested) {
                queue.push_back(nested);
            }
        }

        for loc in doc.urls {
            if looks_like_product_url(&loc, &rules.tables.product_url_markers) {
                links.insert(loc);
            }
        }
    }

    links
}
