//! URL resolution, domain checks and the ordered link set.

use std::collections::HashSet;

use reqwest::Url;

use crate::error::ScraperError;

/// Insertion-ordered, deduplicating set of product URLs.
///
/// Iteration follows discovery order so progress logs and output ordering
/// are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverySet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl DiscoverySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the URL was not already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn merge(&mut self, other: DiscoverySet) {
        for url in other.order {
            self.insert(url);
        }
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl<S: Into<String>> FromIterator<S> for DiscoverySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl IntoIterator for DiscoverySet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

/// Parses a user-supplied site URL, assuming `https://` when no scheme is given.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] for empty input, unparseable input,
/// or a non-HTTP scheme.
pub fn normalize_base_url(raw: &str) -> Result<Url, ScraperError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::InvalidUrl {
            url: raw.to_owned(),
            reason: "URL is empty".to_string(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| ScraperError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            url: raw.to_owned(),
            reason: "expected an http(s) URL with a host".to_string(),
        });
    }

    Ok(url)
}

/// Resolves an `href` against the page it appeared on.
///
/// Drops fragments and rejects empty, in-page, `mailto:`, `tel:` and
/// `javascript:` links as well as non-HTTP results.
pub(crate) fn resolve_link(page: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = page.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Exact network-location match: host and effective port, no subdomain folding.
pub(crate) fn same_site(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

pub(crate) fn contains_any(haystack_lower: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack_lower.contains(&n.to_lowercase()))
}

/// `true` when the lowercased URL contains one of the product path markers.
pub(crate) fn looks_like_product_url(url: &str, markers: &[String]) -> bool {
    contains_any(&url.to_lowercase(), markers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        shopscout_core::HeuristicTables::default().product_url_markers
    }

    #[test]
    fn discovery_set_preserves_first_insertion_order() {
        let mut set = DiscoverySet::new();
        assert!(set.insert("https://a.test/products/b"));
        assert!(set.insert("https://a.test/products/a"));
        assert!(!set.insert("https://a.test/products/b"));
        assert_eq!(
            set.into_vec(),
            vec!["https://a.test/products/b", "https://a.test/products/a"]
        );
    }

    #[test]
    fn discovery_set_merge_deduplicates() {
        let mut left: DiscoverySet = ["https://a.test/p/1", "https://a.test/p/2"]
            .into_iter()
            .collect();
        let right: DiscoverySet = ["https://a.test/p/2", "https://a.test/p/3"]
            .into_iter()
            .collect();
        left.merge(right);
        assert_eq!(left.len(), 3);
        assert!(left.contains("https://a.test/p/3"));
    }

    #[test]
    fn base_url_without_scheme_gets_https() {
        let url = normalize_base_url("shop.example.com").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/");
    }

    #[test]
    fn base_url_rejects_empty_and_ftp() {
        assert!(matches!(
            normalize_base_url("   "),
            Err(ScraperError::InvalidUrl { .. })
        ));
        assert!(matches!(
            normalize_base_url("ftp://example.com"),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn resolve_link_makes_relative_absolute_and_drops_fragment() {
        let page = Url::parse("https://shop.test/collections/all").unwrap();
        let url = resolve_link(&page, "/products/mug#reviews").unwrap();
        assert_eq!(url.as_str(), "https://shop.test/products/mug");
    }

    #[test]
    fn resolve_link_rejects_non_navigational_hrefs() {
        let page = Url::parse("https://shop.test/").unwrap();
        for href in ["", "#top", "mailto:a@b.c", "tel:123", "javascript:void(0)"] {
            assert!(
                resolve_link(&page, href).is_none(),
                "{href:?} should be rejected"
            );
        }
    }

    #[test]
    fn same_site_is_exact_on_host() {
        let a = Url::parse("https://shop.test/a").unwrap();
        let b = Url::parse("https://shop.test:443/b").unwrap();
        let sub = Url::parse("https://www.shop.test/a").unwrap();
        let other_port = Url::parse("https://shop.test:8443/a").unwrap();
        assert!(same_site(&a, &b));
        assert!(!same_site(&a, &sub));
        assert!(!same_site(&a, &other_port));
    }

    #[test]
    fn product_markers_are_case_insensitive() {
        assert!(looks_like_product_url("https://x.test/Products/Mug", &markers()));
        assert!(looks_like_product_url("https://x.test/mug-123.html", &markers()));
        assert!(!looks_like_product_url("https://x.test/about-us", &markers()));
    }
}
