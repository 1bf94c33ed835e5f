//! Fallback-chain plumbing shared by the field extractors.

use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::rules::{Rules, SelectorList};

/// A parsed product page with the context every matcher needs.
pub(crate) struct Page<'a> {
    pub doc: &'a Html,
    pub url: &'a Url,
    pub rules: &'a Rules,
}

/// One strategy in a fallback chain.
pub(crate) trait Matcher {
    fn find(&self, page: &Page<'_>) -> Option<String>;
}

/// Runs `chain` in order and returns the first match.
pub(crate) fn first_match(page: &Page<'_>, chain: &[&dyn Matcher]) -> Option<String> {
    chain.iter().find_map(|m| m.find(page))
}

/// First element, across `selectors` in order, whose collapsed text is non-empty.
pub(crate) struct FirstText<'r>(pub &'r SelectorList);

impl Matcher for FirstText<'_> {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        self.0.iter().find_map(|selector| {
            page.doc
                .select(selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
    }
}

/// Text content of an element with whitespace runs collapsed to single spaces.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
