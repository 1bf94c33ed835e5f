use crate::matcher::{element_text, Matcher, Page};
use crate::rules::{Rules, SelectorList};

/// Removes label words from raw price text and returns the last currency
/// amount left in it, or `None` if there is none.
///
/// Sale markup lists the struck-through amount first, so the last one wins.
#[must_use]
pub fn clean_price(raw: &str, rules: &Rules) -> Option<String> {
    let stripped = match &rules.price_labels {
        Some(labels) => labels.replace_all(raw, " "),
        None => raw.into(),
    };
    rules
        .currency_amount
        .find_iter(&stripped)
        .last()
        .map(|m| m.as_str().trim().to_owned())
}

/// First element matching `selectors` whose text yields a currency amount.
pub(super) struct SelectorPrice<'r>(pub &'r SelectorList);

impl Matcher for SelectorPrice<'_> {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        self.0.iter().find_map(|selector| {
            page.doc
                .select(selector)
                .find_map(|el| clean_price(&element_text(el), page.rules))
        })
    }
}

/// Table cells quoting a per-unit price such as `$4.99/lb`.
pub(super) struct UnitPriceCell;

impl Matcher for UnitPriceCell {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        let markers = &page.rules.tables.price_unit_markers;
        page.doc.select(&page.rules.base.table_cell).find_map(|cell| {
            let text = element_text(cell);
            let lower = text.to_lowercase();
            if !markers.iter().any(|m| lower.contains(m.as_str())) {
                return None;
            }
            clean_price(&text, page.rules)
        })
    }
}

/// Any element whose class mentions "price" and whose text holds an amount.
pub(super) struct PriceClassScan;

impl Matcher for PriceClassScan {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        page.doc.select(&page.rules.base.classed).find_map(|el| {
            let class = el.value().attr("class")?;
            if !class.to_lowercase().contains("price") {
                return None;
            }
            clean_price(&element_text(el), page.rules)
        })
    }
}
