//! Heuristic tables compiled into parsed selectors and patterns.

use regex::Regex;
use scraper::Selector;
use shopscout_core::HeuristicTables;

use crate::error::ScraperError;

/// Ordered list of parsed CSS selectors.
#[derive(Debug)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] naming the first selector
    /// that fails to parse.
    pub fn compile(sources: &[String]) -> Result<Self, ScraperError> {
        sources
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a SelectorList {
    type Item = &'a Selector;
    type IntoIter = std::slice::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn parse_selector(source: &str) -> Result<Selector, ScraperError> {
    Selector::parse(source).map_err(|e| ScraperError::InvalidSelector {
        selector: source.to_owned(),
        reason: e.to_string(),
    })
}

/// Matches a currency-prefixed amount: `Rs.`, `$`, `₹`, `€`, `£` or `¥`
/// followed by digits, commas and an optional decimal part.
const CURRENCY_AMOUNT: &str = r"(?:Rs\.?|[$₹€£¥])\s?\d[\d,]*(?:\.\d+)?";

/// Element-level selectors that are not platform heuristics.
#[derive(Debug)]
pub struct BaseSelectors {
    pub anchor: Selector,
    pub select: Selector,
    pub option: Selector,
    pub radio: Selector,
    pub body: Selector,
    pub table_cell: Selector,
    pub paragraph: Selector,
    pub image: Selector,
    pub classed: Selector,
}

impl BaseSelectors {
    fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            anchor: parse_selector("a[href]")?,
            select: parse_selector("select")?,
            option: parse_selector("option")?,
            radio: parse_selector("input[type='radio']")?,
            body: parse_selector("body")?,
            table_cell: parse_selector("td, th")?,
            paragraph: parse_selector("p")?,
            image: parse_selector("img")?,
            classed: parse_selector("[class]")?,
        })
    }
}

/// Compiled form of [`HeuristicTables`], built once per scraper.
#[derive(Debug)]
pub struct Rules {
    pub tables: HeuristicTables,
    pub base: BaseSelectors,
    pub listing_links: SelectorList,
    pub next_page: SelectorList,
    pub woocommerce_variant: SelectorList,
    pub variant_select: SelectorList,
    pub variant_radio_group: SelectorList,
    pub magento_configurable: SelectorList,
    pub name: SelectorList,
    pub sale_price: SelectorList,
    pub price: SelectorList,
    pub description: SelectorList,
    pub image: SelectorList,
    pub gallery: SelectorList,
    pub currency_amount: Regex,
    /// `None` when the label table is empty.
    pub price_labels: Option<Regex>,
}

impl Rules {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] for an unparseable selector
    /// and [`ScraperError::Pattern`] if a label pattern cannot be built.
    pub fn compile(tables: HeuristicTables) -> Result<Self, ScraperError> {
        let price_labels = if tables.price_labels.is_empty() {
            None
        } else {
            let alternation = tables
                .price_labels
                .iter()
                .map(|label| regex::escape(label))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("(?i)(?:{alternation})"))?)
        };

        Ok(Self {
            base: BaseSelectors::new()?,
            listing_links: SelectorList::compile(&tables.listing_link_selectors)?,
            next_page: SelectorList::compile(&tables.next_page_selectors)?,
            woocommerce_variant: SelectorList::compile(&tables.woocommerce_variant_selectors)?,
            variant_select: SelectorList::compile(&tables.variant_select_selectors)?,
            variant_radio_group: SelectorList::compile(&tables.variant_radio_group_selectors)?,
            magento_configurable: SelectorList::compile(&tables.magento_configurable_selectors)?,
            name: SelectorList::compile(&tables.name_selectors)?,
            sale_price: SelectorList::compile(&tables.sale_price_selectors)?,
            price: SelectorList::compile(&tables.price_selectors)?,
            description: SelectorList::compile(&tables.description_selectors)?,
            image: SelectorList::compile(&tables.image_selectors)?,
            gallery: SelectorList::compile(&tables.gallery_selectors)?,
            currency_amount: Regex::new(CURRENCY_AMOUNT)?,
            price_labels,
            tables,
        })
    }

    /// Compiled built-in tables.
    ///
    /// # Errors
    ///
    /// Only fails if a built-in selector is malformed.
    pub fn builtin() -> Result<Self, ScraperError> {
        Self::compile(HeuristicTables::default())
    }
}
