use crate::links::contains_any;
use crate::matcher::{element_text, Matcher, Page};

/// First `<p>` of product-copy length that does not read as site boilerplate.
pub(super) struct ParagraphScan;

impl Matcher for ParagraphScan {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        let tables = &page.rules.tables;
        let bounds = tables.description_min_chars..=tables.description_max_chars;

        page.doc
            .select(&page.rules.base.paragraph)
            .map(element_text)
            .find(|text| {
                bounds.contains(&text.chars().count())
                    && !contains_any(&text.to_lowercase(), &tables.description_boilerplate)
            })
    }
}
