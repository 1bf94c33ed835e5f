//! Simple-product detection over already-fetched markup.

use std::collections::HashMap;

use scraper::{ElementRef, Html};

use crate::links::contains_any;
use crate::rules::Rules;

/// Why a page was classified as not a simple product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantSignal {
    /// WooCommerce variation, grouped or bundle markup.
    WooCommerceMarkup,
    /// A recognized variant `<select>` with more than one option.
    VariantSelect,
    /// A recognized radio group where one control has more than one input.
    VariantRadios,
    /// Magento configurable-product markup.
    MagentoConfigurable,
    /// A size/color/variant `<select>` with more than one option.
    GenericVariantSelect,
    /// `<body>` class names a variable/grouped/bundle/configurable type.
    BodyClass,
}

impl std::fmt::Display for VariantSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VariantSignal::WooCommerceMarkup => "woocommerce_variant_markup",
            VariantSignal::VariantSelect => "variant_select",
            VariantSignal::VariantRadios => "variant_radios",
            VariantSignal::MagentoConfigurable => "magento_configurable",
            VariantSignal::GenericVariantSelect => "generic_variant_select",
            VariantSignal::BodyClass => "body_class",
        };
        f.write_str(label)
    }
}

/// Returns the first non-simple signal found on the page, or `None` for a
/// simple product. Signals are checked in a fixed order.
#[must_use]
pub fn classify_product(doc: &Html, rules: &Rules) -> Option<VariantSignal> {
    let any_match = |list: &crate::rules::SelectorList| {
        list.iter()
            .any(|selector| doc.select(selector).next().is_some())
    };

    if any_match(&rules.woocommerce_variant) {
        return Some(VariantSignal::WooCommerceMarkup);
    }

    let multi_option_select = rules.variant_select.iter().any(|selector| {
        doc.select(selector)
            .any(|select| option_count(select, rules) > 1)
    });
    if multi_option_select {
        return Some(VariantSignal::VariantSelect);
    }

    let multi_radio_group = rules.variant_radio_group.iter().any(|selector| {
        doc.select(selector)
            .any(|group| has_multi_option_control(group, rules))
    });
    if multi_radio_group {
        return Some(VariantSignal::VariantRadios);
    }

    if any_match(&rules.magento_configurable) {
        return Some(VariantSignal::MagentoConfigurable);
    }

    let keywords = &rules.tables.generic_variant_keywords;
    let generic_select = doc.select(&rules.base.select).any(|select| {
        let attrs = ["name", "id", "class"]
            .iter()
            .filter_map(|attr| select.value().attr(attr))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        contains_any(&attrs, keywords) && option_count(select, rules) > 1
    });
    if generic_select {
        return Some(VariantSignal::GenericVariantSelect);
    }

    let body_class = doc
        .select(&rules.base.body)
        .next()
        .and_then(|body| body.value().attr("class"))
        .map(str::to_lowercase)
        .unwrap_or_default();
    if contains_any(&body_class, &rules.tables.body_class_markers) {
        return Some(VariantSignal::BodyClass);
    }

    None
}

/// `true` when the page offers no user-selectable variant.
#[must_use]
pub fn is_simple_product(doc: &Html, rules: &Rules) -> bool {
    classify_product(doc, rules).is_none()
}

fn option_count(select: ElementRef<'_>, rules: &Rules) -> usize {
    select.select(&rules.base.option).count()
}

/// Radio inputs are counted per `name`; unnamed inputs count against the
/// group itself.
fn has_multi_option_control(group: ElementRef<'_>, rules: &Rules) -> bool {
    let mut per_control: HashMap<&str, usize> = HashMap::new();
    group.select(&rules.base.radio).any(|radio| {
        let control = radio.value().attr("name").unwrap_or_default();
        let count = per_control.entry(control).or_default();
        *count += 1;
        *count > 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(html: &str) -> Option<VariantSignal> {
        let rules = Rules::builtin().unwrap();
        classify_product(&Html::parse_document(html), &rules)
    }

    #[test]
    fn plain_product_page_is_simple() {
        let html = r#"<body class="single-product"><h1 class="product_title">Mug</h1>
            <p class="price">$12.00</p><button>Add to cart</button></body>"#;
        assert_eq!(classify(html), None);
    }

    #[test]
    fn single_option_select_is_simple() {
        let html =
            r#"<select name="attribute_pa_size"><option value="one">One size</option></select>"#;
        assert_eq!(classify(html), None);
    }

    #[test]
    fn multi_option_variant_select_is_not_simple() {
        let html = r#"<select name="attribute_pa_size">
            <option value="s">S</option><option value="m">M</option></select>"#;
        assert_eq!(classify(html), Some(VariantSignal::VariantSelect));
    }

    #[test]
    fn woocommerce_variations_form_is_not_simple() {
        let html = r#"<form class="variations_form cart"></form>"#;
        assert_eq!(classify(html), Some(VariantSignal::WooCommerceMarkup));
    }

    #[test]
    fn shopify_radio_group_needs_two_inputs() {
        let one = r#"<variant-radios><fieldset>
            <input type="radio" name="Size" value="M">
            </fieldset></variant-radios>"#;
        let two = r#"<variant-radios><fieldset>
            <input type="radio" name="Size" value="M"><input type="radio" name="Size" value="L">
            </fieldset></variant-radios>"#;
        assert_eq!(classify(one), None);
        assert_eq!(classify(two), Some(VariantSignal::VariantRadios));
    }

    #[test]
    fn single_option_controls_sharing_a_swatch_are_simple() {
        let html = r#"<div class="swatch">
            <input type="radio" name="Size" value="M">
            <input type="radio" name="Color" value="Red">
            </div>"#;
        assert_eq!(classify(html), None);
    }

    #[test]
    fn swatch_with_two_values_for_one_control_is_not_simple() {
        let html = r#"<div class="swatch">
            <input type="radio" name="Size" value="M">
            <input type="radio" name="Color" value="Red">
            <input type="radio" name="Size" value="L">
            </div>"#;
        assert_eq!(classify(html), Some(VariantSignal::VariantRadios));
    }

    #[test]
    fn unnamed_radios_count_against_their_group() {
        let html = r#"<div class="product-options"><div class="radio-group">
            <input type="radio" value="a"><input type="radio" value="b">
            </div></div>"#;
        assert_eq!(classify(html), Some(VariantSignal::VariantRadios));
    }

    #[test]
    fn magento_swatches_are_not_simple() {
        let html = r#"<div class="product-add-form">
            <div class="swatch-opt" data-role="swatch-options"></div></div>"#;
        assert_eq!(classify(html), Some(VariantSignal::MagentoConfigurable));
    }

    #[test]
    fn generic_color_select_is_checked_by_attributes() {
        let html = r#"<select id="ColorPicker"><option>Red</option><option>Blue</option></select>"#;
        assert_eq!(classify(html), Some(VariantSignal::GenericVariantSelect));

        let unrelated = r#"<select id="qty"><option>1</option><option>2</option></select>"#;
        assert_eq!(classify(unrelated), None);
    }

    #[test]
    fn body_class_marks_configurable_product() {
        let html =
            r#"<html><body class="catalog-product-view page-product-configurable"></body></html>"#;
        assert_eq!(classify(html), Some(VariantSignal::BodyClass));
        assert!(!is_simple_product(
            &Html::parse_document(html),
            &Rules::builtin().unwrap()
        ));
    }
}
