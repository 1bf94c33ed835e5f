//! Heuristic tables driving discovery, classification and extraction.
//!
//! Every list is ordered: earlier entries are tried first. The built-in
//! tables are returned by [`HeuristicTables::default`]; a YAML file may
//! override any subset of them, with omitted tables keeping their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicTables {
    /// Sitemap locations probed under the site origin.
    pub sitemap_paths: Vec<String>,
    /// Lowercase URL substrings that mark a likely product detail page.
    pub product_url_markers: Vec<String>,
    /// Conventional listing-page paths probed by the category locator.
    pub category_paths: Vec<String>,
    /// Selectors for product links on listing pages, platform-specific first.
    pub listing_link_selectors: Vec<String>,
    /// Href substrings that disqualify a link in the all-anchors fallback.
    pub navigation_exclusions: Vec<String>,
    pub next_page_selectors: Vec<String>,

    /// WooCommerce variable / grouped / bundle markup.
    pub woocommerce_variant_selectors: Vec<String>,
    /// `<select>` controls whose option count decides variant status.
    pub variant_select_selectors: Vec<String>,
    /// Containers whose radio-input count decides variant status.
    pub variant_radio_group_selectors: Vec<String>,
    /// Magento configurable-product markup.
    pub magento_configurable_selectors: Vec<String>,
    /// Keywords matched against a `<select>`'s name, id and class.
    pub generic_variant_keywords: Vec<String>,
    /// `<body>` class substrings naming a non-simple product type.
    pub body_class_markers: Vec<String>,

    pub name_selectors: Vec<String>,
    /// Sale/current price selectors, tried before the standard ones.
    pub sale_price_selectors: Vec<String>,
    pub price_selectors: Vec<String>,
    /// Unit markers identifying per-weight prices in table cells.
    pub price_unit_markers: Vec<String>,
    /// Label words stripped (case-insensitively) from raw price text.
    pub price_labels: Vec<String>,

    pub description_selectors: Vec<String>,
    /// Paragraph substrings marking site boilerplate rather than product copy.
    pub description_boilerplate: Vec<String>,
    pub description_min_chars: usize,
    pub description_max_chars: usize,

    pub image_selectors: Vec<String>,
    /// Attributes read from a matched image element, in order.
    pub image_attributes: Vec<String>,
    pub image_placeholder_markers: Vec<String>,
    pub gallery_selectors: Vec<String>,
    /// Image URL substrings excluded from gallery and last-resort scans.
    pub gallery_exclusions: Vec<String>,
    /// Path markers accepted by the last-resort image scan.
    pub sized_image_markers: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for HeuristicTables {
    fn default() -> Self {
        Self {
            sitemap_paths: strings(&["/sitemap.xml", "/sitemap_index.xml", "/product-sitemap.xml"]),
            product_url_markers: strings(&[
                "/product/",
                "/products/",
                "/p/",
                "/item/",
                "/items/",
                "/shop/",
                "/store/",
                ".html",
                "/buy/",
                "/pd/",
            ]),
            category_paths: strings(&[
                "/shop/",
                "/store/",
                "/products/",
                "/collections/all/",
                "/category/",
                "/product-category/",
                "/catalog/",
                "/all-products/",
                "/shop-all/",
                "/items/",
                "/collections/",
            ]),
            listing_link_selectors: strings(&[
                // WooCommerce
                "ul.products li.product a.woocommerce-LoopProduct-link",
                "li.product a.woocommerce-loop-product__link",
                "li.product > a",
                // Magento
                "a.product-item-link",
                "a.product-item-photo",
                ".product-item-info a",
                // Shopify
                "a.full-unstyled-link",
                ".card__heading a",
                ".grid-product__link",
                ".product-card a",
                "a.product-card",
                ".grid__item a.grid-view-item__link",
                // generic
                "a[href*='/product/']",
                "a[href*='/products/']",
                "a[href*='/item/']",
                "a[href*='/p/']",
            ]),
            navigation_exclusions: strings(&[
                "category",
                "collection",
                "tag",
                "page",
                "cart",
                "checkout",
                "account",
            ]),
            next_page_selectors: strings(&[
                "a.next.page-numbers",
                "a.next",
                "a[rel='next']",
                "link[rel='next']",
                ".pagination__next",
                ".pages-item-next a",
                "li.next a",
            ]),
            woocommerce_variant_selectors: strings(&[
                "form.variations_form",
                "table.variations",
                "form.grouped_form",
                ".woocommerce-grouped-product-list",
                "form.bundle_form",
                ".bundled_products",
                "div.product.product-type-variable",
                "div.product.product-type-grouped",
                "div.product.product-type-bundle",
            ]),
            variant_select_selectors: strings(&[
                "select[name^='attribute_']",
                ".variations select",
                "select.single-option-selector",
                "select[name='id']",
                "select[data-option]",
                "variant-selects select",
                ".product-form__input select",
                "select.product-form__variants",
                ".swatch-attribute select",
            ]),
            variant_radio_group_selectors: strings(&[
                "variant-radios fieldset",
                "fieldset.product-form__input",
                ".swatch",
                ".product-options .radio-group",
            ]),
            magento_configurable_selectors: strings(&[
                "[data-role='swatch-options']",
                ".swatch-opt",
                "#product-options-wrapper select.super-attribute-select",
                "select.super-attribute-select",
                ".product-options-wrapper .configurable",
            ]),
            generic_variant_keywords: strings(&["size", "color", "colour", "variant"]),
            body_class_markers: strings(&[
                "product-type-variable",
                "product-type-grouped",
                "product-type-bundle",
                "product-type-configurable",
                "page-product-configurable",
                "page-product-grouped",
                "page-product-bundle",
            ]),
            name_selectors: strings(&[
                "h1.product_title",
                "h1.product-title",
                ".product_title",
                ".product-title",
                "h1.page-title span.base",
                ".product-info-main h1",
                ".product__title h1",
                "h1.product-single__title",
                ".product-single__title",
                "h1[itemprop='name']",
                "[itemprop='name']",
                "h1",
            ]),
            sale_price_selectors: strings(&[
                ".price ins .woocommerce-Price-amount",
                ".price ins",
                ".special-price .price",
                ".price-item--sale",
                ".price--on-sale .price-item--last",
                ".product__price--sale",
                ".sale-price",
                ".price-sale",
                "[data-sale-price]",
            ]),
            price_selectors: strings(&[
                ".summary .price",
                "p.price",
                "span.price",
                ".product-info-main .price",
                ".price-box .price",
                ".product__price",
                ".product-single__price",
                ".price-item--regular",
                ".product-price",
                "[itemprop='price']",
                ".woocommerce-Price-amount",
                "span.money",
                ".price",
            ]),
            price_unit_markers: strings(&["/lbs", "/lb", "/kg", "/oz", "/g", "/each"]),
            price_labels: strings(&[
                "Regular price",
                "Sale price",
                "Unit price",
                "per",
                "Sold out",
            ]),
            description_selectors: strings(&[
                ".woocommerce-product-details__short-description",
                "#tab-description",
                ".woocommerce-Tabs-panel--description",
                ".product.attribute.description .value",
                ".product.attribute.overview .value",
                ".product-single__description",
                ".product__description",
                ".product-description",
                "[itemprop='description']",
                "#product-description",
                ".description",
            ]),
            description_boilerplate: strings(&[
                "cookie",
                "copyright",
                "\u{a9}",
                "all rights reserved",
                "menu",
                "navigation",
                "quick view",
                "newsletter",
                "subscribe",
                "mailing list",
                "sign up",
            ]),
            description_min_chars: 50,
            description_max_chars: 1000,
            image_selectors: strings(&[
                ".woocommerce-product-gallery__image img",
                ".woocommerce-product-gallery img",
                "img.wp-post-image",
                ".product.media img",
                ".gallery-placeholder img",
                "img.fotorama__img",
                ".product__media img",
                ".product-single__photo img",
                ".product-featured-img",
                "img[itemprop='image']",
                "meta[property='og:image']",
            ]),
            image_attributes: strings(&["data-src", "src", "data-lazy-src", "content"]),
            image_placeholder_markers: strings(&[
                "logo",
                "transparent",
                "placeholder",
                "default",
                "data:image",
            ]),
            gallery_selectors: strings(&[
                ".woocommerce-product-gallery img",
                ".product-gallery img",
                ".product-images img",
                ".product__media-list img",
                ".product-single__photos img",
                ".fotorama img",
                ".gallery img",
                ".product-image img",
            ]),
            gallery_exclusions: strings(&[
                "logo",
                "payment",
                "visa",
                "mastercard",
                "paypal",
                "placeholder",
                "transparent",
                "data:image",
            ]),
            sized_image_markers: strings(&["/large/", "/medium/", "/product", "/item", "/files/"]),
        }
    }
}

impl HeuristicTables {
    /// Parse tables from YAML; omitted keys keep their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HeuristicsFileParse`] for malformed YAML and
    /// [`ConfigError::Validation`] for tables that would disable discovery.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let tables: Self =
            serde_yaml::from_str(content).map_err(ConfigError::HeuristicsFileParse)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Render the tables as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HeuristicsFileParse`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::HeuristicsFileParse)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.product_url_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "product_url_markers must contain at least one non-empty marker".to_string(),
            ));
        }
        if self.sitemap_paths.is_empty() && self.category_paths.is_empty() {
            return Err(ConfigError::Validation(
                "sitemap_paths and category_paths cannot both be empty".to_string(),
            ));
        }
        if self.description_min_chars > self.description_max_chars {
            return Err(ConfigError::Validation(format!(
                "description_min_chars ({}) exceeds description_max_chars ({})",
                self.description_min_chars, self.description_max_chars
            )));
        }
        Ok(())
    }
}

/// Load heuristic tables from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_heuristics(path: &Path) -> Result<HeuristicTables, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::HeuristicsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    HeuristicTables::from_yaml(&content)
}
