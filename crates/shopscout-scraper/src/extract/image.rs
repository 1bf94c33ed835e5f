use scraper::ElementRef;

use crate::links::contains_any;
use crate::matcher::{Matcher, Page};

/// Main product image selectors, ending with `og:image`. Placeholder-looking
/// URLs are passed over in favour of the next candidate.
pub(super) struct PrimaryImage;

impl Matcher for PrimaryImage {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        let placeholders = &page.rules.tables.image_placeholder_markers;
        page.rules.image.iter().find_map(|selector| {
            page.doc
                .select(selector)
                .filter_map(|el| image_url(el, page))
                .find(|url| !contains_any(&url.to_lowercase(), placeholders))
        })
    }
}

/// Gallery container images, skipping logos, payment badges and placeholders.
pub(super) struct GalleryImage;

impl Matcher for GalleryImage {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        let exclusions = &page.rules.tables.gallery_exclusions;
        page.rules.gallery.iter().find_map(|selector| {
            page.doc
                .select(selector)
                .filter_map(|el| image_url(el, page))
                .find(|url| !contains_any(&url.to_lowercase(), exclusions))
        })
    }
}

/// Any `<img>` whose URL looks like a sized product asset.
pub(super) struct SizedImageScan;

impl Matcher for SizedImageScan {
    fn find(&self, page: &Page<'_>) -> Option<String> {
        let tables = &page.rules.tables;
        page.doc
            .select(&page.rules.base.image)
            .filter_map(|el| image_url(el, page))
            .find(|url| {
                let lower = url.to_lowercase();
                contains_any(&lower, &tables.sized_image_markers)
                    && !contains_any(&lower, &tables.gallery_exclusions)
            })
    }
}

/// First non-empty image attribute of `el`, resolved against the page URL.
fn image_url(el: ElementRef<'_>, page: &Page<'_>) -> Option<String> {
    let raw = page
        .rules
        .tables
        .image_attributes
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())?;
    page.url.join(raw).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use reqwest::Url;
    use scraper::Html;

    use super::*;
    use crate::matcher::first_match;
    use crate::rules::Rules;

    fn image_of(html: &str) -> Option<String> {
        let rules = Rules::builtin().unwrap();
        let doc = Html::parse_document(html);
        let url = Url::parse("https://shop.test/products/lamp").unwrap();
        let page = Page {
            doc: &doc,
            url: &url,
            rules: &rules,
        };
        first_match(&page, &[&PrimaryImage, &GalleryImage, &SizedImageScan])
    }

    #[test]
    fn lazy_data_src_is_preferred_over_src() {
        let html = r#"<div class="product__media">
            <img src="/blank.gif" data-src="/files/lamp-1200.jpg"></div>"#;
        assert_eq!(
            image_of(html).as_deref(),
            Some("https://shop.test/files/lamp-1200.jpg")
        );
    }

    #[test]
    fn placeholder_falls_back_to_gallery() {
        let html = r#"
            <img class="wp-post-image" src="/wp-content/uploads/woocommerce-placeholder.png">
            <div class="product-gallery">
              <img src="/img/visa.svg">
              <img src="/img/lamp-side.jpg">
            </div>"#;
        assert_eq!(
            image_of(html).as_deref(),
            Some("https://shop.test/img/lamp-side.jpg")
        );
    }

    #[test]
    fn inline_data_uri_is_treated_as_placeholder() {
        let html = r#"<img itemprop="image" src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
            <img src="https://cdn.shop.test/media/large/lamp.png">"#;
        assert_eq!(
            image_of(html).as_deref(),
            Some("https://cdn.shop.test/media/large/lamp.png")
        );
    }

    #[test]
    fn sized_scan_still_excludes_logos() {
        let html = r#"<img src="/files/logo.png"><img src="/icons/cart.svg">"#;
        assert_eq!(image_of(html), None);
    }
}
