//! Listing page extractor
//!
//! Reads one [`RawItem`] per listing node, in page order:
//! - title from the `title` attribute of the item's link
//! - price from the first text node of the price element
//! - availability from every availability text fragment, joined and trimmed
//! - rating from the class attribute of the rating element
//!
//! Price and availability only read text nodes that are direct children of
//! the matched element; text inside nested elements is ignored.
//!
//! Missing fields come back as `None`; defaulting is left to the normalizer.

use crate::config::SelectorConfig;
use crate::item::RawItem;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Parses a CSS selector, reporting failures as configuration errors
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Compiled selectors for one listing layout
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    item: Selector,
    title: Selector,
    price: Selector,
    availability: Selector,
    rating: Selector,
}

impl ListingExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item: compile_selector(&config.item)?,
            title: compile_selector(&config.title)?,
            price: compile_selector(&config.price)?,
            availability: compile_selector(&config.availability)?,
            rating: compile_selector(&config.rating)?,
        })
    }

    /// Extracts every listing item of a page, in document order
    pub fn extract(&self, html: &str) -> Vec<RawItem> {
        let document = Html::parse_document(html);
        document
            .select(&self.item)
            .map(|node| self.extract_item(node))
            .collect()
    }

    fn extract_item(&self, node: ElementRef<'_>) -> RawItem {
        let title = node
            .select(&self.title)
            .next()
            .and_then(|link| link.value().attr("title"))
            .map(str::to_string);

        let raw_price = node
            .select(&self.price)
            .next()
            .and_then(|el| own_text(el).next())
            .map(str::to_string);

        let availability_text = node
            .select(&self.availability)
            .flat_map(own_text)
            .collect::<String>()
            .trim()
            .to_string();

        let rating_text = node
            .select(&self.rating)
            .next()
            .and_then(|el| el.value().attr("class"))
            .map(str::to_string);

        RawItem {
            title,
            raw_price,
            availability_text,
            rating_text,
        }
    }
}

/// Text nodes directly under `el`, in document order
fn own_text<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
}
