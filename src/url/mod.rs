//! URL handling module for Shelf-Crawler
//!
//! This module expands the listing page template into concrete page URLs and
//! decides whether a URL stays inside the crawl's allowed domain.

mod domain;
mod template;

// Re-export main functions
pub use domain::{extract_domain, is_allowed_domain};
pub use template::{page_url, PAGE_PLACEHOLDER};
