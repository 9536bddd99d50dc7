//! Listing items and their normalized form
//!
//! A [`RawItem`] is what the extractor reads off one listing node. The
//! normalizer turns it into a [`CanonicalRecord`], the unit both sinks persist.
//!
//! Field policies differ on purpose:
//! - `price`: absent stays absent, unparseable text is a [`ParseError`]
//! - `rating`: unknown or out-of-range values silently become 0
//! - `title`, `availability`: trimmed and passed through, empty allowed

mod normalizer;
mod rating;

pub use normalizer::{clamp_rating, normalize, parse_price};
pub use rating::{normalize_rating, MAX_RATING};

use serde::Serialize;
use thiserror::Error;

/// Errors raised while normalizing a single item
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unparseable price {raw:?}")]
    Price { raw: String },
}

/// Unvalidated fields read from one listing node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub title: Option<String>,
    pub raw_price: Option<String>,
    /// All availability text fragments joined and trimmed
    pub availability_text: String,
    /// Class attribute of the rating element, e.g. `"star-rating Three"`
    pub rating_text: Option<String>,
}

/// Normalized record ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price: Option<f64>,
    #[serde(rename = "Availability")]
    pub availability: String,
    /// Always in `0..=5`
    #[serde(rename = "Rating")]
    pub rating: u8,
}
