use crate::item::rating::{normalize_rating, MAX_RATING};
use crate::item::{CanonicalRecord, ParseError, RawItem};
use tracing::warn;

/// Currency symbols stripped from price text before parsing
const CURRENCY_SYMBOLS: &[char] = &['£', '$', '€', '¥', '₹'];

/// Parses display price text into a number
///
/// Surrounding whitespace and currency symbols are stripped first.
/// "£51.77" → 51.77 | " $ 3.50 " → 3.5
pub fn parse_price(raw: &str) -> Result<f64, ParseError> {
    let cleaned = raw
        .trim()
        .trim_matches(|c: char| c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c));

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::Price {
            raw: raw.to_string(),
        }),
    }
}

/// Maps any rating outside `0..=5` to 0
pub fn clamp_rating(rating: u8) -> u8 {
    if rating > MAX_RATING {
        0
    } else {
        rating
    }
}

/// Turns one raw item into a canonical record
///
/// Fails only when a price is present but cannot be parsed.
pub fn normalize(raw: &RawItem) -> Result<CanonicalRecord, ParseError> {
    let price = raw.raw_price.as_deref().map(parse_price).transpose()?;

    let title = raw.title.as_deref().unwrap_or_default().trim().to_string();
    if title.is_empty() {
        warn!("Listing item has no title, keeping it with an empty one");
    }

    if let Some(p) = price {
        if p < 0.0 {
            warn!("Negative price {} for '{}'", p, title);
        }
    }

    Ok(CanonicalRecord {
        title,
        price,
        availability: raw.availability_text.trim().to_string(),
        rating: clamp_rating(normalize_rating(raw.rating_text.as_deref())),
    })
}
