//! Statistics generation from the structured store
//!
//! This module provides functionality for extracting and displaying
//! summary figures about the books persisted so far.

use crate::storage::{PriceStats, Storage};
use crate::ShelfError;
use std::collections::BTreeMap;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct BookStatistics {
    /// Total number of stored books
    pub total_books: u64,

    /// Count of books by rating
    pub books_by_rating: BTreeMap<u8, u64>,

    /// Price figures
    pub prices: PriceStats,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<BookStatistics, ShelfError> {
    Ok(BookStatistics {
        total_books: storage.count_books()?,
        books_by_rating: storage.rating_breakdown()?,
        prices: storage.price_stats()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &BookStatistics) {
    println!("=== Book Statistics ===\n");

    println!("Overview:");
    println!("  Total books: {}", stats.total_books);
    println!();

    println!("Books by Rating:");
    for (rating, count) in &stats.books_by_rating {
        let percentage = if stats.total_books > 0 {
            (*count as f64 / stats.total_books as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  {} star{}: {} ({:.1}%)",
            rating,
            if *rating == 1 { "" } else { "s" },
            count,
            percentage
        );
    }
    println!();

    println!("Prices:");
    match (stats.prices.min, stats.prices.max, stats.prices.average) {
        (Some(min), Some(max), Some(avg)) => {
            println!("  Min: {:.2}", min);
            println!("  Max: {:.2}", max);
            println!("  Average: {:.2}", avg);
        }
        _ => println!("  No priced books"),
    }
    println!("  Without price: {}", stats.prices.unpriced);
}
