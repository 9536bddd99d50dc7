//! Crawler module: fetching, extraction and the page cycle
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` trait
//! - Request throttling
//! - Listing item extraction
//! - The controller that drives pages through both sinks

mod controller;
mod extractor;
mod fetcher;
mod scheduler;

pub use controller::{run_crawl, Controller, CrawlSettings, RunSummary};
pub use extractor::{compile_selector, ListingExtractor};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpPageFetcher, PageFetcher};
pub use scheduler::RequestThrottle;
