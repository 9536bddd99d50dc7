//! State module for tracking crawl progress
//!
//! The crawl walks a fixed number of listing pages. [`CrawlState`] owns the
//! page counter and item tally for one run, and [`CrawlPhase`] is the
//! controller's position in the per-page cycle:
//!
//! `Idle → FetchingPage(n) → Emitting(n) → Deciding(n) → {FetchingPage(n+1) | Done}`

mod crawl_state;

pub use crawl_state::{CrawlPhase, CrawlState};
