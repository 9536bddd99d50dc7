//! Crawl controller - the page cycle
//!
//! Walks listing pages `1..=max_pages` in order. For each page it fetches
//! the markup, extracts the listing items, normalizes them and hands every
//! record to the structured sink and then the export sink before moving
//! on. Pagination is purely counter-driven, so later pages are prefetched
//! (up to `concurrency` at a time) while earlier pages are being emitted;
//! results are still consumed strictly in page order by a single writer.
//!
//! Failure handling:
//! - a malformed item is skipped with a warning
//! - a failed structured write is logged and counted, the run continues
//! - a failed export write or a failed page fetch aborts the run
//!
//! Both sinks are closed on every exit path.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::extractor::ListingExtractor;
use crate::crawler::fetcher::{FetchError, FetchedPage, HttpPageFetcher, PageFetcher};
use crate::item::normalize;
use crate::output::{open_sinks, RecordSink};
use crate::state::{CrawlPhase, CrawlState};
use crate::url::page_url;
use crate::ShelfError;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Pagination settings of one run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Listing URL with a `{page}` placeholder
    pub start_url_template: String,
    pub max_pages: u32,
    /// Pages fetched ahead of the one being emitted
    pub concurrency: usize,
}

impl From<&CrawlerConfig> for CrawlSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            start_url_template: config.start_url_template.clone(),
            max_pages: config.max_pages,
            concurrency: config.concurrency as usize,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_crawled: u32,
    /// Every extracted listing item, including skipped ones
    pub items_seen: u64,
    /// Records the structured sink accepted
    pub records_stored: u64,
    /// Records written to the export file
    pub records_exported: u64,
    /// Items dropped because they failed normalization
    pub items_skipped: u64,
    pub structured_failures: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

#[derive(Debug, Default)]
struct Counters {
    records_stored: u64,
    records_exported: u64,
    items_skipped: u64,
    structured_failures: u64,
}

/// In-flight page fetches, oldest page first
///
/// Dropping the window aborts whatever is still running.
struct PrefetchWindow {
    pending: VecDeque<(u32, JoinHandle<Result<FetchedPage, FetchError>>)>,
}

impl PrefetchWindow {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn push(&mut self, page: u32, handle: JoinHandle<Result<FetchedPage, FetchError>>) {
        self.pending.push_back((page, handle));
    }

    /// Waits for the oldest fetch, which must belong to `page`
    async fn next(&mut self, page: u32, url: &str) -> Result<FetchedPage, FetchError> {
        match self.pending.pop_front() {
            Some((queued, handle)) if queued == page => match handle.await {
                Ok(result) => result,
                Err(e) => Err(FetchError::Task {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
            },
            Some((queued, _)) => Err(FetchError::Task {
                url: url.to_string(),
                message: format!("expected page {} but page {} was queued", page, queued),
            }),
            None => Err(FetchError::Task {
                url: url.to_string(),
                message: "no fetch was scheduled".to_string(),
            }),
        }
    }
}

impl Drop for PrefetchWindow {
    fn drop(&mut self) {
        for (page, handle) in self.pending.drain(..) {
            if !handle.is_finished() {
                tracing::debug!("Cancelling prefetch of page {}", page);
            }
            handle.abort();
        }
    }
}

/// Drives one crawl run from `Idle` to `Done`
pub struct Controller {
    settings: CrawlSettings,
    fetcher: Arc<dyn PageFetcher>,
    extractor: ListingExtractor,
    structured: Box<dyn RecordSink>,
    export: Box<dyn RecordSink>,
    state: CrawlState,
    counters: Counters,
}

impl Controller {
    /// Creates a controller over already opened sinks
    ///
    /// # Arguments
    ///
    /// * `settings` - Page template, page count and prefetch width
    /// * `fetcher` - Source of listing page markup
    /// * `extractor` - Compiled listing selectors
    /// * `structured` - Queryable store, written first
    /// * `export` - Flat export file, written second
    ///
    /// Invalid settings close both sinks before the error is returned.
    pub fn new(
        settings: CrawlSettings,
        fetcher: Arc<dyn PageFetcher>,
        extractor: ListingExtractor,
        mut structured: Box<dyn RecordSink>,
        mut export: Box<dyn RecordSink>,
    ) -> Result<Self, ShelfError> {
        let state = match initial_state(&settings) {
            Ok(state) => state,
            Err(e) => {
                close_quietly(structured.as_mut());
                close_quietly(export.as_mut());
                return Err(e);
            }
        };

        Ok(Self {
            settings,
            fetcher,
            extractor,
            structured,
            export,
            state,
            counters: Counters::default(),
        })
    }

    /// Runs every page, then closes both sinks
    ///
    /// A fatal error is returned as [`ShelfError::Aborted`], carrying the
    /// last page whose records all reached both sinks.
    pub async fn run(mut self) -> Result<RunSummary, ShelfError> {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} pages from {}",
            self.settings.max_pages,
            self.settings.start_url_template
        );

        let outcome = self.walk_pages().await;
        let closed = self.close_sinks();

        match outcome.and(closed) {
            Ok(()) => {
                let summary = RunSummary {
                    pages_crawled: self.state.last_persisted_page(),
                    items_seen: self.state.items_seen(),
                    records_stored: self.counters.records_stored,
                    records_exported: self.counters.records_exported,
                    items_skipped: self.counters.items_skipped,
                    structured_failures: self.counters.structured_failures,
                    started_at,
                    finished_at: Utc::now(),
                };
                tracing::info!(
                    "Crawl complete: {} pages, {} items seen, {} exported, {} skipped in {:.2}s",
                    summary.pages_crawled,
                    summary.items_seen,
                    summary.records_exported,
                    summary.items_skipped,
                    summary.elapsed_secs()
                );
                if summary.structured_failures > 0 {
                    tracing::warn!(
                        "{} records could not be stored in the database",
                        summary.structured_failures
                    );
                }
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(
                    "Crawl aborted during {} (last persisted page {}): {}",
                    self.state.phase(),
                    self.state.last_persisted_page(),
                    e
                );
                Err(ShelfError::Aborted {
                    last_persisted_page: self.state.last_persisted_page(),
                    items_seen: self.state.items_seen(),
                    source: Box::new(e),
                })
            }
        }
    }

    async fn walk_pages(&mut self) -> Result<(), ShelfError> {
        let max_pages = self.settings.max_pages;
        let width = self.settings.concurrency.max(1);
        let mut window = PrefetchWindow::new();
        let mut next_to_schedule = 1;

        self.state.transition(CrawlPhase::FetchingPage(1))?;

        loop {
            let page = self.state.current_page();

            while next_to_schedule <= max_pages && window.len() < width {
                let url = page_url(&self.settings.start_url_template, next_to_schedule)?;
                let fetcher = Arc::clone(&self.fetcher);
                let handle = tokio::spawn(async move { fetcher.fetch(&url).await });
                window.push(next_to_schedule, handle);
                next_to_schedule += 1;
            }

            let url = page_url(&self.settings.start_url_template, page)?;
            let fetched = window.next(page, url.as_str()).await?;
            tracing::debug!(
                "Fetched page {} ({} bytes, HTTP {})",
                page,
                fetched.body.len(),
                fetched.status_code
            );

            self.state.transition(CrawlPhase::Emitting(page))?;
            let emitted = self.emit_page(page, &fetched.body)?;

            self.state.transition(CrawlPhase::Deciding(page))?;
            tracing::info!(
                "Page {}/{}: {} records persisted, {} items seen so far",
                page,
                max_pages,
                emitted,
                self.state.items_seen()
            );

            let next = self.state.next_phase();
            self.state.transition(next)?;
            if next.is_terminal() {
                return Ok(());
            }
        }
    }

    /// Extracts, normalizes and persists every item of one page
    ///
    /// Returns the number of records written to the export sink.
    fn emit_page(&mut self, page: u32, body: &str) -> Result<u64, ShelfError> {
        let items = self.extractor.extract(body);
        if items.is_empty() {
            tracing::warn!("Page {} yielded no listing items", page);
        }

        let mut emitted = 0;
        for raw in &items {
            self.state.record_item();

            let record = match normalize(raw) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping item on page {}: {}", page, e);
                    self.counters.items_skipped += 1;
                    continue;
                }
            };

            match self.structured.write(&record) {
                Ok(()) => self.counters.records_stored += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to store '{}' from page {}: {}",
                        record.title,
                        page,
                        e
                    );
                    self.counters.structured_failures += 1;
                }
            }

            self.export.write(&record)?;
            self.counters.records_exported += 1;
            tracing::debug!(
                "Persisted '{}' ({:?}, rating {})",
                record.title,
                record.price,
                record.rating
            );
            emitted += 1;
        }

        Ok(emitted)
    }

    /// Closes both sinks; only an export close failure is an error
    fn close_sinks(&mut self) -> Result<(), ShelfError> {
        close_quietly(self.structured.as_mut());
        self.export.close()?;
        Ok(())
    }
}

fn initial_state(settings: &CrawlSettings) -> Result<CrawlState, ShelfError> {
    page_url(&settings.start_url_template, 1)?;
    CrawlState::new(settings.max_pages)
}

fn close_quietly(sink: &mut dyn RecordSink) {
    if let Err(e) = sink.close() {
        tracing::warn!("Failed to close {} sink: {}", sink.name(), e);
    }
}

/// Runs a complete crawl with the HTTP fetcher and the configured sinks
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every page was fetched and persisted
/// * `Err(ShelfError)` - Setup failed, or the run was aborted
pub async fn run_crawl(config: Config) -> Result<RunSummary, ShelfError> {
    crate::config::validate(&config)?;

    let extractor = ListingExtractor::new(&config.selectors)?;
    let fetcher = HttpPageFetcher::from_config(&config)?;
    let (structured, export) = open_sinks(&config.output)?;

    let controller = Controller::new(
        CrawlSettings::from(&config.crawler),
        Arc::new(fetcher),
        extractor,
        Box::new(structured),
        Box::new(export),
    )?;

    controller.run().await
}
