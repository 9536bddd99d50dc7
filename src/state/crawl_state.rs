use crate::ShelfError;
use std::fmt;

/// Position of the controller in the page cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Constructed, nothing fetched yet
    Idle,

    /// Waiting for listing page `n`
    FetchingPage(u32),

    /// Extracting, normalizing and persisting the items of page `n`
    Emitting(u32),

    /// Page `n` is fully persisted; choosing the next step
    Deciding(u32),

    /// Every page has been processed
    Done,
}

impl CrawlPhase {
    /// Returns true once the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Checks whether moving to `to` is a legal step for a run of `max_pages`
    pub fn can_transition_to(&self, to: CrawlPhase, max_pages: u32) -> bool {
        match (*self, to) {
            (Self::Idle, Self::FetchingPage(1)) => true,
            (Self::FetchingPage(n), Self::Emitting(m)) => n == m,
            (Self::Emitting(n), Self::Deciding(m)) => n == m,
            (Self::Deciding(n), Self::FetchingPage(m)) => n < max_pages && m == n + 1,
            (Self::Deciding(n), Self::Done) => n >= max_pages,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::FetchingPage(n) => write!(f, "fetching page {}", n),
            Self::Emitting(n) => write!(f, "emitting page {}", n),
            Self::Deciding(n) => write!(f, "deciding after page {}", n),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Per-run pagination state
///
/// Owned by a single controller. `current_page` only moves at page
/// boundaries and `max_pages` never changes after construction.
#[derive(Debug, Clone)]
pub struct CrawlState {
    current_page: u32,
    max_pages: u32,
    items_seen: u64,
    pages_completed: u32,
    phase: CrawlPhase,
}

impl CrawlState {
    /// Creates the state for a run of `max_pages` pages
    pub fn new(max_pages: u32) -> Result<Self, ShelfError> {
        if max_pages < 1 {
            return Err(crate::ConfigError::Validation(format!(
                "max_pages must be >= 1, got {}",
                max_pages
            ))
            .into());
        }

        Ok(Self {
            current_page: 1,
            max_pages,
            items_seen: 0,
            pages_completed: 0,
            phase: CrawlPhase::Idle,
        })
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn items_seen(&self) -> u64 {
        self.items_seen
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Last page whose items were all handed to both sinks (0 = none)
    pub fn last_persisted_page(&self) -> u32 {
        self.pages_completed
    }

    /// Moves to `to`, rejecting anything outside the page cycle
    pub fn transition(&mut self, to: CrawlPhase) -> Result<(), ShelfError> {
        if !self.phase.can_transition_to(to, self.max_pages) {
            return Err(ShelfError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        tracing::trace!("Crawl phase: {} -> {}", self.phase, to);

        match to {
            CrawlPhase::FetchingPage(n) => self.current_page = n,
            CrawlPhase::Deciding(n) => self.pages_completed = n,
            _ => {}
        }

        self.phase = to;
        Ok(())
    }

    /// Counts one extracted listing item
    pub fn record_item(&mut self) {
        self.items_seen += 1;
    }

    /// Picks the phase that follows the current `Deciding(n)`
    ///
    /// Pagination is driven purely by the counter: an empty page does not
    /// end the crawl early.
    pub fn next_phase(&self) -> CrawlPhase {
        match self.phase {
            CrawlPhase::Deciding(n) if n < self.max_pages => CrawlPhase::FetchingPage(n + 1),
            CrawlPhase::Deciding(_) => CrawlPhase::Done,
            other => other,
        }
    }
}
