use serde::Deserialize;

/// Main configuration structure for Shelf-Crawler
///
/// Every section is optional; missing keys fall back to the reference
/// catalog run (five pages of books.toscrape.com).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing URL with a `{page}` placeholder for the 1-based page number
    #[serde(rename = "start-url-template", default = "default_start_url_template")]
    pub start_url_template: String,

    /// Number of pages to walk; fixed for the whole run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum number of page fetches in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Minimum time between request starts (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Host the crawl is confined to
    #[serde(rename = "allowed-domain", default = "default_allowed_domain")]
    pub allowed_domain: Option<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_agent")]
    pub agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Path to the CSV export file
    #[serde(rename = "export-path", default = "default_export_path")]
    pub export_path: String,
}

/// CSS selectors describing the listing layout
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// One element per listing item
    #[serde(default = "default_item_selector")]
    pub item: String,

    /// Link carrying the title attribute
    #[serde(default = "default_title_selector")]
    pub title: String,

    #[serde(default = "default_price_selector")]
    pub price: String,

    #[serde(default = "default_availability_selector")]
    pub availability: String,

    /// Element whose class list carries the rating word
    #[serde(default = "default_rating_selector")]
    pub rating: String,
}

fn default_start_url_template() -> String {
    "http://books.toscrape.com/catalogue/page-{page}.html".to_string()
}
fn default_max_pages() -> u32 {
    5
}
fn default_concurrency() -> u32 {
    8
}
fn default_request_delay() -> u64 {
    1000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_allowed_domain() -> Option<String> {
    Some("books.toscrape.com".to_string())
}
fn default_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0".to_string()
}
fn default_database_path() -> String {
    "books.db".to_string()
}
fn default_export_path() -> String {
    "books.csv".to_string()
}
fn default_item_selector() -> String {
    "article.product_pod".to_string()
}
fn default_title_selector() -> String {
    "h3 a".to_string()
}
fn default_price_selector() -> String {
    "p.price_color".to_string()
}
fn default_availability_selector() -> String {
    "p.instock.availability".to_string()
}
fn default_rating_selector() -> String {
    "p.star-rating".to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url_template: default_start_url_template(),
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            request_delay: default_request_delay(),
            request_timeout: default_request_timeout(),
            allowed_domain: default_allowed_domain(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agent: default_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            export_path: default_export_path(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: default_item_selector(),
            title: default_title_selector(),
            price: default_price_selector(),
            availability: default_availability_selector(),
            rating: default_rating_selector(),
        }
    }
}
