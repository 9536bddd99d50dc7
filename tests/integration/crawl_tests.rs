//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing pages and run the full crawl
//! cycle end-to-end into a temporary database and export file.

use shelf_crawler::config::{Config, CrawlerConfig, OutputConfig};
use shelf_crawler::crawler::FetchError;
use shelf_crawler::storage::{SqliteStorage, Storage};
use shelf_crawler::{run_crawl, ShelfError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Book {
    title: &'static str,
    price: &'static str,
    stars: &'static str,
    availability: &'static str,
}

const fn book(
    title: &'static str,
    price: &'static str,
    stars: &'static str,
    availability: &'static str,
) -> Book {
    Book {
        title,
        price,
        stars,
        availability,
    }
}

fn listing_page(books: &[Book]) -> String {
    let items: String = books
        .iter()
        .map(|b| {
            format!(
                r#"<li class="col-xs-6">
                <article class="product_pod">
                    <div class="image_container"><a href="book.html"><img src="x.jpg" alt="{title}"></a></div>
                    <p class="star-rating {stars}"><i class="icon-star"></i></p>
                    <h3><a href="book.html" title="{title}">{title}</a></h3>
                    <div class="product_price">
                        <p class="price_color">{price}</p>
                        <p class="instock availability">
                            <i class="icon-ok"></i>
                            {availability}
                        </p>
                    </div>
                </article>
                </li>"#,
                title = b.title,
                stars = b.stars,
                price = b.price,
                availability = b.availability
            )
        })
        .collect();

    format!(
        r#"<html><head><title>All products</title></head><body>
        <section><ol class="row">{}</ol></section>
        </body></html>"#,
        items
    )
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/catalogue/page-{}.html", page)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Creates a test configuration pointed at the mock server
fn create_test_config(server: &MockServer, max_pages: u32, dir: &TempDir) -> Config {
    let base_url = server.uri();
    let host = url::Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    Config {
        crawler: CrawlerConfig {
            start_url_template: format!("{}/catalogue/page-{{page}}.html", base_url),
            max_pages,
            concurrency: 2,
            request_delay: 0,
            request_timeout: 5,
            allowed_domain: Some(host),
        },
        output: OutputConfig {
            database_path: db_path(dir).display().to_string(),
            export_path: export_path(dir).display().to_string(),
        },
        ..Config::default()
    }
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("books.db")
}

fn export_path(dir: &TempDir) -> PathBuf {
    dir.path().join("books.csv")
}

fn read_export(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open export");
    reader
        .records()
        .map(|r| r.expect("Bad CSV row").iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_three_pages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        listing_page(&[
            book("A Light in the Attic", "£51.77", "Three", "In stock"),
            book("Tipping the Velvet", "£53.74", "One", "In stock"),
        ]),
    )
    .await;
    mount_page(
        &mock_server,
        2,
        listing_page(&[book("Soumission", "£50.10", "Five", "In stock")]),
    )
    .await;
    mount_page(
        &mock_server,
        3,
        listing_page(&[
            book("Sharp Objects", "£47.82", "Four", "In stock"),
            book("Sapiens", "£54.23", "Unrated", "Out of stock"),
        ]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server, 3, &dir);

    let summary = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(summary.items_seen, 5);
    assert_eq!(summary.records_exported, 5);
    assert_eq!(summary.records_stored, 5);
    assert_eq!(summary.items_skipped, 0);
    assert_eq!(summary.structured_failures, 0);

    // Structured store holds every record in extraction order
    let storage = SqliteStorage::new(&db_path(&dir)).expect("Failed to open DB");
    let books = storage.get_books().unwrap();
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "A Light in the Attic",
            "Tipping the Velvet",
            "Soumission",
            "Sharp Objects",
            "Sapiens"
        ]
    );
    assert_eq!(books[0].price, Some(51.77));
    assert_eq!(books[0].rating, Some(3));
    assert_eq!(books[4].rating, Some(0));
    assert_eq!(books[4].availability.as_deref(), Some("Out of stock"));

    // Export has the header then the same rows in the same order
    let rows = read_export(&export_path(&dir));
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0], vec!["Title", "Price", "Availability", "Rating"]);
    assert_eq!(rows[1], vec!["A Light in the Attic", "51.77", "In stock", "3"]);
    assert_eq!(rows[3], vec!["Soumission", "50.1", "In stock", "5"]);
    assert_eq!(rows[5][0], "Sapiens");
}

#[tokio::test]
async fn test_stops_at_max_pages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        listing_page(&[book("Only Page", "£10.00", "Two", "In stock")]),
    )
    .await;

    // Page 2 exists but must never be requested
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server, 1, &dir);

    let summary = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.items_seen, 1);
}

#[tokio::test]
async fn test_missing_page_aborts_with_last_persisted_page() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        listing_page(&[
            book("First", "£1.00", "One", "In stock"),
            book("Second", "£2.00", "Two", "In stock"),
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server, 3, &dir);
    config.crawler.concurrency = 1;

    let err = run_crawl(config).await.unwrap_err();
    match err {
        ShelfError::Aborted {
            last_persisted_page,
            items_seen,
            source,
        } => {
            assert_eq!(last_persisted_page, 1);
            assert_eq!(items_seen, 2);
            assert!(matches!(
                *source,
                ShelfError::Fetch(FetchError::Status { status: 404, .. })
            ));
        }
        other => panic!("Expected abort, got {:?}", other),
    }

    // Page 1 is fully persisted in both sinks
    let storage = SqliteStorage::new(&db_path(&dir)).expect("Failed to open DB");
    assert_eq!(storage.count_books().unwrap(), 2);
    assert_eq!(read_export(&export_path(&dir)).len(), 3);
}

#[tokio::test]
async fn test_malformed_price_is_skipped_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        listing_page(&[
            book("Priced", "£12.50", "Four", "In stock"),
            book("Unpriced", "see store", "Four", "In stock"),
        ]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server, 1, &dir);

    let summary = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(summary.items_seen, 2);
    assert_eq!(summary.items_skipped, 1);

    let storage = SqliteStorage::new(&db_path(&dir)).expect("Failed to open DB");
    assert_eq!(storage.count_books().unwrap(), 1);
    assert_eq!(read_export(&export_path(&dir)).len(), 2);
}

#[tokio::test]
async fn test_rerun_truncates_export() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[book(
            "Repeat",
            "£3.00",
            "One",
            "In stock",
        )])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();

    run_crawl(create_test_config(&mock_server, 1, &dir))
        .await
        .expect("First crawl failed");
    run_crawl(create_test_config(&mock_server, 1, &dir))
        .await
        .expect("Second crawl failed");

    // The export starts over while the database keeps appending
    assert_eq!(read_export(&export_path(&dir)).len(), 2);
    let storage = SqliteStorage::new(&db_path(&dir)).expect("Failed to open DB");
    assert_eq!(storage.count_books().unwrap(), 2);
}
