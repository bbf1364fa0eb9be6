//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: HTTP fetcher → envelope decoding → page iteration

use pagewalk::config::{ClientConfig, RateLimitConfig, RetryConfig};
use pagewalk::types::Method;
use pagewalk::{Error, FetchFailure, HttpFetcher, PageIterator, PaginationState, RequestConfig};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Book {
    id: u64,
    book_name: String,
}

fn book(id: u64) -> Value {
    json!({"id": id, "book_name": format!("Book {id}")})
}

fn page_body(page: u64, per_page: u64, total: u64) -> Value {
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total);
    let total_pages = total.div_ceil(per_page);
    let next_page = if page < total_pages { page + 1 } else { 0 };
    json!({
        "data": (start..end).map(book).collect::<Vec<_>>(),
        "page": {
            "current_page": page,
            "next_page": next_page,
            "total_items": total,
            "total_pages": total_pages,
            "items_per_page": per_page,
        },
        "message": format!("page {page} of {total_pages}"),
    })
}

/// Mount every page of a `total`-item collection at `/book/list`
async fn mount_book_list(server: &MockServer, per_page: u64, total: u64) {
    for page in 1..=total.div_ceil(per_page).max(1) {
        Mock::given(method("GET"))
            .and(path("/book/list"))
            .and(query_param("page", page.to_string()))
            .and(query_param("items_per_page", per_page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(page, per_page, total)))
            .mount(server)
            .await;
    }
}

fn fetcher_for(server: &MockServer) -> HttpFetcher {
    HttpFetcher::with_config(
        ClientConfig::new()
            .with_base_url(server.uri())
            .with_retry(RetryConfig {
                max_retries: 2,
                initial_interval_ms: 1,
                max_interval_ms: 5,
                ..RetryConfig::default()
            }),
    )
    .unwrap()
}

// ============================================================================
// Walking a collection
// ============================================================================

#[tokio::test]
async fn test_walk_entire_collection() {
    let server = MockServer::start().await;
    mount_book_list(&server, 24, 50).await;

    let mut books = PageIterator::<_, Book>::new(fetcher_for(&server), "/book/list");

    let mut names = Vec::new();
    while let Some(book) = books.next().await.unwrap() {
        names.push(book.book_name.clone());
    }

    assert_eq!(names.len(), 50);
    assert_eq!(names[0], "Book 0");
    assert_eq!(names[49], "Book 49");
    assert_eq!(books.pagination().current_page, 3);
    assert_eq!(books.offset(), 48);
    assert_eq!(books.message(), "page 3 of 3");
}

#[tokio::test]
async fn test_collect_all_with_custom_page_size() {
    let server = MockServer::start().await;
    mount_book_list(&server, 7, 20).await;

    let mut books = PageIterator::<_, Book>::new(fetcher_for(&server), "/book/list");
    assert!(books.set_items_per_page(7).await.unwrap());

    let all = books.collect_all().await.unwrap();
    assert_eq!(all.len(), 20);
    assert_eq!(
        all.iter().map(|b| b.id).collect::<Vec<_>>(),
        (0..20).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_page_navigation_over_http() {
    let server = MockServer::start().await;
    mount_book_list(&server, 10, 35).await;

    let mut books = PageIterator::<_, Value>::new(fetcher_for(&server), "/book/list")
        .with_pagination(PaginationState::new().with_items_per_page(10));

    let page = books.go_to_page(4).await.unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(books.offset(), 30);

    books.next_page().await.unwrap();
    assert_eq!(books.pagination().current_page, 4);

    books.previous_page().await.unwrap();
    assert_eq!(books.pagination().current_page, 3);
    assert_eq!(books.current().await.unwrap()["id"], 20);
}

#[tokio::test]
async fn test_request_template_travels_with_every_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/book/search"))
        .and(header("X-Tenant", "library"))
        .and(query_param("page", "1"))
        .and(query_param("items_per_page", "2"))
        .and(body_json(json!({"author": "Herbert"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 2, 3)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/book/search"))
        .and(header("X-Tenant", "library"))
        .and(query_param("page", "2"))
        .and(body_json(json!({"author": "Herbert"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(2, 2, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let template = RequestConfig::new()
        .method(Method::POST)
        .header("X-Tenant", "library")
        .json(json!({"author": "Herbert"}));

    let mut books = PageIterator::<_, Book>::new(fetcher_for(&server), "/book/search")
        .with_request(template)
        .with_pagination(PaginationState::new().with_items_per_page(2));

    let all = books.collect_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(books.request_template().params.len(), 0);
}

// ============================================================================
// Single records
// ============================================================================

#[tokio::test]
async fn test_single_record_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": book(42),
            "message": "found"
        })))
        .mount(&server)
        .await;

    let mut record = PageIterator::<_, Book>::new(fetcher_for(&server), "/book/42");

    let page = record.get_page().await.unwrap();
    assert_eq!(page.as_single().map(|b| b.id), Some(42));
    assert!(record.is_single_item());
    assert!(matches!(record.next_page().await, Err(Error::SingleItemMode)));
    assert_eq!(record.message(), "found");
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_server_error_message_is_captured() {
    let server = MockServer::start().await;
    mount_book_list(&server, 10, 30).await;

    Mock::given(method("GET"))
        .and(path("/book/list"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "subscription expired"})),
        )
        .with_priority(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let mut books = PageIterator::<_, Value>::new(fetcher_for(&server), "/book/list")
        .with_pagination(PaginationState::new().with_items_per_page(10));
    books.get_page().await.unwrap();

    let err = books.next_page().await.unwrap_err();
    match err {
        Error::Fetch(FetchFailure::Transport { status, .. }) => assert_eq!(status, Some(403)),
        other => panic!("Expected transport failure, got {other:?}"),
    }
    assert_eq!(books.message(), "subscription expired");
    assert_eq!(books.err().and_then(FetchFailure::status), Some(403));
    assert_eq!(books.get_page().await.unwrap().len(), 10);
    assert_eq!(books.pagination().current_page, 1);

    // The mock only rejects once; the same call now succeeds
    books.next_page().await.unwrap();
    assert!(books.err().is_none());
    assert_eq!(books.pagination().current_page, 2);
}

#[tokio::test]
async fn test_transient_failures_are_retried_by_the_fetcher() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book/list"))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(1)
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_book_list(&server, 24, 5).await;

    let mut books = PageIterator::<_, Value>::new(fetcher_for(&server), "/book/list");
    let all = books.collect_all().await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(books.err().is_none());
}

#[tokio::test]
async fn test_non_json_body_is_a_decode_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let mut books = PageIterator::<_, Value>::new(fetcher_for(&server), "/book/list");
    let err = books.next().await.unwrap_err();

    assert!(matches!(err, Error::Fetch(FetchFailure::Decode { .. })));
    assert!(books.err().is_some_and(FetchFailure::is_decode));
    assert!(books.cached_page().is_empty());
}

#[tokio::test]
async fn test_empty_body_reads_as_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book/list"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut books = PageIterator::<_, Value>::new(fetcher_for(&server), "/book/list");
    assert!(books.next().await.unwrap().is_none());
    assert!(books.err().is_none());
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_yaml_config_drives_the_fetcher() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book/list"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 24, 3)))
        .mount(&server)
        .await;

    let yaml = format!(
        "base_url: {}\nheaders:\n  X-Api-Key: secret\nretry:\n  max_retries: 0\n",
        server.uri()
    );
    let config = ClientConfig::from_yaml_str(&yaml)
        .unwrap()
        .with_rate_limit(RateLimitConfig::new(50, 5));

    let fetcher = HttpFetcher::with_config(config).unwrap();
    assert!(fetcher.has_rate_limiter());

    let mut books = PageIterator::<_, Book>::new(fetcher, "/book/list");
    assert_eq!(books.collect_all().await.unwrap().len(), 3);
}
