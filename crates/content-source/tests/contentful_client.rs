//! Integration tests for the Contentful client using wiremock.

use rust_decimal_macros::dec;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfsync_content_source::{ContentSource, ContentSourceError, ContentfulConfig, ContentfulSource};

const ENTRIES_PATH: &str = "/spaces/space-1/environments/master/entries";

fn config(base_url: &str, page_size: u32) -> ContentfulConfig {
    ContentfulConfig {
        base_url: base_url.to_string(),
        content_type: "product".to_string(),
        environment: "master".to_string(),
        access_token: "secret-token".to_string(),
        space_id: "space-1".to_string(),
        page_size,
    }
}

fn entry(id: &str, name: &str) -> Value {
    json!({
        "metadata": { "tags": [] },
        "sys": {
            "id": id,
            "createdAt": "2024-12-01T10:00:00.000Z",
            "updatedAt": "2025-01-01T08:30:00.000Z"
        },
        "fields": { "name": name, "price": 19.99, "currency": "USD", "stock": 3 }
    })
}

fn page(items: Vec<Value>, total: u64, skip: u64, limit: u64) -> Value {
    json!({ "sys": { "type": "Array" }, "total": total, "skip": skip, "limit": limit, "items": items })
}

#[tokio::test]
async fn test_fetch_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .and(query_param("content_type", "product"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![entry("a", "Alpha"), entry("b", "Beta")], 2, 0, 100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 100));
    let listing = source.fetch_listing().await.unwrap();

    assert_eq!(listing.len(), 2);
    assert_eq!(listing.rejected, 0);
    assert_eq!(listing.items[0].id, "a");
    assert_eq!(listing.items[1].fields.name, "Beta");
    assert_eq!(listing.items[0].fields.price, Some(dec!(19.99)));
}

#[tokio::test]
async fn test_fetch_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![entry("1", "One"), entry("2", "Two")], 3, 0, 2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .and(query_param("skip", "2"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![entry("3", "Three")], 3, 2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 2));
    let listing = source.fetch_listing().await.unwrap();

    let ids: Vec<&str> = listing.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_empty_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0, 0, 100)))
        .expect(1)
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 100));
    let listing = source.fetch_listing().await.unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_invalid_entries_are_counted_not_fatal() {
    let server = MockServer::start().await;

    let broken = json!({ "sys": { "id": "bad" }, "fields": { "name": "No timestamps" } });
    let nameless = json!({
        "sys": { "id": "nameless", "createdAt": "2025-01-01", "updatedAt": "2025-01-01" },
        "fields": { "brand": "Acme" }
    });

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![entry("ok", "Fine"), broken, nameless], 3, 0, 100)),
        )
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 100));
    let listing = source.fetch_listing().await.unwrap();

    assert_eq!(listing.len(), 1);
    assert_eq!(listing.items[0].id, "ok");
    assert_eq!(listing.rejected, 2);
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("The access token you sent could not be found"))
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 100));
    match source.fetch_listing().await {
        Err(ContentSourceError::HttpStatus { status, message }) => {
            assert_eq!(status, 401);
            assert!(message.contains("access token"));
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 100));
    let err = source.fetch_listing().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 100));
    let err = source.fetch_listing().await.unwrap_err();
    assert!(matches!(err, ContentSourceError::Decode(_)));
}

#[tokio::test]
async fn test_failure_on_later_page_fails_whole_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![entry("1", "One")], 2, 0, 1)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .and(query_param("skip", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = ContentfulSource::with_config(config(&server.uri(), 1));
    let err = source.fetch_listing().await.unwrap_err();
    assert!(matches!(err, ContentSourceError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_missing_config_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0, 0, 100)))
        .expect(0)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let source = ContentfulSource::from_lookup(move |key| match key {
        "CONTENTFUL_URL" => Some(base_url.clone()),
        "CONTENTFUL_CONTENT_TYPE" => Some("product".to_string()),
        "CONTENTFUL_ENVIRONMENT" => Some("master".to_string()),
        "CONTENTFUL_ACCESS_TOKEN" => Some("   ".to_string()),
        _ => None,
    });

    let err = source.fetch_listing().await.unwrap_err();
    match err {
        ContentSourceError::MissingConfig { keys } => {
            assert_eq!(keys, vec!["CONTENTFUL_ACCESS_TOKEN", "CONTENTFUL_SPACE_ID"]);
        }
        other => panic!("expected MissingConfig, got {:?}", other),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_config_is_resolved_at_fetch_time() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENTRIES_PATH))
        .and(query_param("limit", "25"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(vec![entry("a", "Alpha")], 1, 0, 25)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let source = ContentfulSource::from_lookup(move |key| match key {
        "CONTENTFUL_URL" => Some(base_url.clone()),
        "CONTENTFUL_CONTENT_TYPE" => Some("product".to_string()),
        "CONTENTFUL_ENVIRONMENT" => Some("master".to_string()),
        "CONTENTFUL_ACCESS_TOKEN" => Some("secret-token".to_string()),
        "CONTENTFUL_SPACE_ID" => Some("space-1".to_string()),
        "CONTENTFUL_PAGE_SIZE" => Some("25".to_string()),
        _ => None,
    });

    let listing = source.fetch_listing().await.unwrap();
    assert_eq!(listing.len(), 1);
}
