#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netdash_api::{
    ApiClient, Error, ListQuery, ProgressFn, SearchQuery, SortOrder, TransferProgress,
    TransportConfig, UploadPayload,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, PartialEq)]
struct Doc {
    id: String,
    title: String,
}

#[derive(Debug, Serialize)]
struct DocMeta {
    title: String,
}

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    (server, client)
}

fn page_body() -> serde_json::Value {
    json!({
        "items": [
            { "id": "d1", "title": "Core switch runbook" },
            { "id": "d2", "title": "Firewall audit" }
        ],
        "pagination": {
            "currentPage": 2,
            "pageSize": 2,
            "totalPages": 4,
            "totalCount": 8,
            "hasNext": true,
            "hasPrevious": true
        },
        "metadata": { "generatedAt": "2026-01-01T00:00:00Z" }
    })
}

// ── List / search ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_page_sends_query_and_parses_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "2"))
        .and(query_param("sortBy", "createdAt"))
        .and(query_param("sortOrder", "desc"))
        .and(query_param("contentType", "application/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut filters = BTreeMap::new();
    filters.insert("contentType".to_owned(), "application/pdf".to_owned());
    let query = ListQuery {
        page: 2,
        page_size: 2,
        sort_by: Some("createdAt".into()),
        sort_order: SortOrder::Desc,
        filters,
    };

    let page = client.list_page::<Doc>("documents", &query).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, "d1");
    assert_eq!(page.pagination.current_page, 2);
    assert_eq!(page.pagination.total_count, 8);
    assert!(page.pagination.has_previous);
}

#[tokio::test]
async fn test_search_uses_q_parameter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/search"))
        .and(query_param("q", "firewall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "d2", "title": "Firewall audit" }],
            "metadata": { "took": 3 }
        })))
        .mount(&server)
        .await;

    let query = SearchQuery {
        query: "firewall".into(),
        ..SearchQuery::default()
    };
    let resp = client.search::<Doc>("documents", &query).await.unwrap();
    assert_eq!(resp.results.len(), 1);
    assert_eq!(resp.metadata["took"], 3);
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Document not found",
            "code": "document.not_found"
        })))
        .mount(&server)
        .await;

    let err = client.fetch::<Doc>("documents", "missing").await.unwrap_err();
    match err {
        Error::Server {
            status,
            ref message,
            ref code,
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Document not found");
            assert_eq!(code.as_deref(), Some("document.not_found"));
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_plain_text_error_body_is_previewed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client
        .list_page::<Doc>("messages", &ListQuery::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Server { status: 502, ref message, .. } if message == "upstream unavailable"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/d1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.fetch::<Doc>("documents", "d1").await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let result = client.fetch::<Doc>("documents", "d1").await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_timeout(Duration::from_millis(200));
    let client = ApiClient::new(&server.uri(), &transport, None).unwrap();

    Mock::given(method("GET"))
        .and(path("/documents/d1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "d1", "title": "late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = client.fetch::<Doc>("documents", "d1").await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let token: secrecy::SecretString = "s3cret".to_string().into();
    let client = ApiClient::new(&server.uri(), &TransportConfig::default(), Some(&token)).unwrap();

    Mock::given(method("PUT"))
        .and(path("/documents/d1"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_string_contains("Renamed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "d1", "title": "Renamed" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let doc: Doc = client
        .update("documents", "d1", &json!({ "title": "Renamed" }))
        .await
        .unwrap();
    assert_eq!(doc.title, "Renamed");
}

#[tokio::test]
async fn test_remove_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/documents/d1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let confirmation = client.remove("documents", "d1").await.unwrap();
    assert!(confirmation.success);
}

#[tokio::test]
async fn test_remove_parses_confirmation() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/documents/d1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "deleted" })),
        )
        .mount(&server)
        .await;

    let confirmation = client.remove("documents", "d1").await.unwrap();
    assert_eq!(confirmation.message.as_deref(), Some("deleted"));
}

#[tokio::test]
async fn test_upload_streams_multipart_and_reports_progress() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("Rack diagram"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": "d9", "title": "Rack diagram" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let seen: Arc<Mutex<Vec<TransferProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: ProgressFn = Arc::new(move |p| sink.lock().unwrap().push(p));

    let bytes = vec![7u8; 40 * 1024];
    let payload = UploadPayload::new("rack.pdf", "application/pdf", bytes);
    let doc: Doc = client
        .upload(
            "documents",
            &DocMeta {
                title: "Rack diagram".into(),
            },
            payload,
            Some(progress),
        )
        .await
        .unwrap();
    assert_eq!(doc.id, "d9");

    let seen = seen.lock().unwrap();
    assert!(seen.len() >= 2, "expected several progress reports");
    assert!(seen.windows(2).all(|w| w[0].sent <= w[1].sent));
    let last = seen.last().unwrap();
    assert_eq!(last.sent, last.total);
    assert_eq!(last.total, 40 * 1024);
}
