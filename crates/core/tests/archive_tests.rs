//! Wayback availability client against a mock HTTP server
use pagegrab_core::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "https://example.com/page/Article";

async fn client_for(server: &MockServer) -> WaybackClient {
    WaybackClient::with_endpoint(&format!("{}/wayback/available", server.uri()), FetchConfig::default()).unwrap()
}

#[tokio::test]
async fn test_lookup_finds_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": TARGET,
            "archived_snapshots": {
                "closest": {
                    "status": "200",
                    "available": true,
                    "url": "https://web.archive.org/web/2020/https://example.com/page/Article",
                    "timestamp": "20200101000000"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server).await.lookup(TARGET).await.unwrap();

    assert!(snapshot.available);
    assert_eq!(snapshot.url(), Some("https://web.archive.org/web/2020/https://example.com/page/Article"));
}

#[tokio::test]
async fn test_lookup_without_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": TARGET, "archived_snapshots": {}})))
        .mount(&server)
        .await;

    let snapshot = client_for(&server).await.lookup(TARGET).await.unwrap();

    assert_eq!(snapshot, ArchiveSnapshot::missing());
    assert_eq!(snapshot.url(), None);
}

#[tokio::test]
async fn test_lookup_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Service Unavailable</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.lookup(TARGET).await.unwrap_err();

    assert!(matches!(err, PagegrabError::ArchiveParse(_)));
}

#[tokio::test]
async fn test_lookup_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).await.lookup(TARGET).await.unwrap_err();

    assert!(matches!(err, PagegrabError::Lookup(ref m) if m.contains("503")));
}

#[tokio::test]
async fn test_lookup_unreachable() {
    let client = WaybackClient::with_endpoint("http://127.0.0.1:9/wayback/available", FetchConfig::default()).unwrap();

    let err = client.lookup(TARGET).await.unwrap_err();

    assert!(matches!(err, PagegrabError::HttpError(_) | PagegrabError::Lookup(_)), "got {err:?}");
}
