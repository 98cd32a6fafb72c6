use lead_scout::api_client::{BusinessApiClient, SearchErrorKind, FALLBACK_ERROR_MESSAGE};
use lead_scout::data::business::SearchCriteria;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn plumbers_in_toronto() -> SearchCriteria {
    SearchCriteria::new("plumbers", "Toronto").unwrap()
}

#[tokio::test]
async fn test_search_posts_criteria_and_returns_body_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/search"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "industry": "plumbers",
            "location": "Toronto",
            "radius_km": 10,
            "max_results": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "plumbers in Toronto",
            "total_results": 2,
            "businesses": [
                {"name": "Acme Plumbing", "phone": "555-1", "rating": 4.5, "reviews_count": 12},
                {"name": "Best Pipes", "email": "b@x.com"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BusinessApiClient::new(&server.uri());
    let response = client
        .search_businesses(&plumbers_in_toronto())
        .await
        .unwrap();

    assert_eq!(response.query, "plumbers in Toronto");
    assert_eq!(response.total_results, 2);
    assert_eq!(response.businesses[0].name, "Acme Plumbing");
    assert_eq!(response.businesses[0].rating, Some(4.5));
    assert_eq!(response.businesses[1].name, "Best Pipes");
    assert_eq!(response.businesses[1].email.as_deref(), Some("b@x.com"));
    assert_eq!(response.businesses[1].phone, None);
}

#[tokio::test]
async fn test_advanced_options_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/search"))
        .and(body_json(json!({
            "industry": "dentists",
            "location": "Oslo",
            "radius_km": 25,
            "max_results": 50
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "dentists in Oslo",
            "total_results": 0,
            "businesses": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("dentists", "Oslo")
        .unwrap()
        .with_radius_km(25)
        .with_max_results(50);
    let response = BusinessApiClient::new(&server.uri())
        .search_businesses(&criteria)
        .await
        .unwrap();
    assert!(response.businesses.is_empty());
}

#[tokio::test]
async fn test_server_detail_becomes_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/search"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "industry is required"})),
        )
        .mount(&server)
        .await;

    let err = BusinessApiClient::new(&server.uri())
        .search_businesses(&plumbers_in_toronto())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), SearchErrorKind::Server);
    assert_eq!(err.message(), "industry is required");
    assert_eq!(err.detail(), Some("industry is required"));
}

#[tokio::test]
async fn test_server_error_without_detail_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = BusinessApiClient::new(&server.uri())
        .search_businesses(&plumbers_in_toronto())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), SearchErrorKind::Server);
    assert_eq!(err.message(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_empty_detail_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/search"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": ""})))
        .mount(&server)
        .await;

    let err = BusinessApiClient::new(&server.uri())
        .search_businesses(&plumbers_in_toronto())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), SearchErrorKind::Server);
    assert_eq!(err.detail(), None);
    assert_eq!(err.message(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on the discard port
    let client = BusinessApiClient::new("http://127.0.0.1:9");
    let err = client
        .search_businesses(&plumbers_in_toronto())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), SearchErrorKind::Network);
    assert_eq!(err.message(), "Failed to search businesses");
}

#[tokio::test]
async fn test_malformed_success_body_is_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = BusinessApiClient::new(&server.uri())
        .search_businesses(&plumbers_in_toronto())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::Unknown);
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/businesses/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "version": "1.2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Trailing slash on the base URL is tolerated
    let client = BusinessApiClient::new(&format!("{}/", server.uri()));
    let status = client.health_check().await.unwrap();
    assert_eq!(status.status, "ok");
    assert_eq!(status.extra.get("version"), Some(&json!("1.2")));
}
