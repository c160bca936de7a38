//! HTTP client tests against a mock France Travail API

#![allow(clippy::unwrap_used, clippy::expect_used)]

use jobmarket_ingest::config::FranceTravailConfig;
use jobmarket_ingest::francetravail::{FranceTravailClient, SearchFilters};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer, step: u32, max_results: u32) -> FranceTravailConfig {
    FranceTravailConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        token_url: format!("{}/token", server.uri()),
        search_url: format!("{}/search", server.uri()),
        step,
        max_results,
        page_delay_ms: 0,
    }
}

fn offers(count: usize, start: usize) -> serde_json::Value {
    let resultats: Vec<_> = (start..start + count)
        .map(|i| {
            json!({
                "id": format!("OFFER{}", i),
                "intitule": format!("Data Engineer {}", i),
                "origineOffre": { "urlOrigine": format!("https://example.test/offres/{}", i) }
            })
        })
        .collect();
    json!({ "resultats": resultats })
}

#[tokio::test]
async fn test_token_exchange_sends_client_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-client"))
        .and(body_string_contains("client_secret=test-secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "tok123", "expires_in": 1499 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = FranceTravailClient::new(test_config(&server, 150, 300)).unwrap();
    let token = client.fetch_token().await.unwrap();
    assert_eq!(token, "tok123");
}

#[tokio::test]
async fn test_token_error_status_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = FranceTravailClient::new(test_config(&server, 150, 300)).unwrap();
    assert!(client.fetch_token().await.is_err());
}

#[tokio::test]
async fn test_pagination_stops_at_max_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer tok"))
        .and(query_param("motsCles", "data"))
        .and(query_param("sort", "1"))
        .and(query_param("range", "0-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(offers(2, 0)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("range", "2-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(offers(2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    // max_results = 4, so range 4-5 must never be requested.
    let client = FranceTravailClient::new(test_config(&server, 2, 4)).unwrap();
    let fetched = client
        .fetch_offers("tok", &SearchFilters::keywords("data"))
        .await
        .unwrap();

    assert_eq!(fetched.len(), 4);
    assert_eq!(fetched[0].id.as_deref(), Some("OFFER0"));
    assert_eq!(fetched[3].id.as_deref(), Some("OFFER3"));
}

#[tokio::test]
async fn test_pagination_stops_on_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("range", "0-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(offers(2, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let client = FranceTravailClient::new(test_config(&server, 3, 30)).unwrap();
    let fetched = client
        .fetch_offers("tok", &SearchFilters::keywords("data"))
        .await
        .unwrap();

    // Two results against a step of three ends the run after one page.
    assert_eq!(fetched.len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_first_page_yields_no_offers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resultats": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FranceTravailClient::new(test_config(&server, 150, 300)).unwrap();
    let fetched = client
        .fetch_offers("tok", &SearchFilters::keywords("data"))
        .await
        .unwrap();

    assert!(fetched.is_empty());
}

#[tokio::test]
async fn test_search_error_status_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = FranceTravailClient::new(test_config(&server, 150, 300)).unwrap();
    assert!(client
        .fetch_offers("tok", &SearchFilters::keywords("data"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_optional_filters_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("motsCles", "data analyst"))
        .and(query_param("lieuTravail", "75"))
        .and(query_param("typeContrat", "CDI"))
        .respond_with(ResponseTemplate::new(200).set_body_json(offers(1, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let filters = SearchFilters {
        keywords: "data analyst".to_string(),
        location: Some("75".to_string()),
        contract_type: Some("CDI".to_string()),
    };

    let client = FranceTravailClient::new(test_config(&server, 150, 300)).unwrap();
    let fetched = client.fetch_offers("tok", &filters).await.unwrap();
    assert_eq!(fetched.len(), 1);
}
