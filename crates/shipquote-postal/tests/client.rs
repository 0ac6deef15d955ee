//! Integration tests for `PostalClient` using wiremock HTTP mocks.

use std::time::Duration;

use shipquote_core::PostalCode;
use shipquote_postal::{PostalClient, PostalError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, max_retries: u32) -> PostalClient {
    PostalClient::with_base_url(base_url, Duration::from_secs(2), max_retries)
        .expect("client construction should not fail")
        .with_backoff_base_ms(0)
}

fn cep(raw: &str) -> PostalCode {
    PostalCode::parse(raw).expect("valid postal code")
}

#[tokio::test]
async fn resolve_returns_destination() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "cep": "89207-407",
        "logradouro": "Rua Tijucas",
        "bairro": "Centro",
        "localidade": "Joinville",
        "uf": "SC"
    });

    Mock::given(method("GET"))
        .and(path("/89207407/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let dest = client
        .resolve(&cep("89207-407"))
        .await
        .expect("should resolve");

    assert_eq!(dest.locality, "Joinville");
    assert_eq!(dest.state, "SC");
    assert_eq!(dest.postal_code, cep("89207407"));
    assert_eq!(dest.label(), "Joinville, SC");
}

#[tokio::test]
async fn resolve_unknown_code_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": true })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    let err = client.resolve(&cep("99999-999")).await.unwrap_err();
    assert!(matches!(err, PostalError::NotFound(ref code) if code == "99999-999"));
}

#[tokio::test]
async fn resolve_missing_state_is_incomplete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/01001000/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "localidade": "São Paulo" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let err = client.resolve(&cep("01001-000")).await.unwrap_err();
    assert!(matches!(err, PostalError::Incomplete(_)));
}

#[tokio::test]
async fn resolve_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "localidade": "São Paulo",
            "uf": "sp"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let dest = client
        .resolve(&cep("01310-100"))
        .await
        .expect("should succeed on retry");
    assert_eq!(dest.locality, "São Paulo");
    assert_eq!(dest.state, "SP");
}

#[tokio::test]
async fn resolve_gives_up_after_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let err = client.resolve(&cep("01310-100")).await.unwrap_err();
    assert!(matches!(err, PostalError::Http(_)));
}

#[tokio::test]
async fn resolve_does_not_retry_client_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let err = client.resolve(&cep("01310-100")).await.unwrap_err();
    assert!(matches!(err, PostalError::Http(_)));
}

#[tokio::test]
async fn resolve_malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let err = client.resolve(&cep("01310-100")).await.unwrap_err();
    assert!(matches!(err, PostalError::Deserialize { .. }));
}
