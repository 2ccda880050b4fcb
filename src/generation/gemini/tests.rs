use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn set_test_api_key() {
    // SAFETY: tests mutating the environment are serialized
    unsafe { std::env::set_var(API_KEY_ENV, "test-key") };
}

fn clear_api_key() {
    // SAFETY: tests mutating the environment are serialized
    unsafe { std::env::remove_var(API_KEY_ENV) };
}

fn mock_client(server: &MockServer) -> GeminiClient {
    let base_url = Url::parse(&server.uri()).expect("should parse mock server uri");
    GeminiClient::new(&GeminiConfig::default())
        .expect("should create client")
        .with_base_url(base_url)
}

#[test]
#[serial]
fn construction_requires_an_api_key() {
    clear_api_key();
    assert!(GeminiClient::new(&GeminiConfig::default()).is_err());

    set_test_api_key();
    let client = GeminiClient::new(&GeminiConfig::default()).expect("should create client");

    assert_eq!(client.model, "gemini-2.0-flash");
    assert_eq!(client.api_key, "test-key");
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn generate_sends_prompt_and_temperature() {
    set_test_api_key();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "What is FAISS?" }] }],
            "generationConfig": { "temperature": 0.7 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "FAISS is a similarity search library." }] } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let response = client
        .generate("What is FAISS?", 0.7)
        .expect("should generate a response");

    assert_eq!(response.into_text(), "FAISS is a similarity search library.");
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn candidate_parts_are_concatenated() {
    set_test_api_key();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hello, " }, { "text": "world." }] } }
            ]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let response = client.generate("greet", 0.7).expect("should generate");

    assert_eq!(response.into_text(), "Hello, world.");
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn multiple_candidates_keep_their_order() {
    set_test_api_key();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first answer" }] } },
                { "content": { "parts": [{ "text": "second answer" }] } }
            ]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let response = client.generate("pick one", 0.7).expect("should generate");

    let GenerationResponse::Generations { generations } = &response else {
        panic!("expected a generations list");
    };
    assert_eq!(generations.len(), 2);
    assert_eq!(response.into_text(), "first answer");
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn missing_candidates_is_an_error() {
    set_test_api_key();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = mock_client(&server);

    assert!(client.generate("anything", 0.7).is_err());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn server_errors_surface_without_retry() {
    set_test_api_key();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);

    assert!(client.generate("anything", 0.7).is_err());
}
