//! End-to-end tests for the Ollama client over HTTP

mod harness;

use harness::mock_ollama::MockOllama;

use ember_config::OllamaConfig;
use ember_ollama::{Message, OllamaClient, OllamaError};

fn client_for(mock: &MockOllama, settings: &str) -> OllamaClient {
    let toml = format!("base_url = \"{}\"\n{settings}", mock.base_url());
    let config: OllamaConfig = toml::from_str(&toml).unwrap();
    OllamaClient::new(&config).unwrap()
}

#[tokio::test]
async fn chat_completion_round_trip() {
    let mock = MockOllama::start().await.unwrap();
    let client = client_for(&mock, "");

    let completion = client.completion(&[Message::user("Hi")]).await.unwrap();

    assert_eq!(completion.text, "Hello from mock Ollama");
    assert_eq!(completion.usage.prompt_tokens, 10);
    assert_eq!(completion.usage.completion_tokens, 5);
    assert_eq!(mock.chat_count(), 1);

    let totals = client.usage_totals();
    assert_eq!(totals.requests, 1);
    assert_eq!(totals.completion_tokens, 5);
}

#[tokio::test]
async fn generate_endpoint_round_trip() {
    let mock = MockOllama::start_with_reply("generated text").await.unwrap();
    let client = client_for(&mock, "api = \"generate\"");

    let completion = client.complete(&[Message::user("write")]).await.unwrap();

    assert_eq!(completion.text, "generated text");
    assert_eq!(mock.generate_count(), 1);
    assert_eq!(mock.chat_count(), 0);
}

#[tokio::test]
async fn upstream_error_surfaces_status_and_body() {
    let mock = MockOllama::start_failing(1).await.unwrap();
    let client = client_for(&mock, "");

    let err = client.complete(&[Message::user("Hi")]).await.unwrap_err();
    match err {
        OllamaError::Upstream { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("intentional failure"));
        }
        other => panic!("expected upstream error, got {other}"),
    }

    // The failure budget is spent, so the next request succeeds
    let completion = client.complete(&[Message::user("Hi")]).await.unwrap();
    assert_eq!(completion.text, "Hello from mock Ollama");
}

#[tokio::test]
async fn legacy_embeddings_wraps_flat_vector() {
    let mock = MockOllama::start().await.unwrap();
    let client = client_for(&mock, "api = \"embeddings\"");

    let rows = client.embed(&["hello".to_owned()]).await.unwrap();
    assert_eq!(rows, vec![vec![0.1, 0.2, 0.3]]);
    assert_eq!(mock.embed_count(), 1);
}

#[tokio::test]
async fn batched_embed_returns_one_row_per_input() {
    let mock = MockOllama::start().await.unwrap();
    let client = client_for(&mock, "api = \"embed\"");

    let rows = client.embed(&["a".to_owned(), "b".to_owned()]).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn garbage_body_surfaces_as_error_text_not_failure() {
    let mock = MockOllama::start_with_raw("it's broken").await.unwrap();
    let client = client_for(&mock, "");

    let completion = client.complete(&[Message::user("Hi")]).await.unwrap();

    assert!(completion.text.starts_with("[ollama error]"));
    assert!(completion.text.contains("it's broken"));
    assert_eq!(completion.usage.prompt_tokens, 0);
}

#[tokio::test]
async fn pretty_printed_body_decodes_as_a_whole() {
    // No single line of a pretty-printed object parses on its own
    let body = "{\n  \"message\": {\n    \"role\": \"assistant\",\n    \"content\": \"spread out\"\n  },\n  \"done\": true\n}";
    let mock = MockOllama::start_with_raw(body).await.unwrap();
    let client = client_for(&mock, "");

    let completion = client.complete(&[Message::user("Hi")]).await.unwrap();
    assert_eq!(completion.text, "spread out");
}
