//! End-to-end conversation scenarios against a mock completion API.

use std::time::Duration;

use barbershop_chat_core::{FragmentConfig, Sender};
use barbershop_chat_provider::{connect, ProviderConfig, ProviderKind};
use barbershop_chat_session::{ChatController, ChatEvent, ChatSettings, Notices};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIMARY_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
const FALLBACK_PATH: &str = "/v1beta/models/gemini-pro:generateContent";

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
}

fn fast_reveal() -> FragmentConfig {
    FragmentConfig {
        reveal_delay_ms: 10,
        ..FragmentConfig::default()
    }
}

fn chat(
    server: &MockServer,
    kind: ProviderKind,
    api_key: &str,
) -> (ChatController, mpsc::Receiver<ChatEvent>) {
    let config = ProviderConfig::new(kind).with_base_url(server.uri());
    let client = connect(&config, api_key).unwrap();
    let settings = ChatSettings::new(api_key, "You are Ana.").with_reveal(fast_reveal());
    ChatController::new(settings, client)
}

/// Feed events until the reply is fully shown.
async fn settle(chat: &mut ChatController, events: &mut mpsc::Receiver<ChatEvent>) {
    while chat.store().is_pending() || chat.is_revealing() {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("conversation did not settle")
            .expect("event channel closed");
        chat.handle_event(event);
    }
}

fn bot_texts(chat: &ChatController) -> Vec<String> {
    chat.store()
        .messages()
        .iter()
        .filter(|m| m.sender == Sender::Bot)
        .map(|m| m.text.clone())
        .collect()
}

#[tokio::test]
async fn happy_path_single_bubble() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply("**Plano Mensal**: R$49,90\n\nQuer saber mais?")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut chat, mut events) = chat(&server, ProviderKind::Gemini, "valid-key");
    chat.send("Quais os planos?").unwrap();
    settle(&mut chat, &mut events).await;

    assert_eq!(bot_texts(&chat), ["Plano Mensal: R$49,90\n\nQuer saber mais?"]);
    assert!(!chat.store().is_pending());
    assert_eq!(chat.store().typing_after(), None);
}

#[tokio::test]
async fn missing_credential_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("nunca")))
        .expect(0)
        .mount(&server)
        .await;

    let (mut chat, _events) = chat(&server, ProviderKind::Gemini, "");
    chat.send("Olá").unwrap();

    assert_eq!(bot_texts(&chat), [Notices::default().missing_credential]);
    assert!(!chat.store().is_pending());
}

#[tokio::test]
async fn unauthorized_skips_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FALLBACK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("nunca")))
        .expect(0)
        .mount(&server)
        .await;

    let (mut chat, mut events) = chat(&server, ProviderKind::Gemini, "bad-key");
    chat.send("Quais os planos?").unwrap();
    settle(&mut chat, &mut events).await;

    assert_eq!(bot_texts(&chat), [Notices::default().invalid_credential]);
    assert!(!chat.store().is_pending());
}

#[tokio::test]
async fn server_error_then_fallback_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FALLBACK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Resposta do fallback.")))
        .expect(1)
        .mount(&server)
        .await;

    let (mut chat, mut events) = chat(&server, ProviderKind::Gemini, "valid-key");
    chat.send("Quais os planos?").unwrap();
    settle(&mut chat, &mut events).await;

    assert_eq!(bot_texts(&chat), ["Resposta do fallback."]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn both_attempts_failing_shows_generic_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let (mut chat, mut events) = chat(&server, ProviderKind::Gemini, "valid-key");
    chat.send("Oi").unwrap();
    settle(&mut chat, &mut events).await;

    assert_eq!(bot_texts(&chat), [Notices::default().generic]);
}

#[tokio::test]
async fn clear_while_pending_discards_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply("Tarde demais."))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut chat, mut events) = chat(&server, ProviderKind::Gemini, "valid-key");
    chat.send("Quais os planos?").unwrap();
    assert!(chat.store().is_pending());

    chat.clear();
    assert!(!chat.store().is_pending());

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(!chat.handle_event(event));
    assert!(chat.store().messages().is_empty());
}

#[tokio::test]
async fn groq_stream_is_revealed_in_bubbles() {
    let sentences: Vec<String> = (0..4)
        .map(|i| format!("Frase {i} {}.", "x".repeat(150)))
        .collect();

    let mut body = String::new();
    for sentence in &sentences {
        let delta = json!({"choices": [{"delta": {"content": format!("{sentence} ")}}]});
        body.push_str(&format!("data: {delta}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut chat, mut events) = chat(&server, ProviderKind::Groq, "valid-key");
    chat.send("Conte tudo").unwrap();
    settle(&mut chat, &mut events).await;

    // Four packed fragments regroup into three bubbles.
    let texts = bot_texts(&chat);
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0], sentences[0]);
    assert_eq!(texts[1], sentences[1]);
    assert_eq!(texts[2], format!("{} {}", sentences[2], sentences[3]));
    assert!(chat.store().messages().iter().all(|m| m.is_complete));
}
