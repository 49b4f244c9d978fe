use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router};
use orderdesk_core::{AnswerGenerator, OrderSearch};
use orderdesk_server::gemini::{GeminiConfig, GeminiGenerator};
use orderdesk_server::select_generator;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_fake(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base_url: String, timeout: Duration) -> GeminiConfig {
    GeminiConfig { base_url, timeout, ..GeminiConfig::new("test-key") }
}

async fn answering(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    let answer = if prompt.contains("Order ID: ORD-1002") { "Your MacBook is being prepared." } else { "Unknown order." };
    (StatusCode::OK, Json(json!({ "candidates": [{ "content": { "parts": [{ "text": answer }] } }] })))
}

#[tokio::test]
async fn returns_candidate_text() {
    let base = spawn_fake(Router::new().fallback(answering)).await;
    let generator = GeminiGenerator::new(config(base, Duration::from_secs(5))).unwrap();
    let result = OrderSearch::demo().query("ord 1002", 3, &generator).await;
    assert_eq!(result.answer.as_deref(), Some("Your MacBook is being prepared."));
}

#[tokio::test]
async fn server_error_degrades_to_none() {
    let base = spawn_fake(Router::new().fallback(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") })).await;
    let generator = GeminiGenerator::new(config(base, Duration::from_secs(5))).unwrap();
    assert_eq!(generator.generate("Order ID: ORD-1002", "where").await, None);
}

#[tokio::test]
async fn empty_candidates_degrade_to_none() {
    let base = spawn_fake(Router::new().fallback(|| async { Json(json!({ "candidates": [] })) })).await;
    let generator = GeminiGenerator::new(config(base, Duration::from_secs(5))).unwrap();
    assert_eq!(generator.generate("Order ID: ORD-1002", "where").await, None);
}

#[tokio::test]
async fn timeout_degrades_to_none() {
    let slow = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Json(json!({ "candidates": [{ "content": { "parts": [{ "text": "late" }] } }] }))
    });
    let base = spawn_fake(slow).await;
    let generator = GeminiGenerator::new(config(base, Duration::from_millis(200))).unwrap();
    assert_eq!(generator.generate("Order ID: ORD-1002", "where").await, None);
}

#[tokio::test]
async fn unreachable_host_degrades_to_none() {
    let generator = GeminiGenerator::new(config("http://127.0.0.1:1".into(), Duration::from_secs(2))).unwrap();
    let result = OrderSearch::demo().query("ORD-1001", 3, &generator).await;
    assert_eq!(result.best_match.unwrap().order.order_id, "ORD-1001");
    assert!(result.answer.is_none());
}

#[tokio::test]
async fn missing_credential_selects_unconfigured() {
    let generator = select_generator(None);
    assert_eq!(generator.id(), "unconfigured");
    assert_eq!(select_generator(Some(GeminiConfig::new("k"))).id(), "gemini");
}
