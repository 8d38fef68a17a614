use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use campaign_core::config::InsightsConfig;
use campaign_core::inputs::CampaignInputs;
use campaign_insights::{
    summarize, DisabledSummaries, GeminiClient, SummaryProvider, EMPTY_SUMMARY_TEXT,
    FAILED_SUMMARY_TEXT,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct SeenRequest {
    model: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn generate_content(
    State(stub): State<Stub>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.seen.lock().await.push(SeenRequest {
        model,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });
    (stub.status, Json(stub.reply.clone()))
}

/// Serve a canned `generateContent` reply on a random local port.
async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1beta/models/:model", post(generate_content))
        .with_state(Stub {
            status,
            reply,
            seen: seen.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1beta"), seen)
}

fn config(base_url: String) -> InsightsConfig {
    InsightsConfig {
        base_url,
        api_key: "test-key".into(),
        ..InsightsConfig::default()
    }
}

fn inputs() -> CampaignInputs {
    let mut inputs = CampaignInputs::defaults_on(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
    inputs.total_budget = Some(12_000.0);
    inputs.target_reach = Some(80_000.0);
    inputs.customer_name = "Blink".into();
    inputs.set_selection(vec!["TikTok".into()]);
    inputs
}

#[tokio::test]
async fn test_summary_round_trip() {
    let reply = json!({
        "candidates": [{"content": {"parts": [{"text": "Focus spend on TikTok."}]}}]
    });
    let (base_url, seen) = spawn_stub(StatusCode::OK, reply).await;
    let client = GeminiClient::new(config(base_url));

    let text = summarize(&client, &inputs()).await;
    assert_eq!(text, "Focus spend on TikTok.");

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].model, "gemini-3-flash-preview:generateContent");
    assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));
    let prompt = seen[0].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Customer: Blink"));
    assert!(prompt.contains("TikTok (Always include: false"));
    let temperature = seen[0].body["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_empty_reply_uses_placeholder() {
    let (base_url, _) = spawn_stub(StatusCode::OK, json!({"candidates": []})).await;
    let client = GeminiClient::new(config(base_url));
    assert_eq!(summarize(&client, &inputs()).await, EMPTY_SUMMARY_TEXT);
}

#[tokio::test]
async fn test_service_error_falls_back() {
    let (base_url, seen) = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": {"message": "boom"}}),
    )
    .await;
    let client = GeminiClient::new(config(base_url));
    assert_eq!(summarize(&client, &inputs()).await, FAILED_SUMMARY_TEXT);
    // No retry.
    assert_eq!(seen.lock().await.len(), 1);
}

#[tokio::test]
async fn test_missing_key_skips_network() {
    let (base_url, seen) = spawn_stub(StatusCode::OK, json!({})).await;
    let client = GeminiClient::new(InsightsConfig {
        api_key: String::new(),
        ..config(base_url)
    });
    assert!(client.generate("anything").await.is_err());
    assert!(seen.lock().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_service_falls_back() {
    // Port 1 on loopback refuses connections.
    let client = GeminiClient::new(config("http://127.0.0.1:1/v1beta".into()));
    assert_eq!(summarize(&client, &inputs()).await, FAILED_SUMMARY_TEXT);
}

#[tokio::test]
async fn test_disabled_provider_falls_back() {
    assert_eq!(summarize(&DisabledSummaries, &inputs()).await, FAILED_SUMMARY_TEXT);
}
