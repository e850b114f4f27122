//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use finpro_core::ai::{AIClient, MockBackend, MockReply};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn no_auth() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        ..Default::default()
    }
}

fn setup_test_app() -> Router {
    create_router(None, no_auth())
}

/// App backed by a mock model; the mock is returned to inspect its calls
fn setup_ai_app() -> (Router, MockBackend) {
    let mock = MockBackend::new();
    let service = InsightService::with_defaults(AIClient::Mock(mock.clone()));
    (create_router(Some(service), no_auth()), mock)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

fn three_transactions() -> serde_json::Value {
    serde_json::json!([
        {"date": "2024-01-01", "amount": 5000, "type": "INCOME", "category": "Vendas", "description": "Cliente A"},
        {"date": "2024-01-05", "amount": -1500, "category": "Aluguel", "description": "Escritório"},
        {"date": "2024-01-10", "amount": -300, "type": "EXPENSE", "category": "Serviços", "description": "Internet"}
    ])
}

// ========== Auth Tests ==========

#[tokio::test]
async fn test_auth_required_by_default() {
    let config = ServerConfig {
        api_keys: vec!["k-123".to_string()],
        ..Default::default()
    };
    let app = create_router(None, config);

    let response = send(&app, "GET", "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("authorization", "Bearer k-124")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let ok = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("authorization", "Bearer k-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["alpha".to_string(), "beta-key".to_string()];
    assert!(validate_api_key("alpha", &keys));
    assert!(validate_api_key("beta-key", &keys));
    assert!(!validate_api_key("alph", &keys));
    assert!(!validate_api_key("", &keys));
    assert!(!validate_api_key("alpha", &[]));
}

#[test]
fn test_parse_list() {
    assert_eq!(parse_list(" a, ,b ,"), vec!["a", "b"]);
    assert!(parse_list("").is_empty());
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();
    let response = send(&app, "GET", "/api/health", None).await;
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

// ========== Health ==========

#[tokio::test]
async fn test_health_without_ai() {
    let app = setup_test_app();
    let response = send(&app, "GET", "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["ai"].is_null());
    assert_eq!(json["ai_available"], false);
}

#[tokio::test]
async fn test_health_with_mock_ai() {
    let (app, _) = setup_ai_app();
    let json = get_body_json(send(&app, "GET", "/api/health", None).await).await;
    assert_eq!(json["ai"]["backend"], "mock");
    assert_eq!(json["ai_available"], true);
}

// ========== Transactions ==========

#[tokio::test]
async fn test_add_list_delete_transactions() {
    let app = setup_test_app();

    let response = send(&app, "POST", "/api/transactions", Some(three_transactions())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let added = get_body_json(response).await;
    assert_eq!(added.as_array().unwrap().len(), 3);
    assert_eq!(added[1]["type"], "EXPENSE");

    // A single object is accepted too
    let one = serde_json::json!({"date": "2024-01-12", "amount": 80, "category": "Vendas", "description": "Extra"});
    let response = send(&app, "POST", "/api/transactions", Some(one)).await;
    assert_eq!(get_body_json(response).await[0]["id"], 4);

    let response = send(&app, "DELETE", "/api/transactions/2", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let list = get_body_json(send(&app, "GET", "/api/transactions", None).await).await;
    let ids: Vec<u64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);

    let response = send(&app, "DELETE", "/api/transactions/2", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let cleared = get_body_json(send(&app, "DELETE", "/api/transactions", None).await).await;
    assert_eq!(cleared["removed"], 3);
}

#[tokio::test]
async fn test_add_transaction_rejects_missing_date() {
    let app = setup_test_app();
    let body = serde_json::json!({"amount": 10});
    let response = send(&app, "POST", "/api/transactions", Some(body)).await;
    assert!(response.status().is_client_error());
}

// ========== Summary ==========

#[tokio::test]
async fn test_summary() {
    let app = setup_test_app();
    send(&app, "POST", "/api/transactions", Some(three_transactions())).await;

    let response = send(&app, "GET", "/api/summary?period=all", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["income"], 5000.0);
    assert_eq!(json["expenses"], 1800.0);
    assert_eq!(json["balance"], 3200.0);
    assert_eq!(json["by_category"][0]["category"], "Aluguel");

    let response = send(&app, "GET", "/api/summary?period=decade", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== AI endpoints ==========

#[tokio::test]
async fn test_insights_without_ai_fall_back() {
    let app = setup_test_app();
    send(&app, "POST", "/api/transactions", Some(three_transactions())).await;

    let response = send(&app, "GET", "/api/insights", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["outcome"], "unavailable");
    assert!(!json["text"].as_str().unwrap().is_empty());

    let response = send(&app, "GET", "/api/forecast", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_insights_empty_session_makes_no_call() {
    let (app, mock) = setup_ai_app();
    let json = get_body_json(send(&app, "GET", "/api/insights", None).await).await;
    assert_eq!(json["outcome"], "no_input");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_insights_generated() {
    let (app, mock) = setup_ai_app();
    mock.push_reply(MockReply::text("Corte gastos com serviços."));
    send(&app, "POST", "/api/transactions", Some(three_transactions())).await;

    let json = get_body_json(send(&app, "GET", "/api/insights?period=all", None).await).await;
    assert_eq!(json["outcome"], "generated");
    assert_eq!(json["text"], "Corte gastos com serviços.");
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_forecast_threshold_and_result() {
    let (app, mock) = setup_ai_app();
    let two = serde_json::json!([
        {"date": "2024-01-01", "amount": 5000},
        {"date": "2024-01-05", "amount": -1500}
    ]);
    send(&app, "POST", "/api/transactions", Some(two)).await;

    let response = send(&app, "GET", "/api/forecast", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(mock.call_count(), 0);

    mock.push_reply(MockReply::text(
        r#"{"predictedBalance":6200,"riskLevel":"LOW","explanation":"stable trend"}"#,
    ));
    let third = serde_json::json!({"date": "2024-01-10", "amount": -300});
    send(&app, "POST", "/api/transactions", Some(third)).await;

    let response = send(&app, "GET", "/api/forecast", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["predictedBalance"], 6200.0);
    assert_eq!(json["riskLevel"], "LOW");
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_analyze_receipt() {
    let (app, mock) = setup_ai_app();

    let body = serde_json::json!({"image": "data:image/jpeg;base64,QUJDRA=="});
    let response = send(&app, "POST", "/api/receipts/analyze", Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["description"], "Recibo simulado");
    assert_eq!(json["categorySuggestion"], "Outros");

    let body = serde_json::json!({"image": "not base64!"});
    let response = send(&app, "POST", "/api/receipts/analyze", Some(body)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(mock.call_count(), 1);

    let body = serde_json::json!({"image": "  "});
    let response = send(&app, "POST", "/api/receipts/analyze", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_advisor() {
    let (app, mock) = setup_ai_app();
    send(&app, "POST", "/api/transactions", Some(three_transactions())).await;

    let blank = serde_json::json!({"question": "   "});
    let json = get_body_json(send(&app, "POST", "/api/advisor", Some(blank)).await).await;
    assert_eq!(json["outcome"], "no_input");
    assert_eq!(mock.call_count(), 0);

    let question = serde_json::json!({"question": "Posso contratar alguém?"});
    let json = get_body_json(send(&app, "POST", "/api/advisor", Some(question)).await).await;
    assert_eq!(json["outcome"], "generated");

    let requests = mock.requests();
    assert!(requests[0].text_prompt().contains("Posso contratar alguém?"));
}
