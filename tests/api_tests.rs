/// HTTP-level tests
/// Drives the router in-process with the in-memory store and mocked providers
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use rust_clinic_api::api;
use rust_clinic_api::config::Config;
use rust_clinic_api::handlers::AppState;
use rust_clinic_api::lead_store::{LeadStore, MemoryLeadStore, LEAD_LIST_LIMIT};
use rust_clinic_api::llm_client::{LlmClient, LlmProvider};
use rust_clinic_api::models::{Language, LeadStatus, NewLead};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_PASSWORD: &str = "test_admin";

/// Helper function to create test config
fn create_test_config() -> Config {
    Config {
        database_url: None,
        port: 8080,
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        admin_session_ttl_secs: 3600,
        resend_api_key: None,
        resend_base_url: "https://api.resend.com".to_string(),
        clinic_email: "clinic@example.com".to_string(),
        email_from: "HealthCare Clinic <onboarding@resend.dev>".to_string(),
        openrouter_api_key: None,
        groq_api_key: None,
        site_url: "http://localhost:3000".to_string(),
    }
}

fn create_test_app() -> (Router, Arc<MemoryLeadStore>) {
    let store = Arc::new(MemoryLeadStore::new());
    let state = AppState::new(create_test_config(), store.clone());
    (api::routes().with_state(Arc::new(state)), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_token(app, method, uri, body, None).await
}

async fn send_with_token(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn seed_lead(minutes_ago: i64) -> rust_clinic_api::models::Lead {
    NewLead {
        name: "Ana Silva".to_string(),
        email: "ana@example.com".to_string(),
        phone: "+351912345678".to_string(),
        service: "General Consultation".to_string(),
        preferred_date: None,
        message: None,
        status: LeadStatus::New,
        language: Language::Pt,
    }
    .into_lead(Uuid::new_v4(), Utc::now() - Duration::minutes(minutes_ago))
}

fn admin_uri(path: &str) -> String {
    format!("{}?password={}", path, ADMIN_PASSWORD)
}

#[tokio::test]
async fn test_create_lead_success() {
    let (app, store) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads",
        Some(json!({
            "name": "Ana Silva",
            "email": "ana@example.com",
            "phone": "+351 912 345 678",
            "service": "Dental Cleaning",
            "language": "en"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Appointment received! We will contact you soon.");
    assert_eq!(store.len().await, 1);

    let id: Uuid = body["leadId"].as_str().unwrap().parse().unwrap();
    let lead = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(lead.phone, "+351912345678");
}

#[tokio::test]
async fn test_create_lead_defaults_to_portuguese() {
    let (app, _store) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads",
        Some(json!({
            "name": "Rui Costa",
            "email": "rui@example.pt",
            "phone": "912345678",
            "service": "General Consultation"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Marcação recebida! Entraremos em contacto em breve.");
}

#[tokio::test]
async fn test_create_lead_validation_errors() {
    let (app, store) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads",
        Some(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "912345678",
            "service": "Dental Cleaning"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide your full name (first and last name)");
    assert_eq!(body["field"], "name");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads",
        Some(json!({
            "name": "Ana Silva",
            "email": "ana@example.com",
            "phone": "12345",
            "service": "Dental Cleaning"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide a valid Portuguese phone number");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads",
        Some(json!({
            "name": "Ana Silva",
            "email": "not-an-email",
            "phone": "912345678",
            "service": "Dental Cleaning"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide a valid email address");

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_list_requires_admin() {
    let (app, store) = create_test_app();
    store.put(seed_lead(1)).await;

    let (status, body) = send(&app, Method::GET, "/api/leads", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));

    let (status, body) = send(&app, Method::GET, "/api/leads?password=wrong", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("leads").is_none());
}

#[tokio::test]
async fn test_list_newest_first_and_capped() {
    let (app, store) = create_test_app();
    for minutes_ago in 0..(LEAD_LIST_LIMIT as i64 + 10) {
        store.put(seed_lead(minutes_ago)).await;
    }

    let (status, body) = send(&app, Method::GET, &admin_uri("/api/leads"), None).await;
    assert_eq!(status, StatusCode::OK);

    let leads = body["leads"].as_array().unwrap();
    assert_eq!(leads.len(), LEAD_LIST_LIMIT);
    let created: Vec<&str> = leads
        .iter()
        .map(|l| l["createdAt"].as_str().unwrap())
        .collect();
    let mut sorted = created.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(created, sorted);
}

#[tokio::test]
async fn test_patch_status() {
    let (app, store) = create_test_app();
    let lead = seed_lead(5);
    store.put(lead.clone()).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &admin_uri("/api/leads"),
        Some(json!({"leadId": lead.id, "status": "scheduled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let updated = store.find_by_id(lead.id).await.unwrap().unwrap();
    assert_eq!(updated.status, LeadStatus::Scheduled);
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn test_patch_unknown_or_malformed() {
    let (app, _store) = create_test_app();

    let (status, _) = send(
        &app,
        Method::PATCH,
        &admin_uri("/api/leads"),
        Some(json!({"leadId": Uuid::new_v4(), "status": "contacted"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &admin_uri("/api/leads"),
        Some(json!({"leadId": "not-a-uuid", "status": "contacted"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &admin_uri("/api/leads"),
        Some(json!({"leadId": Uuid::new_v4(), "status": "archived"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_single_and_bulk() {
    let (app, store) = create_test_app();
    let leads: Vec<_> = (0..3).map(seed_lead).collect();
    for lead in &leads {
        store.put(lead.clone()).await;
    }

    let (status, body) = send(
        &app,
        Method::DELETE,
        &admin_uri("/api/leads"),
        Some(json!({"leadId": leads[0].id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "deleted": 1}));

    let bulk = json!({"leadIds": [leads[1].id, leads[2].id, "garbage"]});
    let (status, body) = send(&app, Method::DELETE, &admin_uri("/api/leads"), Some(bulk.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let (status, body) = send(&app, Method::DELETE, &admin_uri("/api/leads"), Some(bulk)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "deleted": 0}));
    assert!(store.is_empty().await);

    let (status, _) = send(&app, Method::DELETE, &admin_uri("/api/leads"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_session_flow() {
    let (app, store) = create_test_app();
    store.put(seed_lead(1)).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/session",
        Some(json!({"password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/session",
        Some(json!({"password": ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expiresIn"], 3600);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) =
        send_with_token(&app, Method::GET, "/api/leads", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["leads"].as_array().unwrap().len(), 1);

    let (status, _) =
        send_with_token(&app, Method::DELETE, "/api/admin/session", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        send_with_token(&app, Method::GET, "/api/leads", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_body_gets_error_envelope() {
    let (app, store) = create_test_app();

    let (status, body) = send_raw(
        &app,
        Method::POST,
        "/api/leads",
        Some("application/json"),
        "{not json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

    let (status, body) = send_raw(
        &app,
        Method::PATCH,
        &admin_uri("/api/leads"),
        Some("application/json"),
        "garbage",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_missing_content_type_gets_error_envelope() {
    let (app, store) = create_test_app();

    let booking = json!({
        "name": "Ana Silva",
        "email": "ana@example.com",
        "phone": "912345678",
        "service": "Dental Cleaning"
    })
    .to_string();

    let (status, body) = send_raw(&app, Method::POST, "/api/leads", None, &booking).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send_raw(&app, Method::POST, "/api/chat", Some("text/plain"), "hi").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_chat_unknown_language_falls_back_to_english() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Sure, which service?"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut state = AppState::new(create_test_config(), Arc::new(MemoryLeadStore::new()));
    state.llm = Some(LlmClient::new(
        LlmProvider {
            api_key: "test_key".to_string(),
            base_url: mock_server.uri(),
            model: "test-model".to_string(),
        },
        "http://localhost:3000".to_string(),
    ));
    let app = api::routes().with_state(Arc::new(state));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(json!({
            "messages": [{"role": "user", "content": "I want to book an appointment"}],
            "language": "fr"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sure, which service?");
    assert_eq!(
        body["bookingPrompt"],
        rust_clinic_api::intent::booking_prompt(Language::En)
    );
}

#[tokio::test]
async fn test_chat_requires_messages() {
    let (app, _store) = create_test_app();

    let (status, body) = send(&app, Method::POST, "/api/chat", Some(json!({"language": "en"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Messages array is required");
}

#[tokio::test]
async fn test_chat_without_provider_key() {
    let (app, _store) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(json!({"messages": [{"role": "user", "content": "Olá"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to get AI response");
}

#[tokio::test]
async fn test_chat_with_mocked_provider() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Claro! Que serviço deseja?"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut state = AppState::new(create_test_config(), Arc::new(MemoryLeadStore::new()));
    state.llm = Some(LlmClient::new(
        LlmProvider {
            api_key: "test_key".to_string(),
            base_url: mock_server.uri(),
            model: "test-model".to_string(),
        },
        "http://localhost:3000".to_string(),
    ));
    let app = api::routes().with_state(Arc::new(state));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(json!({
            "messages": [{"role": "user", "content": "Quero marcar uma consulta"}],
            "language": "pt"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Claro! Que serviço deseja?");
    assert_eq!(body["bookingIntent"], true);
    assert!(body["bookingPrompt"].as_str().is_some());
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_reference_data_endpoints() {
    let (app, _store) = create_test_app();

    let (status, clinic) = send(&app, Method::GET, "/api/clinic", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clinic["hours"]["sunday"], "Closed");

    let (status, body) = send(&app, Method::GET, "/api/faq", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["faqs"].as_array().unwrap().len(), 4);

    let (status, body) = send(&app, Method::GET, "/api/faq?q=onde%20fica%20a%20morada", None).await;
    assert_eq!(status, StatusCode::OK);
    let matched = body["faqs"].as_array().unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["question"], "Where are you located?");

    let (status, _) = send(&app, Method::GET, "/api/slots?date=19-10-2026", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Far-future Monday and Sunday
    let (status, body) = send(&app, Method::GET, "/api/slots?date=2099-06-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookable"], true);
    assert_eq!(body["slots"].as_array().unwrap().len(), 20);

    let (_, body) = send(&app, Method::GET, "/api/slots?date=2099-05-31", None).await;
    assert_eq!(body["bookable"], false);
    assert!(body["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (app, _store) = create_test_app();

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/leads"].is_object());
}
