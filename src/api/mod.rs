//! HTTP surface: route table and OpenAPI document.

use crate::handlers::{self, AppState};
use crate::knowledge_base::{Faq, FaqListResponse};
use crate::models::*;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rust Clinic API",
        description = "Lead capture, admin lead management and AI chat for a health clinic"
    ),
    paths(
        handlers::chat,
        handlers::create_lead,
        handlers::list_leads,
        handlers::update_lead_status,
        handlers::delete_leads,
        handlers::admin_login,
        handlers::admin_logout,
        handlers::get_clinic,
        handlers::get_faqs,
        handlers::get_slots,
    ),
    components(schemas(
        Lead,
        LeadStatus,
        Language,
        CreateLeadRequest,
        CreateLeadResponse,
        LeadListResponse,
        UpdateLeadStatusRequest,
        DeleteLeadsRequest,
        DeleteLeadsResponse,
        SuccessResponse,
        AdminLoginRequest,
        AdminSessionResponse,
        ChatRole,
        ChatMessage,
        ChatRequest,
        ChatResponse,
        Clinic,
        ClinicService,
        ClinicHours,
        ClinicContact,
        Faq,
        FaqListResponse,
        SlotsResponse,
    )),
    tags(
        (name = "chat", description = "AI assistant"),
        (name = "leads", description = "Booking requests"),
        (name = "admin", description = "Admin sessions"),
        (name = "clinic", description = "Clinic reference data")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document as JSON.
async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page pointing at `/api-docs/openapi.json`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Rust Clinic API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Application routes, without rate limiting or the health check.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // API Documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
        // Public endpoints
        .route("/api/chat", post(handlers::chat))
        .route("/api/clinic", get(handlers::get_clinic))
        .route("/api/faq", get(handlers::get_faqs))
        .route("/api/slots", get(handlers::get_slots))
        // Leads: POST is public, the rest require admin credentials
        .route(
            "/api/leads",
            post(handlers::create_lead)
                .get(handlers::list_leads)
                .patch(handlers::update_lead_status)
                .delete(handlers::delete_leads),
        )
        .route(
            "/api/admin/session",
            post(handlers::admin_login).delete(handlers::admin_logout),
        )
}
