use crate::auth::{AdminAuth, AdminGate};
use crate::config::Config;
use crate::email_client::EmailClient;
use crate::email_templates::EmailSettings;
use crate::errors::{AppError, ResultExt};
use crate::intent::{booking_prompt, last_user_wants_to_book};
use crate::knowledge_base::{clinic_data, faqs, match_faq, system_prompt, FaqListResponse};
use crate::lead_store::LeadStore;
use crate::lifecycle::LeadWorkflow;
use crate::llm_client::{LlmClient, LlmProvider};
use crate::models::*;
use crate::notifications::Notifier;
use crate::validation::{available_slots, is_valid_booking_date};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead creation, status changes and deletion.
    pub workflow: LeadWorkflow,
    /// Chat completion client. `None` when no provider key is configured.
    pub llm: Option<LlmClient>,
    /// Static clinic record shared with the prompt builder and email templates.
    pub clinic: Arc<Clinic>,
    /// Admin password check and session tokens.
    pub admin: AdminGate,
}

impl AppState {
    /// Wires every service from `config` on top of the given lead store.
    pub fn new(config: Config, store: Arc<dyn LeadStore>) -> Self {
        let clinic = Arc::new(clinic_data());

        let email_client = match config.resend_api_key {
            Some(ref key) => {
                tracing::info!("✓ Email client initialized: {}", config.resend_base_url);
                Some(EmailClient::new(config.resend_base_url.clone(), key.clone()))
            }
            None => None,
        };
        let settings = EmailSettings {
            from: config.email_from.clone(),
            clinic_email: config.clinic_email.clone(),
        };
        let notifier = Notifier::new(email_client, settings, clinic.clone());

        let llm = match LlmProvider::from_keys(
            config.openrouter_api_key.as_deref(),
            config.groq_api_key.as_deref(),
        ) {
            Ok(provider) => {
                let client = LlmClient::new(provider, config.site_url.clone());
                tracing::info!("✓ LLM client initialized (model {})", client.model());
                Some(client)
            }
            Err(e) => {
                tracing::debug!("Chat disabled: {}", e);
                None
            }
        };

        let admin = AdminGate::new(
            config.admin_password.as_deref(),
            Duration::from_secs(config.admin_session_ttl_secs),
        );

        Self {
            workflow: LeadWorkflow::new(store, notifier),
            llm,
            clinic,
            admin,
            config,
        }
    }
}

/// Health check endpoint.
///
/// Returns a simple JSON response indicating the service is healthy.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-clinic-api",
            "version": env!("CARGO_PKG_VERSION"),
            "storage": if state.config.database_url.is_some() { "postgres" } else { "memory" },
            "chat": state.llm.is_some(),
        })),
    )
}

fn parse_lead_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound("Lead not found".to_string()))
}

// ============ Chat ============

/// POST /api/chat
///
/// Prepends the clinic system prompt to the conversation and returns the
/// model's reply, flagging whether the latest user message asks to book.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Missing or malformed messages"),
        (status = 500, description = "Language model unavailable")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload?;
    let request: ChatRequest = serde_json::from_value(payload)
        .map_err(|_| AppError::BadRequest("Messages array is required".to_string()))?;

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| AppError::ConfigError("No LLM provider key configured".to_string()))
        .context("Failed to get AI response")?;

    let mut conversation = Vec::with_capacity(request.messages.len() + 1);
    conversation.push(ChatMessage::system(system_prompt(
        &state.clinic,
        request.language,
    )));
    conversation.extend(request.messages.iter().cloned());

    let message = llm
        .chat_completion(&conversation)
        .await
        .context("Failed to get AI response")?;

    let booking_intent = last_user_wants_to_book(&request.messages);

    Ok(Json(ChatResponse {
        message,
        timestamp: Utc::now(),
        booking_intent,
        booking_prompt: booking_intent.then(|| booking_prompt(request.language).to_string()),
    }))
}

// ============ Leads ============

/// POST /api/leads
///
/// Public booking submission.
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 200, description = "Lead created", body = CreateLeadResponse),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Lead could not be stored")
    ),
    tag = "leads"
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<CreateLeadResponse>, AppError> {
    let Json(payload) = payload?;
    let request: CreateLeadRequest = serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;

    let created = state.workflow.create_lead(request).await?;

    let message = match created.lead.language {
        Language::Pt => "Marcação recebida! Entraremos em contacto em breve.",
        Language::En => "Appointment received! We will contact you soon.",
    };

    Ok(Json(CreateLeadResponse {
        success: true,
        lead_id: created.lead.id,
        message: message.to_string(),
    }))
}

/// GET /api/leads
///
/// Newest leads first, at most one hundred.
#[utoipa::path(
    get,
    path = "/api/leads",
    params(("password" = Option<String>, Query, description = "Admin password, when no bearer token is sent")),
    responses(
        (status = 200, description = "Leads, newest first", body = LeadListResponse),
        (status = 401, description = "Missing or wrong admin credentials")
    ),
    tag = "leads"
)]
pub async fn list_leads(
    _admin: AdminAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LeadListResponse>, AppError> {
    let leads = state
        .workflow
        .store()
        .list()
        .await
        .context("Failed to fetch leads")?;

    tracing::debug!("Listing {} lead(s)", leads.len());
    Ok(Json(LeadListResponse { leads }))
}

/// PATCH /api/leads
///
/// Changes a lead's status. Entering `scheduled` emails the patient.
#[utoipa::path(
    patch,
    path = "/api/leads",
    request_body = UpdateLeadStatusRequest,
    params(("password" = Option<String>, Query, description = "Admin password, when no bearer token is sent")),
    responses(
        (status = 200, description = "Status updated", body = SuccessResponse),
        (status = 400, description = "Malformed body or unknown status"),
        (status = 401, description = "Missing or wrong admin credentials"),
        (status = 404, description = "No such lead")
    ),
    tag = "leads"
)]
pub async fn update_lead_status(
    _admin: AdminAuth,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;
    let request: UpdateLeadStatusRequest = serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;
    let id = parse_lead_id(&request.lead_id)?;

    state.workflow.update_status(id, request.status).await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/leads
///
/// Removes one lead (`leadId`) or several (`leadIds`). Unknown or malformed
/// ids are skipped.
#[utoipa::path(
    delete,
    path = "/api/leads",
    request_body = DeleteLeadsRequest,
    params(("password" = Option<String>, Query, description = "Admin password, when no bearer token is sent")),
    responses(
        (status = 200, description = "Leads removed", body = DeleteLeadsResponse),
        (status = 400, description = "Neither leadId nor leadIds given"),
        (status = 401, description = "Missing or wrong admin credentials")
    ),
    tag = "leads"
)]
pub async fn delete_leads(
    _admin: AdminAuth,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<DeleteLeadsResponse>, AppError> {
    let Json(payload) = payload?;
    let request: DeleteLeadsRequest = serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;

    let deleted = match (request.lead_id, request.lead_ids) {
        (_, Some(ids)) => {
            let ids: Vec<Uuid> = ids
                .iter()
                .filter_map(|raw| Uuid::parse_str(raw.trim()).ok())
                .collect();
            state.workflow.delete_leads(&ids).await?
        }
        (Some(raw), None) => match Uuid::parse_str(raw.trim()) {
            Ok(id) => state.workflow.delete_lead(id).await?,
            Err(_) => 0,
        },
        (None, None) => {
            return Err(AppError::BadRequest(
                "leadId or leadIds is required".to_string(),
            ))
        }
    };

    Ok(Json(DeleteLeadsResponse {
        success: true,
        deleted,
    }))
}

// ============ Admin session ============

/// POST /api/admin/session
#[utoipa::path(
    post,
    path = "/api/admin/session",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Session issued", body = AdminSessionResponse),
        (status = 401, description = "Wrong password")
    ),
    tag = "admin"
)]
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<AdminSessionResponse>, AppError> {
    let Json(payload) = payload?;
    let request: AdminLoginRequest = serde_json::from_value(payload)
        .map_err(|_| AppError::Unauthorized("Malformed login body".to_string()))?;

    let session = state.admin.login(&request.password).await?;

    Ok(Json(AdminSessionResponse {
        token: session.token,
        expires_in: session.expires_in,
    }))
}

/// DELETE /api/admin/session
///
/// Revokes the bearer token the request was made with.
#[utoipa::path(
    delete,
    path = "/api/admin/session",
    responses(
        (status = 200, description = "Session revoked", body = SuccessResponse),
        (status = 401, description = "No valid session token")
    ),
    tag = "admin"
)]
pub async fn admin_logout(
    admin: AdminAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, AppError> {
    let token = admin
        .token
        .ok_or_else(|| AppError::Unauthorized("Logout requires a session token".to_string()))?;

    state.admin.logout(&token).await;
    tracing::info!("Admin session revoked");

    Ok(Json(SuccessResponse { success: true }))
}

// ============ Clinic reference data ============

/// GET /api/clinic
#[utoipa::path(
    get,
    path = "/api/clinic",
    responses((status = 200, description = "Clinic record", body = Clinic)),
    tag = "clinic"
)]
pub async fn get_clinic(State(state): State<Arc<AppState>>) -> Json<Clinic> {
    Json(state.clinic.as_ref().clone())
}

#[derive(Debug, Deserialize)]
pub struct FaqQuery {
    pub q: Option<String>,
}

/// GET /api/faq
///
/// All FAQ entries, or with `?q=` only the first one whose keywords match.
#[utoipa::path(
    get,
    path = "/api/faq",
    params(("q" = Option<String>, Query, description = "Free text to match against FAQ keywords")),
    responses((status = 200, description = "Frequently asked questions", body = FaqListResponse)),
    tag = "clinic"
)]
pub async fn get_faqs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FaqQuery>,
) -> Json<FaqListResponse> {
    let faqs = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(text) => match_faq(&state.clinic, text).into_iter().collect(),
        None => faqs(&state.clinic),
    };
    Json(FaqListResponse { faqs })
}

/// GET /api/slots?date=YYYY-MM-DD
///
/// Bookable half-hour start times for a date. Past dates and Sundays have none.
#[utoipa::path(
    get,
    path = "/api/slots",
    params(("date" = String, Query, description = "Date as YYYY-MM-DD")),
    responses(
        (status = 200, description = "Slots for the date", body = SlotsResponse),
        (status = 400, description = "Missing or malformed date")
    ),
    tag = "clinic"
)]
pub async fn get_slots(Query(query): Query<SlotsQuery>) -> Result<Json<SlotsResponse>, AppError> {
    let raw = query
        .date
        .ok_or_else(|| AppError::BadRequest("date query parameter is required".to_string()))?;
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))?;

    let bookable = is_valid_booking_date(date, Utc::now().date_naive());
    let slots = if bookable {
        available_slots(date)
    } else {
        Vec::new()
    };

    Ok(Json(SlotsResponse {
        date,
        bookable,
        slots,
    }))
}
