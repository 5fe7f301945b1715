//! Rust Clinic API Library
//!
//! This library provides the core functionality for the clinic backend:
//! public booking submissions that become leads, admin lead management,
//! an AI chat assistant and transactional email notifications.
//!
//! # Modules
//!
//! - `api`: Route table and OpenAPI document.
//! - `auth`: Admin password check and session tokens.
//! - `circuit_breaker`: Circuit breaker guarding the email provider.
//! - `config`: Configuration management.
//! - `db`: Database connection pool and migrations.
//! - `email_client`: Transactional email provider client.
//! - `email_templates`: Bilingual email compositions.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `intent`: Booking intent detection for chat messages.
//! - `knowledge_base`: Clinic record, system prompt and FAQ.
//! - `lead_store`: Lead persistence (PostgreSQL and in-memory).
//! - `lifecycle`: Lead creation, status changes and deletion.
//! - `llm_client`: Chat completion client (OpenRouter or Groq).
//! - `models`: Core data models.
//! - `notifications`: Guarded dispatch of lead emails.
//! - `validation`: Booking input validation and slot calculation.

pub mod api;
pub mod auth;
pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod email_client;
pub mod email_templates;
pub mod errors;
pub mod handlers;
pub mod intent;
pub mod knowledge_base;
pub mod lead_store;
pub mod lifecycle;
pub mod llm_client;
pub mod models;
pub mod notifications;
pub mod validation;
