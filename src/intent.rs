//! Keyword-based booking intent detection for chat messages.
//!
//! A heuristic with a fixed keyword list, not a parser.

use crate::models::{ChatMessage, ChatRole, Language};

pub const BOOKING_KEYWORDS: [&str; 6] = [
    "book",
    "appointment",
    "schedule",
    "marcar",
    "consulta",
    "agendar",
];

/// True if the text mentions any booking keyword.
pub fn wants_to_book(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BOOKING_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Classifies the most recent user message of a conversation.
pub fn last_user_wants_to_book(messages: &[ChatMessage]) -> bool {
    messages
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::User)
        .is_some_and(|m| wants_to_book(&m.content))
}

/// Reply that hands the conversation over to the booking form.
pub fn booking_prompt(language: Language) -> &'static str {
    match language {
        Language::Pt => {
            "Ótimo! Vou ajudá-lo a marcar uma consulta. Por favor, preencha o formulário abaixo."
        }
        Language::En => "Great! I'll help you book an appointment. Please fill out the form below.",
    }
}
