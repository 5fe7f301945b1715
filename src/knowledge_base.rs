//! Static clinic knowledge used by the chat assistant and the public site.

use crate::models::{Clinic, ClinicContact, ClinicHours, ClinicService, Language};
use serde::Serialize;
use utoipa::ToSchema;

/// Medical safety rules embedded in every system prompt.
pub const SAFETY_RULES: [&str; 6] = [
    "Never provide medical diagnoses or treatment recommendations",
    "Always recommend consulting a doctor for any medical symptoms or concerns",
    "Redirect urgent or emergency cases to call emergency services (112 in Portugal)",
    "Only provide factual information about clinic services, hours, and pricing",
    "Focus on collecting appointment details, not giving medical advice",
    "Be empathetic but clear about limitations",
];

fn service(name: &str, price: &str, duration: &str, description: &str) -> ClinicService {
    ClinicService {
        name: name.to_string(),
        price: price.to_string(),
        duration: duration.to_string(),
        description: Some(description.to_string()),
    }
}

/// The demo clinic record served to the UI and embedded in prompts.
pub fn clinic_data() -> Clinic {
    Clinic {
        name: "HealthCare Clinic".to_string(),
        services: vec![
            service(
                "General Consultation",
                "€50",
                "30 min",
                "Routine check-up and general health assessment",
            ),
            service(
                "Dental Cleaning",
                "€60",
                "45 min",
                "Professional cleaning and oral hygiene review",
            ),
            service(
                "Physiotherapy Session",
                "€45",
                "60 min",
                "Rehabilitation and pain management session",
            ),
            service(
                "Nutrition Consultation",
                "€40",
                "45 min",
                "Personalised dietary plan and follow-up",
            ),
            service(
                "Dermatology Consultation",
                "€70",
                "30 min",
                "Skin, hair and nail assessment",
            ),
        ],
        hours: ClinicHours {
            monday: "09:00 - 19:00".to_string(),
            tuesday: "09:00 - 19:00".to_string(),
            wednesday: "09:00 - 19:00".to_string(),
            thursday: "09:00 - 19:00".to_string(),
            friday: "09:00 - 19:00".to_string(),
            saturday: "09:00 - 13:00".to_string(),
            sunday: "Closed".to_string(),
        },
        contact: ClinicContact {
            phone: "+351 912 345 678".to_string(),
            email: "contact@healthcareclinic.pt".to_string(),
            address: "Rua da Saúde 123, 1000-001 Lisboa, Portugal".to_string(),
        },
    }
}

fn services_text(clinic: &Clinic) -> String {
    clinic
        .services
        .iter()
        .map(|s| format!("- {}: {} ({})", s.name, s.price, s.duration))
        .collect::<Vec<_>>()
        .join("\n")
}

fn hours_text(clinic: &Clinic) -> String {
    clinic
        .hours
        .entries()
        .iter()
        .map(|(day, hours)| format!("{}: {}", day, hours))
        .collect::<Vec<_>>()
        .join("\n")
}

fn safety_rules_text() -> String {
    SAFETY_RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}", i + 1, rule))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the system instruction for the language model.
///
/// Deterministic: the same clinic and language always yield the same text.
pub fn system_prompt(clinic: &Clinic, language: Language) -> String {
    let services = services_text(clinic);
    let hours = hours_text(clinic);
    let rules = safety_rules_text();
    let contact = &clinic.contact;

    match language {
        Language::Pt => format!(
            r#"Você é um assistente virtual amigável para {name}, uma clínica médica.

PERSONALIDADE:
- Seja caloroso, simpático e conversacional
- Responda a saudações (olá, oi, bom dia) de forma amigável
- Agradeça quando receberem "obrigado" ou "thank you"
- Use um tom profissional mas acessível
- Seja natural e humano nas conversas

REGRAS DE SEGURANÇA (CRÍTICAS):
{rules}

INFORMAÇÕES DA CLÍNICA:

Serviços Disponíveis:
{services}

Horário de Funcionamento:
{hours}

Contacto:
Telefone: {phone}
Email: {email}
Morada: {address}

OBJETIVO:
Ajudar pacientes a:
1. Conhecer os serviços e preços
2. Entender o horário de funcionamento
3. Marcar consultas (recolher: nome, telefone, serviço desejado, data preferencial)

EXEMPLOS DE INTERAÇÃO:
- User: "Olá" → Você: "Olá! Bem-vindo à {name}! Como posso ajudá-lo hoje?"
- User: "Hi" → Você: "Hello! Welcome to {name}! How can I help you today?"
- User: "Obrigado" → Você: "De nada! Estou aqui para ajudar. Precisa de mais alguma coisa?"
- User: "Thank you" → Você: "You're welcome! Is there anything else I can help you with?"

Se perguntarem sobre sintomas ou diagnósticos, seja empático mas redirecione para agendar uma consulta com um médico.
Seja cordial, profissional e eficiente. Responda sempre em português (mas entenda inglês também)."#,
            name = clinic.name,
            rules = rules,
            services = services,
            hours = hours,
            phone = contact.phone,
            email = contact.email,
            address = contact.address,
        ),
        Language::En => format!(
            r#"You are a friendly virtual assistant for {name}, a medical clinic.

PERSONALITY:
- Be warm, friendly, and conversational
- Respond to greetings (hi, hello, good morning) warmly
- Thank users when they say "thank you" or "obrigado"
- Use a professional yet approachable tone
- Be natural and human in conversations

SAFETY RULES (CRITICAL):
{rules}

CLINIC INFORMATION:

Available Services:
{services}

Opening Hours:
{hours}

Contact:
Phone: {phone}
Email: {email}
Address: {address}

OBJECTIVE:
Help patients to:
1. Learn about services and pricing
2. Understand opening hours
3. Book appointments (collect: name, phone, desired service, preferred date)

INTERACTION EXAMPLES:
- User: "Hi" → You: "Hello! Welcome to {name}! How can I help you today?"
- User: "Olá" → You: "Hi! Welcome to {name}! How may I assist you?"
- User: "Thank you" → You: "You're welcome! I'm here to help. Is there anything else you need?"
- User: "Obrigado" → You: "My pleasure! Anything else I can help you with?"

If asked about symptoms or diagnoses, be empathetic but redirect to schedule an appointment with a doctor.
Be friendly, professional, and efficient. Always respond in English (but understand Portuguese too)."#,
            name = clinic.name,
            rules = rules,
            services = services,
            hours = hours,
            phone = contact.phone,
            email = contact.email,
            address = contact.address,
        ),
    }
}

/// A canned question/answer pair with the keywords that select it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Faq {
    pub question: String,
    pub answer: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FaqListResponse {
    pub faqs: Vec<Faq>,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Frequently asked questions built from the clinic record.
pub fn faqs(clinic: &Clinic) -> Vec<Faq> {
    let hours = clinic
        .hours
        .entries()
        .iter()
        .map(|(day, hours)| format!("{}: {}", capitalize(day), hours))
        .collect::<Vec<_>>()
        .join("\n");
    let services = clinic
        .services
        .iter()
        .map(|s| format!("- {}: {}", s.name, s.price))
        .collect::<Vec<_>>()
        .join("\n");

    vec![
        Faq {
            question: "What are your opening hours?".to_string(),
            answer: format!("Our opening hours are:\n{}", hours),
            keywords: keywords(&["hours", "schedule", "open", "horário", "horarios", "aberto"]),
        },
        Faq {
            question: "How do I book an appointment?".to_string(),
            answer: "You can book an appointment by providing your name, phone number, and preferred service. I'll help you find an available time slot!".to_string(),
            keywords: keywords(&["book", "appointment", "schedule", "marcar", "consulta", "agendar"]),
        },
        Faq {
            question: "What services do you offer?".to_string(),
            answer: format!("We offer the following services:\n{}", services),
            keywords: keywords(&["services", "treatment", "serviços", "tratamento", "especialidades"]),
        },
        Faq {
            question: "Where are you located?".to_string(),
            answer: format!(
                "We're located at {}. You can reach us at {}.",
                clinic.contact.address, clinic.contact.phone
            ),
            keywords: keywords(&["location", "address", "where", "localização", "morada", "onde"]),
        },
    ]
}

/// First FAQ whose keyword appears in `text` (case-insensitive).
pub fn match_faq(clinic: &Clinic, text: &str) -> Option<Faq> {
    let lowered = text.to_lowercase();
    faqs(clinic)
        .into_iter()
        .find(|faq| faq.keywords.iter().any(|k| lowered.contains(k.as_str())))
}
