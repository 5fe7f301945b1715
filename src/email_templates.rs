//! HTML compositions for the three lead emails.
//!
//! Every lead field is HTML-escaped before interpolation.

use crate::email_client::OutgoingEmail;
use crate::models::{Clinic, Language, Lead};

/// Sender identity and the clinic inbox that receives copies.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub from: String,
    pub clinic_email: String,
}

const ACCENT: &str = "#00a0a0";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_created_at(lead: &Lead) -> String {
    match lead.language {
        Language::Pt => lead.created_at.format("%d/%m/%Y, %H:%M:%S UTC").to_string(),
        Language::En => lead.created_at.format("%m/%d/%Y, %I:%M:%S %p UTC").to_string(),
    }
}

fn optional_row(label: &str, value: Option<&str>, style: &str) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => format!(
            r#"<p{}><strong>{}:</strong> {}</p>"#,
            style,
            label,
            escape_html(v)
        ),
        None => String::new(),
    }
}

fn wrap(body: &str) -> String {
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9f9f9; border-radius: 10px;">
{}
    </div>
  </body>
</html>"#,
        body
    )
}

fn help_box(clinic: &Clinic, language: Language) -> String {
    let (title, phone_label) = match language {
        Language::Pt => ("Precisa de Ajuda?", "Telefone"),
        Language::En => ("Need Help?", "Phone"),
    };
    let phone = escape_html(&clinic.contact.phone);
    let tel: String = clinic
        .contact
        .phone
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let email = escape_html(&clinic.contact.email);
    format!(
        r#"      <div style="margin-top: 30px; padding: 20px; background-color: #f9fafb; border-radius: 8px; text-align: center;">
        <p style="margin: 0 0 10px 0; font-weight: bold; color: {accent};">{title}</p>
        <p style="margin: 5px 0;"><strong>{phone_label}:</strong> <a href="tel:{tel}" style="color: {accent}; text-decoration: none;">{phone}</a></p>
        <p style="margin: 5px 0;"><strong>Email:</strong> <a href="mailto:{email}" style="color: {accent}; text-decoration: none;">{email}</a></p>
      </div>"#,
        accent = ACCENT,
        title = title,
        phone_label = phone_label,
        tel = escape_html(&tel),
        phone = phone,
        email = email,
    )
}

fn tagline(clinic: &Clinic, language: Language) -> String {
    let motto = match language {
        Language::Pt => "Cuidar da sua saúde é a nossa prioridade",
        Language::En => "Your health is our priority",
    };
    format!(
        r#"    <p style="text-align: center; margin-top: 20px; font-size: 12px; color: #666;">{} - {}</p>"#,
        escape_html(&clinic.name),
        motto
    )
}

/// Email to the clinic inbox announcing a new lead.
pub fn lead_notification(lead: &Lead, clinic: &Clinic, settings: &EmailSettings) -> OutgoingEmail {
    let name = escape_html(&lead.name);
    let email = escape_html(&lead.email);
    let phone = escape_html(&lead.phone);
    let service = escape_html(&lead.service);
    let clinic_name = escape_html(&clinic.name);

    let (subject, heading, labels, footer) = match lead.language {
        Language::Pt => (
            format!("Nova marcação: {} - {}", lead.name, lead.service),
            "Nova Marcação de Consulta",
            ["Nome", "Telefone", "Serviço", "Data Preferencial", "Mensagem", "Data de Criação"],
            format!(
                "Este email foi enviado automaticamente pelo sistema de chatbot da {}.",
                clinic_name
            ),
        ),
        Language::En => (
            format!("New Appointment: {} - {}", lead.name, lead.service),
            "New Appointment Booking",
            ["Name", "Phone", "Service", "Preferred Date", "Message", "Created"],
            format!(
                "This email was sent automatically by {}'s chatbot system.",
                clinic_name
            ),
        ),
    };

    let body = format!(
        r#"      <h2 style="color: {accent};">{heading}</h2>
      <div style="background-color: white; padding: 20px; border-radius: 8px; margin-top: 20px;">
        <p><strong>{l_name}:</strong> {name}</p>
        <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
        <p><strong>{l_phone}:</strong> <a href="tel:{phone}">{phone}</a></p>
        <p><strong>{l_service}:</strong> {service}</p>
        {preferred}
        {message}
        <p><strong>Status:</strong> {status}</p>
        <p><strong>{l_created}:</strong> {created}</p>
      </div>
      <p style="margin-top: 20px; font-size: 12px; color: #666;">{footer}</p>"#,
        accent = ACCENT,
        heading = heading,
        l_name = labels[0],
        name = name,
        email = email,
        l_phone = labels[1],
        phone = phone,
        l_service = labels[2],
        service = service,
        preferred = optional_row(labels[3], lead.preferred_date.as_deref(), ""),
        message = optional_row(labels[4], lead.message.as_deref(), ""),
        status = lead.status,
        l_created = labels[5],
        created = format_created_at(lead),
        footer = footer,
    );

    OutgoingEmail {
        from: settings.from.clone(),
        to: vec![settings.clinic_email.clone()],
        subject,
        html: wrap(&body),
        reply_to: None,
    }
}

struct PatientCopy {
    subject: String,
    banner: &'static str,
    greeting: &'static str,
    intro: &'static str,
    summary_title: &'static str,
    service_label: &'static str,
    date_label: &'static str,
    status_label: &'static str,
    status_text: &'static str,
    status_color: &'static str,
    closing: &'static str,
}

fn patient_email(
    lead: &Lead,
    clinic: &Clinic,
    settings: &EmailSettings,
    copy: PatientCopy,
) -> OutgoingEmail {
    let row_style = r#" style="margin: 10px 0;""#;
    let body = format!(
        r#"      <div style="background-color: {accent}; padding: 20px; border-radius: 8px 8px 0 0; text-align: center;">
        <h2 style="color: white; margin: 0;">{banner}</h2>
      </div>
      <div style="background-color: white; padding: 30px; border-radius: 0 0 8px 8px;">
        <p style="font-size: 16px;">{greeting} <strong>{name}</strong>,</p>
        <p>{intro}</p>
        <div style="background-color: #f0f9ff; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid {accent};">
          <h3 style="margin-top: 0; color: {accent};">{summary_title}</h3>
          <p style="margin: 10px 0;"><strong>{service_label}:</strong> {service}</p>
          {date}
          <p style="margin: 10px 0;"><strong>{status_label}:</strong> <span style="color: {status_color}; font-weight: bold;">{status_text}</span></p>
        </div>
        <p>{closing}</p>
{help}
      </div>
{tagline}"#,
        accent = ACCENT,
        banner = copy.banner,
        greeting = copy.greeting,
        name = escape_html(&lead.name),
        intro = copy.intro,
        summary_title = copy.summary_title,
        service_label = copy.service_label,
        service = escape_html(&lead.service),
        date = optional_row(copy.date_label, lead.preferred_date.as_deref(), row_style),
        status_label = copy.status_label,
        status_color = copy.status_color,
        status_text = copy.status_text,
        closing = copy.closing,
        help = help_box(clinic, lead.language),
        tagline = tagline(clinic, lead.language),
    );

    OutgoingEmail {
        from: settings.from.clone(),
        // Patient plus the clinic inbox as backup
        to: vec![lead.email.clone(), settings.clinic_email.clone()],
        subject: copy.subject,
        html: wrap(&body),
        reply_to: Some(settings.clinic_email.clone()),
    }
}

/// Email to the patient acknowledging a request that still awaits confirmation.
pub fn booking_acknowledgement(
    lead: &Lead,
    clinic: &Clinic,
    settings: &EmailSettings,
) -> OutgoingEmail {
    let copy = match lead.language {
        Language::Pt => PatientCopy {
            subject: format!("📝 Pedido de Consulta Recebido - {}", clinic.name),
            banner: "📝 Pedido Recebido",
            greeting: "Olá",
            intro: "Obrigado por solicitar uma consulta connosco! Recebemos o seu pedido e entraremos em contacto em breve para confirmar os detalhes.",
            summary_title: "Resumo da Solicitação:",
            service_label: "Serviço",
            date_label: "Data Preferencial",
            status_label: "Status",
            status_text: "Aguarda confirmação",
            status_color: "#f59e0b",
            closing: "Se tiver alguma dúvida ou precisar de alterar alguma informação, responda a este email ou contacte-nos diretamente.",
        },
        Language::En => PatientCopy {
            subject: format!("📝 Appointment Request Received - {}", clinic.name),
            banner: "📝 Request Received",
            greeting: "Hi",
            intro: "Thanks for requesting an appointment! We received your request and will reach out shortly to confirm the details.",
            summary_title: "Request Summary:",
            service_label: "Service",
            date_label: "Preferred Date",
            status_label: "Status",
            status_text: "Awaiting confirmation",
            status_color: "#f59e0b",
            closing: "If you have any questions or need to update your info, just reply to this email or reach out to us directly.",
        },
    };
    patient_email(lead, clinic, settings, copy)
}

/// Email to the patient confirming the appointment is scheduled.
pub fn patient_confirmation(lead: &Lead, clinic: &Clinic, settings: &EmailSettings) -> OutgoingEmail {
    let copy = match lead.language {
        Language::Pt => PatientCopy {
            subject: format!("✅ Consulta Agendada - {}", clinic.name),
            banner: "✅ Consulta Agendada!",
            greeting: "Olá",
            intro: "Temos o prazer de confirmar que a sua consulta foi agendada com sucesso!",
            summary_title: "Detalhes da Consulta:",
            service_label: "Serviço",
            date_label: "Data",
            status_label: "Estado",
            status_text: "Agendada",
            status_color: "#16a34a",
            closing: "Aguardamos ansiosamente pela sua visita. Se precisar de reagendar ou tiver alguma questão, não hesite em contactar-nos.",
        },
        Language::En => PatientCopy {
            subject: format!("✅ Appointment Scheduled - {}", clinic.name),
            banner: "✅ Appointment Scheduled!",
            greeting: "Hello",
            intro: "We're pleased to confirm that your appointment has been successfully scheduled!",
            summary_title: "Appointment Details:",
            service_label: "Service",
            date_label: "Date",
            status_label: "Status",
            status_text: "Scheduled",
            status_color: "#16a34a",
            closing: "We look forward to seeing you. If you need to reschedule or have any questions, please don't hesitate to contact us.",
        },
    };
    patient_email(lead, clinic, settings, copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::clinic_data;
    use crate::models::{LeadStatus, NewLead};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn settings() -> EmailSettings {
        EmailSettings {
            from: "HealthCare Clinic <onboarding@resend.dev>".into(),
            clinic_email: "clinic@example.com".into(),
        }
    }

    fn lead(language: Language) -> Lead {
        NewLead {
            name: "Ana <b>Silva</b>".into(),
            email: "ana@example.com".into(),
            phone: "+351912345678".into(),
            service: "Dental Cleaning".into(),
            preferred_date: Some("2026-11-02".into()),
            message: None,
            status: LeadStatus::New,
            language,
        }
        .into_lead(
            Uuid::new_v4(),
            Utc.with_ymd_and_hms(2026, 10, 19, 14, 3, 22).unwrap(),
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">O'Neil & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#39;Neil &amp; co&lt;/a&gt;"
        );
    }

    #[test]
    fn test_lead_notification_goes_to_clinic_only() {
        let email = lead_notification(&lead(Language::Pt), &clinic_data(), &settings());
        assert_eq!(email.to, vec!["clinic@example.com".to_string()]);
        assert_eq!(email.subject, "Nova marcação: Ana <b>Silva</b> - Dental Cleaning");
        assert!(email.html.contains("Ana &lt;b&gt;Silva&lt;/b&gt;"));
        assert!(!email.html.contains("<b>Silva</b>"));
        assert!(email.html.contains("<strong>Data Preferencial:</strong> 2026-11-02"));
        assert!(!email.html.contains("Mensagem"));
        assert!(email.html.contains("<strong>Status:</strong> new"));
        assert!(email.html.contains("19/10/2026, 14:03:22"));
        assert!(email.reply_to.is_none());
    }

    #[test]
    fn test_lead_notification_english_date_format() {
        let email = lead_notification(&lead(Language::En), &clinic_data(), &settings());
        assert!(email.subject.starts_with("New Appointment: "));
        assert!(email.html.contains("10/19/2026, 02:03:22 PM"));
    }

    #[test]
    fn test_patient_emails_copy_clinic_and_reply_to_clinic() {
        let lead = lead(Language::En);
        for email in [
            booking_acknowledgement(&lead, &clinic_data(), &settings()),
            patient_confirmation(&lead, &clinic_data(), &settings()),
        ] {
            assert_eq!(
                email.to,
                vec!["ana@example.com".to_string(), "clinic@example.com".to_string()]
            );
            assert_eq!(email.reply_to.as_deref(), Some("clinic@example.com"));
            assert!(email.html.contains("tel:+351912345678"));
        }
    }

    #[test]
    fn test_acknowledgement_vs_confirmation_wording() {
        let lead = lead(Language::Pt);
        let ack = booking_acknowledgement(&lead, &clinic_data(), &settings());
        assert_eq!(ack.subject, "📝 Pedido de Consulta Recebido - HealthCare Clinic");
        assert!(ack.html.contains("Aguarda confirmação"));

        let confirmation = patient_confirmation(&lead, &clinic_data(), &settings());
        assert_eq!(confirmation.subject, "✅ Consulta Agendada - HealthCare Clinic");
        assert!(confirmation.html.contains("Agendada"));
        assert!(confirmation.html.contains("<strong>Data:</strong> 2026-11-02"));
    }
}
