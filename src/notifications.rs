//! Guarded dispatch of lead emails.
//!
//! Sending never fails the caller: every problem is logged and reported as a
//! [`NotificationOutcome`] instead of an error.

use crate::circuit_breaker::{create_email_circuit_breaker, EmailCircuitBreaker};
use crate::email_client::{EmailClient, OutgoingEmail};
use crate::email_templates::{self, EmailSettings};
use crate::models::{Clinic, Lead};
use failsafe::futures::CircuitBreaker;
use std::sync::Arc;

/// Why a notification was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The lead has no email address to send to.
    MissingEmail,
    /// No email provider key was configured at start-up.
    NotConfigured,
}

/// Result of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent { message_id: Option<String> },
    Skipped(SkipReason),
    Failed(String),
}

impl NotificationOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent { .. })
    }
}

/// Which of the three lead emails is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    LeadNotification,
    BookingAcknowledgement,
    PatientConfirmation,
}

impl NotificationKind {
    fn label(&self) -> &'static str {
        match self {
            NotificationKind::LeadNotification => "lead notification",
            NotificationKind::BookingAcknowledgement => "booking acknowledgement",
            NotificationKind::PatientConfirmation => "patient confirmation",
        }
    }

    fn needs_patient_email(&self) -> bool {
        !matches!(self, NotificationKind::LeadNotification)
    }
}

/// Composes and sends lead emails through the configured provider.
#[derive(Clone)]
pub struct Notifier {
    client: Option<EmailClient>,
    settings: EmailSettings,
    clinic: Arc<Clinic>,
    breaker: EmailCircuitBreaker,
}

impl Notifier {
    /// `client` is `None` when no provider key is configured; sends then become no-ops.
    pub fn new(client: Option<EmailClient>, settings: EmailSettings, clinic: Arc<Clinic>) -> Self {
        Self {
            client,
            settings,
            clinic,
            breaker: create_email_circuit_breaker(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// New-lead email to the clinic inbox.
    pub async fn send_lead_notification(&self, lead: &Lead) -> NotificationOutcome {
        self.dispatch(NotificationKind::LeadNotification, lead).await
    }

    /// "Request received" email to the patient, clinic in copy.
    pub async fn send_booking_acknowledgement(&self, lead: &Lead) -> NotificationOutcome {
        self.dispatch(NotificationKind::BookingAcknowledgement, lead)
            .await
    }

    /// "Appointment scheduled" email to the patient, clinic in copy.
    pub async fn send_patient_confirmation(&self, lead: &Lead) -> NotificationOutcome {
        self.dispatch(NotificationKind::PatientConfirmation, lead)
            .await
    }

    fn compose(&self, kind: NotificationKind, lead: &Lead) -> OutgoingEmail {
        match kind {
            NotificationKind::LeadNotification => {
                email_templates::lead_notification(lead, &self.clinic, &self.settings)
            }
            NotificationKind::BookingAcknowledgement => {
                email_templates::booking_acknowledgement(lead, &self.clinic, &self.settings)
            }
            NotificationKind::PatientConfirmation => {
                email_templates::patient_confirmation(lead, &self.clinic, &self.settings)
            }
        }
    }

    async fn dispatch(&self, kind: NotificationKind, lead: &Lead) -> NotificationOutcome {
        if kind.needs_patient_email() && lead.email.trim().is_empty() {
            tracing::warn!(
                "Lead {} has no email address. Skipping {}.",
                lead.id,
                kind.label()
            );
            return NotificationOutcome::Skipped(SkipReason::MissingEmail);
        }

        let Some(ref client) = self.client else {
            tracing::info!(
                "Email service not configured. Skipping {} for lead {}.",
                kind.label(),
                lead.id
            );
            return NotificationOutcome::Skipped(SkipReason::NotConfigured);
        };

        let email = self.compose(kind, lead);

        match self.breaker.call(client.send(&email)).await {
            Ok(message_id) => {
                tracing::info!(
                    "✓ Sent {} for lead {} ({} recipient(s)), messageId: {:?}",
                    kind.label(),
                    lead.id,
                    email.to.len(),
                    message_id
                );
                NotificationOutcome::Sent { message_id }
            }
            Err(failsafe::Error::Inner(e)) => {
                tracing::error!("✗ Failed to send {} for lead {}: {}", kind.label(), lead.id, e);
                NotificationOutcome::Failed(e.to_string())
            }
            Err(failsafe::Error::Rejected) => {
                tracing::error!(
                    "✗ Email provider circuit open, {} for lead {} not sent",
                    kind.label(),
                    lead.id
                );
                NotificationOutcome::Failed("Email provider circuit open".to_string())
            }
        }
    }
}
