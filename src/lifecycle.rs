//! Lead lifecycle: creation from a public submission, admin status changes
//! and deletion, with the notifications each step triggers.

use crate::errors::{AppError, ResultExt};
use crate::lead_store::LeadStore;
use crate::models::{CreateLeadRequest, Lead, LeadStatus, NewLead};
use crate::notifications::{NotificationOutcome, Notifier};
use crate::validation::{
    format_phone_number, validate_email, validate_name, validate_portuguese_phone,
};
use std::sync::Arc;
use uuid::Uuid;

pub const NAME_MESSAGE: &str = "Please provide your full name (first and last name)";
pub const PHONE_MESSAGE: &str = "Please provide a valid Portuguese phone number";
pub const EMAIL_MESSAGE: &str = "Please provide a valid email address";
pub const SERVICE_MESSAGE: &str = "Please select a service";

/// Outcome of a successful creation.
#[derive(Debug, Clone)]
pub struct CreatedLead {
    pub lead: Lead,
    pub notification: NotificationOutcome,
    pub acknowledgement: NotificationOutcome,
}

/// Outcome of a successful status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: LeadStatus,
    pub lead: Lead,
    /// `None` when the transition does not call for a confirmation.
    pub confirmation: Option<NotificationOutcome>,
}

/// The patient is told about a scheduled appointment only on entering `scheduled`.
pub fn should_send_confirmation(previous: LeadStatus, next: LeadStatus) -> bool {
    next == LeadStatus::Scheduled && previous != LeadStatus::Scheduled
}

/// Checks a submission and turns it into a normalized [`NewLead`].
///
/// Fields are checked in the order name, phone, email, service and the first
/// failure is returned.
pub fn validate_submission(request: CreateLeadRequest) -> Result<NewLead, AppError> {
    let name = request.name.unwrap_or_default();
    if !validate_name(&name) {
        return Err(AppError::validation("name", NAME_MESSAGE));
    }

    let phone = request.phone.unwrap_or_default();
    if !validate_portuguese_phone(&phone) {
        return Err(AppError::validation("phone", PHONE_MESSAGE));
    }

    let email = request.email.unwrap_or_default();
    let email = email.trim();
    if !validate_email(email) {
        return Err(AppError::validation("email", EMAIL_MESSAGE));
    }

    let service = request.service.unwrap_or_default();
    let service = service.trim();
    if service.is_empty() {
        return Err(AppError::validation("service", SERVICE_MESSAGE));
    }

    Ok(NewLead {
        name: name.trim().to_string(),
        email: email.to_string(),
        phone: format_phone_number(&phone),
        service: service.to_string(),
        preferred_date: non_blank(request.preferred_date),
        message: non_blank(request.message),
        status: LeadStatus::New,
        language: request.language.unwrap_or_default(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct LeadWorkflow {
    store: Arc<dyn LeadStore>,
    notifier: Notifier,
}

impl LeadWorkflow {
    pub fn new(store: Arc<dyn LeadStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<dyn LeadStore> {
        &self.store
    }

    /// Validates, persists and announces a new lead.
    ///
    /// Nothing is stored when validation fails. Email problems never fail the
    /// creation; they come back in the returned outcomes.
    pub async fn create_lead(&self, request: CreateLeadRequest) -> Result<CreatedLead, AppError> {
        let new_lead = validate_submission(request)?;

        let lead = self
            .store
            .insert(new_lead)
            .await
            .context("Failed to create appointment")?;
        tracing::info!("✓ Lead {} created for service '{}'", lead.id, lead.service);

        let notification = self.notifier.send_lead_notification(&lead).await;
        let acknowledgement = self.notifier.send_booking_acknowledgement(&lead).await;

        Ok(CreatedLead {
            lead,
            notification,
            acknowledgement,
        })
    }

    /// Moves a lead to `status`, sending the patient confirmation when it
    /// enters `scheduled`.
    pub async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<StatusChange, AppError> {
        let existing = self
            .store
            .find_by_id(id)
            .await
            .context("Failed to update lead")?
            .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;
        let previous = existing.status;

        let lead = self
            .store
            .update_status(id, status)
            .await
            .context("Failed to update lead")?;
        tracing::info!("Lead {} status: {} → {}", id, previous, status);

        let confirmation = if should_send_confirmation(previous, status) {
            Some(self.notifier.send_patient_confirmation(&lead).await)
        } else {
            None
        };

        Ok(StatusChange {
            previous,
            lead,
            confirmation,
        })
    }

    pub async fn delete_lead(&self, id: Uuid) -> Result<u64, AppError> {
        let deleted = self
            .store
            .delete(id)
            .await
            .context("Failed to delete lead")?;
        tracing::info!("Deleted lead {} ({} removed)", id, deleted);
        Ok(deleted)
    }

    /// Removes every listed lead. Ids that no longer exist are ignored.
    pub async fn delete_leads(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let deleted = self
            .store
            .delete_many(ids)
            .await
            .context("Failed to delete leads")?;
        tracing::info!("Bulk delete: {} of {} lead(s) removed", deleted, ids.len());
        Ok(deleted)
    }
}
