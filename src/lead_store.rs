use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, LeadRow, LeadStatus, NewLead};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Maximum number of leads returned by [`LeadStore::list`].
pub const LEAD_LIST_LIMIT: usize = 100;

/// Persistence for lead records.
///
/// Single-record writes are atomic as far as the backing store makes them;
/// concurrent status updates are last-write-wins.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persists a new lead, assigning its id and creation timestamp.
    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError>;

    /// Leads ordered newest first, capped at [`LEAD_LIST_LIMIT`].
    async fn list(&self) -> Result<Vec<Lead>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError>;

    /// Sets the status and `updated_at`. Fails with `NotFound` for unknown ids.
    async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<Lead, AppError>;

    /// Removes one lead, returning how many records were deleted (0 or 1).
    async fn delete(&self, id: Uuid) -> Result<u64, AppError>;

    /// Removes every matching lead. Unknown ids are ignored.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError>;
}

fn lead_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Lead {} not found", id))
}

// ============ PostgreSQL ============

/// Lead storage backed by the `leads` table.
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_lead(row: LeadRow) -> Result<Lead, AppError> {
    let id = row.id;
    Lead::try_from(row)
        .map_err(|e| AppError::InternalError(format!("Corrupt lead row {}: {}", id, e)))
}

const LEAD_COLUMNS: &str = "id, name, email, phone, service, preferred_date, message, status, language, created_at, updated_at";

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "INSERT INTO leads (id, name, email, phone, service, preferred_date, message, status, language, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            LEAD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.service)
        .bind(&lead.preferred_date)
        .bind(&lead.message)
        .bind(lead.status.as_str())
        .bind(lead.language.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert lead")?;

        let lead = row_to_lead(row)?;
        tracing::debug!("Inserted lead {}", lead.id);
        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads ORDER BY created_at DESC LIMIT $1",
            LEAD_COLUMNS
        ))
        .bind(LEAD_LIST_LIMIT as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list leads")?;

        rows.into_iter().map(row_to_lead).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE id = $1",
            LEAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load lead {}", id))?;

        row.map(row_to_lead).transpose()
    }

    async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<Lead, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "UPDATE leads SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            LEAD_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to update lead {}", id))?
        .ok_or_else(|| lead_not_found(id))?;

        row_to_lead(row)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete lead {}", id))?;

        Ok(result.rows_affected())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .context("Failed to delete leads")?;

        Ok(result.rows_affected())
    }
}

// ============ In-memory ============

/// Process-local lead storage. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryLeadStore {
    leads: RwLock<HashMap<Uuid, Lead>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.leads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.leads.read().await.is_empty()
    }

    /// Stores a fully formed lead as-is, keeping its id and timestamps.
    pub async fn put(&self, lead: Lead) {
        self.leads.write().await.insert(lead.id, lead);
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError> {
        let lead = lead.into_lead(Uuid::new_v4(), Utc::now());
        self.leads.write().await.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let mut leads: Vec<Lead> = self.leads.read().await.values().cloned().collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        leads.truncate(LEAD_LIST_LIMIT);
        Ok(leads)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self.leads.read().await.get(&id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<Lead, AppError> {
        let mut leads = self.leads.write().await;
        let lead = leads.get_mut(&id).ok_or_else(|| lead_not_found(id))?;
        lead.status = status;
        lead.updated_at = Some(Utc::now());
        Ok(lead.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        Ok(self.leads.write().await.remove(&id).map_or(0, |_| 1))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut leads = self.leads.write().await;
        Ok(ids.iter().filter(|id| leads.remove(*id).is_some()).count() as u64)
    }
}
