use std::env;
use uuid::Uuid;

use rust_clinic_api::db::Database;
use rust_clinic_api::lead_store::{LeadStore, PgLeadStore};
use rust_clinic_api::models::{Language, LeadStatus, NewLead};

/// Integration smoke test for the PostgreSQL lead store.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn lead_store_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::connect_lazy(&db_url)?;
    db.migrate().await?;
    let store = PgLeadStore::new(db.pool.clone());

    // Unique name so repeated runs can be told apart.
    let name = format!("Smoke Test{}", Uuid::new_v4().simple());
    let lead = store
        .insert(NewLead {
            name: name.clone(),
            email: "smoke@example.com".to_string(),
            phone: "+351912345678".to_string(),
            service: "General Consultation".to_string(),
            preferred_date: None,
            message: Some("created by storage_integration".to_string()),
            status: LeadStatus::New,
            language: Language::En,
        })
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    assert_eq!(lead.name, name);
    assert!(lead.updated_at.is_none());

    let listed = store.list().await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(listed.iter().any(|l| l.id == lead.id));

    let updated = store
        .update_status(lead.id, LeadStatus::Scheduled)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(updated.status, LeadStatus::Scheduled);
    assert!(updated.updated_at.is_some());

    let deleted = store
        .delete_many(&[lead.id, Uuid::new_v4()])
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(deleted, 1);

    let gone = store
        .find_by_id(lead.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(gone.is_none());
    Ok(())
}
