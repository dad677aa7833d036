use agenda_core::models::reminder::PatientContact;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::DbPatientContact;

pub async fn get_contact<'e>(executor: impl PgExecutor<'e>, patient_id: Uuid) -> Result<Option<DbPatientContact>> {
    let contact = sqlx::query_as::<_, DbPatientContact>(
        "SELECT patient_id, phone, updated_at FROM patient_contacts WHERE patient_id = $1",
    )
    .bind(patient_id)
    .fetch_optional(executor)
    .await?;

    Ok(contact)
}

pub async fn upsert_contact<'e>(executor: impl PgExecutor<'e>, contact: &PatientContact) -> Result<()> {
    tracing::debug!("Saving contact for patient {}", contact.patient_id);

    sqlx::query(
        r#"
        INSERT INTO patient_contacts (patient_id, phone, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (patient_id) DO UPDATE SET phone = EXCLUDED.phone, updated_at = NOW()
        "#,
    )
    .bind(contact.patient_id)
    .bind(&contact.phone)
    .execute(executor)
    .await?;

    Ok(())
}
