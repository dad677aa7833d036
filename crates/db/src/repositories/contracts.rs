use agenda_core::models::contract::{Contract, ContractStatus, ScheduleRule};
use chrono::NaiveDate;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{DbContract, DbScheduleRule};

pub async fn get_contract_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<DbContract>> {
    tracing::debug!("Getting contract by id: {}", id);

    let contract = sqlx::query_as::<_, DbContract>(
        r#"
        SELECT id, professional_id, patient_id, status, start_date, end_date,
               num_appointments, updated_at
        FROM contracts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(contract)
}

/// Same as [`get_contract_by_id`] but holds a row lock until the transaction ends.
pub async fn lock_contract<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<DbContract>> {
    let contract = sqlx::query_as::<_, DbContract>(
        r#"
        SELECT id, professional_id, patient_id, status, start_date, end_date,
               num_appointments, updated_at
        FROM contracts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(contract)
}

pub async fn get_schedule_rules<'e>(
    executor: impl PgExecutor<'e>,
    contract_id: Uuid,
) -> Result<Vec<DbScheduleRule>> {
    let rules = sqlx::query_as::<_, DbScheduleRule>(
        r#"
        SELECT contract_id, weekday, time_of_day
        FROM contract_schedule_rules
        WHERE contract_id = $1
        ORDER BY weekday, time_of_day
        "#,
    )
    .bind(contract_id)
    .fetch_all(executor)
    .await?;

    Ok(rules)
}

pub async fn upsert_contract<'e>(executor: impl PgExecutor<'e>, contract: &Contract) -> Result<DbContract> {
    tracing::debug!(
        "Saving contract: id={}, professional_id={}, status={}",
        contract.id,
        contract.professional_id,
        contract.status
    );

    let num_appointments = contract.num_appointments.map(i32::try_from).transpose()?;
    let saved = sqlx::query_as::<_, DbContract>(
        r#"
        INSERT INTO contracts (
            id, professional_id, patient_id, status, start_date, end_date,
            num_appointments, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        ON CONFLICT (id) DO UPDATE SET
            professional_id = EXCLUDED.professional_id,
            patient_id = EXCLUDED.patient_id,
            status = EXCLUDED.status,
            start_date = EXCLUDED.start_date,
            end_date = EXCLUDED.end_date,
            num_appointments = EXCLUDED.num_appointments,
            updated_at = NOW()
        RETURNING id, professional_id, patient_id, status, start_date, end_date,
                  num_appointments, updated_at
        "#,
    )
    .bind(contract.id)
    .bind(contract.professional_id)
    .bind(contract.patient_id)
    .bind(contract.status.as_str())
    .bind(contract.start_date)
    .bind(contract.end_date)
    .bind(num_appointments)
    .fetch_one(executor)
    .await?;

    Ok(saved)
}

pub async fn delete_schedule_rules<'e>(executor: impl PgExecutor<'e>, contract_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM contract_schedule_rules WHERE contract_id = $1")
        .bind(contract_id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn insert_schedule_rule<'e>(
    executor: impl PgExecutor<'e>,
    contract_id: Uuid,
    rule: &ScheduleRule,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO contract_schedule_rules (contract_id, weekday, time_of_day)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(contract_id)
    .bind(i16::from(rule.weekday))
    .bind(rule.time)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn set_status<'e>(
    executor: impl PgExecutor<'e>,
    contract_id: Uuid,
    status: ContractStatus,
) -> Result<()> {
    tracing::debug!("Setting contract {} status to {}", contract_id, status);

    sqlx::query("UPDATE contracts SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(contract_id)
        .bind(status.as_str())
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn set_end_date<'e>(
    executor: impl PgExecutor<'e>,
    contract_id: Uuid,
    end_date: NaiveDate,
) -> Result<()> {
    sqlx::query("UPDATE contracts SET end_date = $2, updated_at = NOW() WHERE id = $1")
        .bind(contract_id)
        .bind(end_date)
        .execute(executor)
        .await?;

    Ok(())
}
