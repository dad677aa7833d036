use agenda_core::models::appointment::Appointment;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::DbAppointment;

const COLUMNS: &str = "id, professional_id, patient_id, contract_id, appointment_date, start_time, \
                       end_time, status, notes, created_at, updated_at";

/// Serializes overlap checks and writes for one professional's day until the
/// surrounding transaction ends.
pub async fn lock_day<'e>(
    executor: impl PgExecutor<'e>,
    professional_id: Uuid,
    date: NaiveDate,
) -> Result<()> {
    let key = format!("{professional_id}:{date}");
    tracing::debug!("Taking agenda lock {}", key);

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn get_appointment_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    tracing::debug!("Getting appointment by id: {}", id);

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(appointment)
}

/// Same as [`get_appointment_by_id`] but holds a row lock until the transaction ends.
pub async fn lock_appointment<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(appointment)
}

pub async fn list_between<'e>(
    executor: impl PgExecutor<'e>,
    professional_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DbAppointment>> {
    tracing::debug!(
        "Listing appointments: professional_id={}, from={}, to={}",
        professional_id,
        from,
        to
    );

    let rows = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE professional_id = $1 AND appointment_date BETWEEN $2 AND $3
        ORDER BY appointment_date, start_time, created_at
        "#
    ))
    .bind(professional_id)
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn list_on<'e>(
    executor: impl PgExecutor<'e>,
    date: NaiveDate,
    professional_id: Option<Uuid>,
) -> Result<Vec<DbAppointment>> {
    let rows = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE appointment_date = $1 AND ($2::uuid IS NULL OR professional_id = $2)
        ORDER BY start_time, created_at
        "#
    ))
    .bind(date)
    .bind(professional_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Id of an occupying appointment overlapping `[start, end)`, ignoring `exclude`.
pub async fn find_overlap<'e>(
    executor: impl PgExecutor<'e>,
    professional_id: Uuid,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    exclude: Option<Uuid>,
) -> Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM appointments
        WHERE professional_id = $1
          AND appointment_date = $2
          AND status NOT IN ('CANCELLED', 'SERIES_ENDED')
          AND start_time < $4
          AND end_time > $3
          AND ($5::uuid IS NULL OR id <> $5)
        LIMIT 1
        "#,
    )
    .bind(professional_id)
    .bind(date)
    .bind(start)
    .bind(end)
    .bind(exclude)
    .fetch_optional(executor)
    .await?;

    Ok(id)
}

pub async fn insert_appointment<'e>(
    executor: impl PgExecutor<'e>,
    appointment: &Appointment,
) -> Result<DbAppointment> {
    tracing::debug!(
        "Creating appointment: id={}, professional_id={}, date={}, start={}, status={}",
        appointment.id,
        appointment.professional_id,
        appointment.date,
        appointment.start,
        appointment.status
    );

    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (
            id, professional_id, patient_id, contract_id, appointment_date,
            start_time, end_time, status, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(appointment.id)
    .bind(appointment.professional_id)
    .bind(appointment.patient_id)
    .bind(appointment.contract_id)
    .bind(appointment.date)
    .bind(appointment.start)
    .bind(appointment.end)
    .bind(appointment.status.as_str())
    .bind(&appointment.notes)
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn update_appointment<'e>(
    executor: impl PgExecutor<'e>,
    appointment: &Appointment,
    now: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    tracing::debug!(
        "Updating appointment: id={}, date={}, start={}, status={}",
        appointment.id,
        appointment.date,
        appointment.start,
        appointment.status
    );

    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET appointment_date = $2, start_time = $3, end_time = $4, status = $5,
            notes = $6, updated_at = $7
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(appointment.id)
    .bind(appointment.date)
    .bind(appointment.start)
    .bind(appointment.end)
    .bind(appointment.status.as_str())
    .bind(&appointment.notes)
    .bind(now)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// PRE_SCHEDULED → SCHEDULED for every appointment of the contract.
pub async fn promote_pre_scheduled<'e>(
    executor: impl PgExecutor<'e>,
    contract_id: Uuid,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET status = 'SCHEDULED', updated_at = $2
        WHERE contract_id = $1 AND status = 'PRE_SCHEDULED'
        "#,
    )
    .bind(contract_id)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Moves non-terminal appointments dated after `end_date` to SERIES_ENDED.
pub async fn end_series_after<'e>(
    executor: impl PgExecutor<'e>,
    contract_id: Uuid,
    end_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        WITH ended AS (
            UPDATE appointments
            SET status = 'SERIES_ENDED', updated_at = $3
            WHERE contract_id = $1
              AND appointment_date > $2
              AND status IN ('PRE_SCHEDULED', 'SCHEDULED', 'CONFIRMED')
            RETURNING id, appointment_date, start_time
        )
        SELECT id FROM ended ORDER BY appointment_date, start_time
        "#,
    )
    .bind(contract_id)
    .bind(end_date)
    .bind(now)
    .fetch_all(executor)
    .await?;

    Ok(ids)
}
