use agenda_core::models::token::RescheduleToken;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;

use crate::models::DbRescheduleToken;

pub async fn insert_token<'e>(executor: impl PgExecutor<'e>, token: &RescheduleToken) -> Result<()> {
    tracing::debug!(
        "Storing reschedule token for appointment {} (expires {})",
        token.appointment_id,
        token.expires_at
    );

    sqlx::query(
        r#"
        INSERT INTO reschedule_tokens (token, appointment_id, issued_at, expires_at, consumed_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&token.token)
    .bind(token.appointment_id)
    .bind(token.issued_at)
    .bind(token.expires_at)
    .bind(token.consumed_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_token<'e>(executor: impl PgExecutor<'e>, token: &str) -> Result<Option<DbRescheduleToken>> {
    let row = sqlx::query_as::<_, DbRescheduleToken>(
        r#"
        SELECT token, appointment_id, issued_at, expires_at, consumed_at
        FROM reschedule_tokens
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn lock_token<'e>(executor: impl PgExecutor<'e>, token: &str) -> Result<Option<DbRescheduleToken>> {
    let row = sqlx::query_as::<_, DbRescheduleToken>(
        r#"
        SELECT token, appointment_id, issued_at, expires_at, consumed_at
        FROM reschedule_tokens
        WHERE token = $1
        FOR UPDATE
        "#,
    )
    .bind(token)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn consume_token<'e>(
    executor: impl PgExecutor<'e>,
    token: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE reschedule_tokens SET consumed_at = $2 WHERE token = $1")
        .bind(token)
        .bind(now)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn delete_expired<'e>(executor: impl PgExecutor<'e>, now: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reschedule_tokens WHERE expires_at <= $1")
        .bind(now)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
