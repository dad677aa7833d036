use agenda_core::models::template::AvailabilityTemplate;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::DbTemplate;

pub async fn list_for_professional<'e>(
    executor: impl PgExecutor<'e>,
    professional_id: Uuid,
) -> Result<Vec<DbTemplate>> {
    tracing::debug!("Getting availability templates for professional: {}", professional_id);

    let rows = sqlx::query_as::<_, DbTemplate>(
        r#"
        SELECT professional_id, weekday, enabled, window_start, window_end,
               session_minutes, buffer_minutes, lunch_start, lunch_end, updated_at
        FROM availability_templates
        WHERE professional_id = $1
        ORDER BY weekday
        "#,
    )
    .bind(professional_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Replaces the row for the template's weekday.
pub async fn upsert<'e>(
    executor: impl PgExecutor<'e>,
    professional_id: Uuid,
    template: &AvailabilityTemplate,
) -> Result<()> {
    tracing::debug!(
        "Saving availability template: professional_id={}, weekday={}, enabled={}",
        professional_id,
        template.weekday,
        template.enabled
    );

    sqlx::query(
        r#"
        INSERT INTO availability_templates (
            professional_id, weekday, enabled, window_start, window_end,
            session_minutes, buffer_minutes, lunch_start, lunch_end, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
        ON CONFLICT (professional_id, weekday) DO UPDATE SET
            enabled = EXCLUDED.enabled,
            window_start = EXCLUDED.window_start,
            window_end = EXCLUDED.window_end,
            session_minutes = EXCLUDED.session_minutes,
            buffer_minutes = EXCLUDED.buffer_minutes,
            lunch_start = EXCLUDED.lunch_start,
            lunch_end = EXCLUDED.lunch_end,
            updated_at = NOW()
        "#,
    )
    .bind(professional_id)
    .bind(i16::from(template.weekday))
    .bind(template.enabled)
    .bind(template.window.map(|window| window.start))
    .bind(template.window.map(|window| window.end))
    .bind(i32::try_from(template.session_minutes)?)
    .bind(i32::try_from(template.buffer_minutes)?)
    .bind(template.lunch.map(|lunch| lunch.start))
    .bind(template.lunch.map(|lunch| lunch.end))
    .execute(executor)
    .await?;

    Ok(())
}
