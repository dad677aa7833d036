use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // One row per professional and weekday; missing rows read as disabled days
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_templates (
            professional_id UUID NOT NULL,
            weekday SMALLINT NOT NULL CHECK (weekday BETWEEN 0 AND 6),
            enabled BOOLEAN NOT NULL DEFAULT FALSE,
            window_start TIME NULL,
            window_end TIME NULL,
            session_minutes INTEGER NOT NULL DEFAULT 50 CHECK (session_minutes > 0),
            buffer_minutes INTEGER NOT NULL DEFAULT 10 CHECK (buffer_minutes >= 0),
            lunch_start TIME NULL,
            lunch_end TIME NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (professional_id, weekday)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contracts (
            id UUID PRIMARY KEY,
            professional_id UUID NOT NULL,
            patient_id UUID NOT NULL,
            status VARCHAR(16) NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NULL,
            num_appointments INTEGER NULL CHECK (num_appointments > 0),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contract_schedule_rules (
            contract_id UUID NOT NULL REFERENCES contracts(id) ON DELETE CASCADE,
            weekday SMALLINT NOT NULL CHECK (weekday BETWEEN 0 AND 6),
            time_of_day TIME NOT NULL,
            PRIMARY KEY (contract_id, weekday, time_of_day)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY,
            professional_id UUID NOT NULL,
            patient_id UUID NOT NULL,
            contract_id UUID NOT NULL REFERENCES contracts(id),
            appointment_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            status VARCHAR(16) NOT NULL,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_appointment_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reschedule_tokens (
            token VARCHAR(64) PRIMARY KEY,
            appointment_id UUID NOT NULL REFERENCES appointments(id),
            issued_at TIMESTAMP WITH TIME ZONE NOT NULL,
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
            consumed_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patient_contacts (
            patient_id UUID PRIMARY KEY,
            phone VARCHAR(32) NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Several statements, so this goes through the simple query protocol
    pool.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_active_day
            ON appointments(professional_id, appointment_date)
            WHERE status IN ('PRE_SCHEDULED', 'SCHEDULED', 'CONFIRMED');
        CREATE INDEX IF NOT EXISTS idx_appointments_day ON appointments(appointment_date);
        CREATE INDEX IF NOT EXISTS idx_appointments_contract_id ON appointments(contract_id);
        CREATE INDEX IF NOT EXISTS idx_reschedule_tokens_appointment_id ON reschedule_tokens(appointment_id);
        CREATE INDEX IF NOT EXISTS idx_reschedule_tokens_expires_at ON reschedule_tokens(expires_at);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
