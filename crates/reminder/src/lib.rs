use agenda_core::{
    civil::Moment,
    errors::AgendaResult,
    models::reminder::DispatchSummary,
    services::{ReminderSender, reminders},
    store::AgendaStore,
};
use agenda_db::{PgStore, create_pool};
use chrono::Utc;
use eyre::Result;
use tracing::info;

pub mod config;
pub mod sender;

use config::ReminderConfig;

/// One sweep for `now`: reminds every appointment dated tomorrow.
pub async fn run_once(
    store: &dyn AgendaStore,
    sender: &dyn ReminderSender,
    config: &ReminderConfig,
    now: &Moment,
) -> AgendaResult<DispatchSummary> {
    let as_of = now.today();
    info!(
        "Dispatching reminders as of {} ({})",
        as_of,
        config.timezone.name()
    );
    let summary = reminders::dispatch(
        store,
        sender,
        &config.reschedule,
        as_of,
        config.professional_id,
        now,
    )
    .await?;
    info!("Reminders sent: {}, skipped: {}", summary.sent, summary.skipped);
    Ok(summary)
}

/// Connects to the database and runs a single sweep for the current time.
pub async fn run(config: ReminderConfig) -> Result<DispatchSummary> {
    let db_pool = create_pool(&config.database_url).await?;
    let store = PgStore::new(db_pool);
    let sender = sender::build_sender(&config.sender)?;

    let now = Moment::at(Utc::now(), &config.timezone);
    let summary = run_once(&store, sender.as_ref(), &config, &now).await?;
    Ok(summary)
}
