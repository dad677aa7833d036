use agenda_reminder::config::ReminderConfig;
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Runs one reminder sweep and exits. Meant to be scheduled once a day.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ReminderConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let summary = agenda_reminder::run(config).await?;
    info!("Reminder sweep finished: {} sent, {} skipped", summary.sent, summary.skipped);

    Ok(())
}
