use std::sync::Arc;

use agenda_api::{ApiState, config::ApiConfig};
use agenda_db::{PgStore, create_pool, schema::initialize_database};
use agenda_reminder::{config::SenderConfig, sender::build_sender};
use color_eyre::eyre::Result;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    let state = ApiState {
        store: Arc::new(PgStore::new(db_pool)),
        sender: build_sender(&SenderConfig::from_env())?,
        timezone: config.timezone,
        reschedule: config.reschedule,
    };

    // Start API server
    agenda_api::start_server(config, state).await?;

    Ok(())
}
