//! # Agenda API
//!
//! HTTP surface of the scheduling engine: availability templates, slot
//! listings, appointment booking, contract lifecycle, the tokenized
//! reschedule flow and the reminder sweep.
//!
//! ## Architecture
//!
//! - **Routes**: endpoint paths, grouped by resource
//! - **Handlers**: extract the request, call a service, shape the response
//! - **Middleware**: error mapping
//! - **Config**: environment configuration
//!
//! Handlers never touch a database directly; they go through the
//! [`AgendaStore`] held in [`ApiState`].

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error mapping
pub mod middleware;
/// Route definitions
pub mod routes;

use std::{sync::Arc, time::Duration};

use agenda_core::{
    civil::Moment,
    services::{ReminderSender, RescheduleSettings},
    store::AgendaStore,
};
use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, StatusCode, header},
};
use chrono::Utc;
use chrono_tz::Tz;
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub store: Arc<dyn AgendaStore>,
    /// Transport used by the reminder sweep
    pub sender: Arc<dyn ReminderSender>,
    /// Civil timezone every date and time of day is read in
    pub timezone: Tz,
    pub reschedule: RescheduleSettings,
}

impl ApiState {
    /// The current instant, with its civil reading in the agenda's timezone.
    pub fn now(&self) -> Moment {
        Moment::at(Utc::now(), &self.timezone)
    }
}

/// All routes with the shared state attached, without the outer layers.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::professionals::routes())
        .merge(routes::appointments::routes())
        .merge(routes::contracts::routes())
        .merge(routes::patients::routes())
        .merge(routes::reschedule::routes())
        .merge(routes::reminders::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(allowed)
        .allow_credentials(true)
}

/// Starts the API server
///
/// Sets up logging, builds the router with CORS and a request timeout, and
/// serves until the listener fails.
pub async fn start_server(config: config::ApiConfig, state: ApiState) -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let app = build_router(Arc::new(state));

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async { StatusCode::REQUEST_TIMEOUT }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Server listening on http://{} (timezone {})",
        addr,
        config.timezone.name()
    );
    axum::serve(listener, app).await?;

    Ok(())
}
