use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

/// Unauthenticated: the token in the path is the only credential.
pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/reschedule/:token", get(handlers::reschedule::resolve))
        .route("/api/reschedule/:token/confirm", post(handlers::reschedule::confirm))
        .route("/api/reschedule/:token/move", post(handlers::reschedule::move_appointment))
}
