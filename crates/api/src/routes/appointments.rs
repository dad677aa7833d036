use axum::{
    Router,
    routing::{patch, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/appointments/:id", patch(handlers::appointments::patch_appointment))
        .route(
            "/api/appointments/:id/cancel",
            post(handlers::appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/:id/reschedule-token",
            post(handlers::appointments::issue_reschedule_token),
        )
}
