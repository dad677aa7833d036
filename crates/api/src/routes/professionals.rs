use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/professionals/:id/templates",
            get(handlers::templates::get_templates).put(handlers::templates::put_templates),
        )
        .route(
            "/api/professionals/:id/templates/copy",
            post(handlers::templates::copy_template_day),
        )
        .route("/api/professionals/:id/slots", get(handlers::slots::list_slots))
        .route(
            "/api/professionals/:id/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointments),
        )
}
