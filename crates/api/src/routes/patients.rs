use axum::{Router, routing::put};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route("/api/patients/:id/contact", put(handlers::patients::upsert_contact))
}
