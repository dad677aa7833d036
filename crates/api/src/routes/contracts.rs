use axum::{
    Router,
    routing::{post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/contracts/:id", put(handlers::contracts::upsert_contract))
        .route("/api/contracts/:id/activate", post(handlers::contracts::activate_contract))
        .route("/api/contracts/:id/sign", post(handlers::contracts::sign_contract))
        .route("/api/contracts/:id/end", post(handlers::contracts::end_contract))
}
