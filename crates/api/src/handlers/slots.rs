use std::sync::Arc;

use agenda_core::{models::slot::ListSlotsResponse, services::availability};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{ApiState, handlers::RangeQuery, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ListSlotsResponse>, AppError> {
    let slots =
        availability::list_slots(state.store.as_ref(), professional_id, range.from, range.to).await?;
    Ok(Json(slots))
}
