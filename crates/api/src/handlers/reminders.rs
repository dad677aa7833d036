use std::sync::Arc;

use agenda_core::{
    models::reminder::{DispatchRequest, DispatchSummary},
    services::reminders,
};
use axum::{Json, extract::State};

use crate::{ApiState, middleware::error_handling::AppError};

/// Runs one reminder sweep. `as_of` defaults to today in the agenda's timezone.
#[axum::debug_handler]
pub async fn dispatch(
    State(state): State<Arc<ApiState>>,
    payload: Option<Json<DispatchRequest>>,
) -> Result<Json<DispatchSummary>, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let now = state.now();
    let summary = reminders::dispatch(
        state.store.as_ref(),
        state.sender.as_ref(),
        &state.reschedule,
        request.as_of.unwrap_or_else(|| now.today()),
        request.professional_id,
        &now,
    )
    .await?;
    Ok(Json(summary))
}
