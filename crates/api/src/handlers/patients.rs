use std::sync::Arc;

use agenda_core::models::reminder::{PatientContact, UpsertContactRequest};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn upsert_contact(
    State(state): State<Arc<ApiState>>,
    Path(patient_id): Path<Uuid>,
    Json(payload): Json<UpsertContactRequest>,
) -> Result<Json<PatientContact>, AppError> {
    let contact = PatientContact {
        patient_id,
        phone: payload.phone,
    };
    state.store.upsert_patient_contact(&contact).await?;
    tracing::info!("Contact updated for patient {}", patient_id);
    Ok(Json(contact))
}
