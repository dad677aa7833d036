//! # Error Handling Middleware
//!
//! Maps `AgendaError` variants onto HTTP status codes with a JSON body of the
//! form `{"error": "<message>"}`, so every handler reports failures the same way.

use agenda_core::errors::AgendaError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use agenda_api::middleware::error_handling::AppError;
/// use agenda_core::errors::AgendaError;
/// use axum::Json;
///
/// async fn handler(found: bool) -> Result<Json<u32>, AppError> {
///     if !found {
///         return Err(AgendaError::NotFound("appointment".to_string()).into());
///     }
///     Ok(Json(1))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub AgendaError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgendaError::Validation(_) => StatusCode::BAD_REQUEST,
            AgendaError::NotFound(_) => StatusCode::NOT_FOUND,
            AgendaError::Conflict(_) => StatusCode::CONFLICT,
            AgendaError::Expired(_) => StatusCode::GONE,
            AgendaError::NotEligible(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AgendaError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AgendaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Lets handlers use `?` on `AgendaResult`.
impl From<AgendaError> for AppError {
    fn from(err: AgendaError) -> Self {
        AppError(err)
    }
}

/// Wraps a bare `eyre::Report` as a database failure.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(AgendaError::Database(err))
    }
}

pub fn map_error(err: AgendaError) -> Response {
    AppError(err).into_response()
}
