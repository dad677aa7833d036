use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Reschedule link past its expiry; kept apart from `NotFound` so clients
    /// can tell "link expired" from "link unknown".
    #[error("Link expired: {0}")]
    Expired(String),

    /// The appointment behind a request is no longer in a state that allows it.
    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type AgendaResult<T> = Result<T, AgendaError>;
