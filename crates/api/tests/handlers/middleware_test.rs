use agenda_api::middleware::error_handling::{AppError, map_error};
use agenda_core::errors::AgendaError;
use axum::http::StatusCode;
use rstest::rstest;

#[rstest]
#[case(AgendaError::Validation("bad input".into()), StatusCode::BAD_REQUEST)]
#[case(AgendaError::NotFound("appointment".into()), StatusCode::NOT_FOUND)]
#[case(AgendaError::Conflict("slot taken".into()), StatusCode::CONFLICT)]
#[case(AgendaError::Expired("link".into()), StatusCode::GONE)]
#[case(AgendaError::NotEligible("cancelled".into()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(AgendaError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: AgendaError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[test]
fn test_eyre_report_is_a_server_error() {
    let error: AppError = eyre::eyre!("pool timed out").into();
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
