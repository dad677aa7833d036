use agenda_core::models::{
    appointment::{AppointmentStatus, BookingOutcome, ListAppointmentsResponse},
    contract::{Contract, ContractStatus, EndContractResponse, SignContractResponse},
};
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Datelike;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{TestContext, in_days, t};

async fn sync_contract(server: &TestServer, ctx: &TestContext, status: &str) -> Contract {
    let start = in_days(1);
    let response = server
        .put(&format!("/api/contracts/{}", Uuid::new_v4()))
        .json(&json!({
            "professional_id": ctx.professional_id,
            "patient_id": Uuid::new_v4(),
            "status": status,
            "start_date": start,
            "end_date": null,
            "num_appointments": 4,
            "schedule_rules": [
                { "weekday": start.weekday().num_days_from_sunday(), "time": "10:00" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::OK);
    response.json::<Contract>()
}

#[tokio::test]
async fn test_pending_contract_activates_pre_scheduled() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let contract = sync_contract(&server, &ctx, "PENDING").await;
    assert_eq!(contract.status, ContractStatus::Pending);

    let response = server
        .post(&format!("/api/contracts/{}/activate", contract.id))
        .await;
    response.assert_status(StatusCode::OK);

    let outcome = response.json::<BookingOutcome>();
    assert_eq!(outcome.created, 4);
    assert!(
        outcome
            .appointments
            .iter()
            .all(|a| a.status == AppointmentStatus::PreScheduled && a.start == t(10, 0))
    );
    let dates: Vec<_> = outcome.appointments.iter().map(|a| a.date).collect();
    assert_eq!(dates, vec![in_days(1), in_days(8), in_days(15), in_days(22)]);
}

#[tokio::test]
async fn test_sign_promotes_pre_scheduled() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let contract = sync_contract(&server, &ctx, "PENDING").await;
    server
        .post(&format!("/api/contracts/{}/activate", contract.id))
        .json(&json!({ "count": 2 }))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post(&format!("/api/contracts/{}/sign", contract.id))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<SignContractResponse>().promoted, 2);

    let listing = server
        .get(&format!(
            "/api/professionals/{}/appointments?from={}&to={}",
            ctx.professional_id,
            in_days(1),
            in_days(30)
        ))
        .await
        .json::<ListAppointmentsResponse>();
    assert!(
        listing
            .appointments
            .iter()
            .all(|a| a.status == AppointmentStatus::Scheduled)
    );
}

#[tokio::test]
async fn test_end_contract_marks_later_appointments() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let contract = sync_contract(&server, &ctx, "SIGNED").await;
    let outcome = server
        .post(&format!("/api/contracts/{}/activate", contract.id))
        .await
        .json::<BookingOutcome>();
    assert_eq!(outcome.created, 4);

    let response = server
        .post(&format!("/api/contracts/{}/end", contract.id))
        .json(&json!({ "end_date": in_days(8) }))
        .await;
    response.assert_status(StatusCode::OK);

    let ended = response.json::<EndContractResponse>();
    assert_eq!(ended.ended, vec![outcome.appointments[2].id, outcome.appointments[3].id]);
}

#[tokio::test]
async fn test_ending_pending_contract_is_unprocessable() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let contract = sync_contract(&server, &ctx, "PENDING").await;

    server
        .post(&format!("/api/contracts/{}/end", contract.id))
        .json(&json!({ "end_date": in_days(8) }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_signing_unknown_contract_is_not_found() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post(&format!("/api/contracts/{}/sign", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
