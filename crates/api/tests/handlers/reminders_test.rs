use agenda_core::models::{
    appointment::BookingOutcome,
    reminder::{DispatchSummary, PatientContact},
};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{MockSender, TestContext, in_days, t, today};

async fn book_tomorrow(ctx: &TestContext, server: &axum_test::TestServer, start: &str) {
    let outcome = server
        .post(&format!("/api/professionals/{}/appointments", ctx.professional_id))
        .json(&json!({
            "contract_id": ctx.contract.id,
            "slots": [{ "date": in_days(1), "start": start }]
        }))
        .await
        .json::<BookingOutcome>();
    assert_eq!(outcome.created, 1);
}

#[tokio::test]
async fn test_contact_upsert_echoes_contact() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .put(&format!("/api/patients/{}/contact", ctx.contract.patient_id))
        .json(&json!({ "phone": "+55 11 99999-0000" }))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json::<PatientContact>().phone.as_deref(),
        Some("+55 11 99999-0000")
    );
}

#[tokio::test]
async fn test_dispatch_without_body_targets_tomorrow() {
    let ctx = TestContext::new().await;
    let patient_id = ctx.contract.patient_id;
    let mut sender = MockSender::new();
    sender
        .expect_send()
        .withf(move |reminder| {
            reminder.patient_id == patient_id
                && reminder.date == in_days(1)
                && reminder.start == t(9, 0)
                && reminder.reschedule_token.is_some()
        })
        .times(1)
        .returning(|_| Ok(()));
    let server = ctx.server_with(sender);

    book_tomorrow(&ctx, &server, "09:00").await;
    server
        .put(&format!("/api/patients/{patient_id}/contact"))
        .json(&json!({ "phone": "+5511999990000" }))
        .await
        .assert_status(StatusCode::OK);

    let response = server.post("/api/reminders/dispatch").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<DispatchSummary>(), DispatchSummary { sent: 1, skipped: 0 });
}

#[tokio::test]
async fn test_dispatch_skips_missing_phone_and_failed_sends() {
    let ctx = TestContext::new().await;
    let mut sender = MockSender::new();
    sender
        .expect_send()
        .times(1)
        .returning(|_| Err(eyre::eyre!("gateway unavailable")));
    let server = ctx.server_with(sender);

    book_tomorrow(&ctx, &server, "09:00").await;
    server
        .put(&format!("/api/patients/{}/contact", ctx.contract.patient_id))
        .json(&json!({ "phone": "+5511999990000" }))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post("/api/reminders/dispatch")
        .json(&json!({ "as_of": today(), "professional_id": ctx.professional_id }))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<DispatchSummary>(), DispatchSummary { sent: 0, skipped: 1 });
}

#[tokio::test]
async fn test_dispatch_for_blank_phone_never_calls_sender() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    book_tomorrow(&ctx, &server, "10:00").await;
    server
        .put(&format!("/api/patients/{}/contact", ctx.contract.patient_id))
        .json(&json!({ "phone": "   " }))
        .await
        .assert_status(StatusCode::OK);

    let summary = server
        .post("/api/reminders/dispatch")
        .await
        .json::<DispatchSummary>();
    assert_eq!(summary, DispatchSummary { sent: 0, skipped: 1 });
}
