use agenda_core::{
    models::{
        appointment::{Appointment, AppointmentStatus, BookingOutcome},
        token::{IssueTokenResponse, RescheduleToken, RescheduleView},
    },
    store::AgendaStore,
};
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{TestContext, in_days, t};

async fn book(server: &TestServer, ctx: &TestContext, days: i64, start: &str) -> Appointment {
    server
        .post(&format!("/api/professionals/{}/appointments", ctx.professional_id))
        .json(&json!({
            "contract_id": ctx.contract.id,
            "slots": [{ "date": in_days(days), "start": start }]
        }))
        .await
        .json::<BookingOutcome>()
        .appointments
        .remove(0)
}

async fn issue(server: &TestServer, appointment: &Appointment) -> String {
    let response = server
        .post(&format!("/api/appointments/{}/reschedule-token", appointment.id))
        .await;
    response.assert_status(StatusCode::CREATED);
    let issued = response.json::<IssueTokenResponse>();
    assert_eq!(issued.appointment_id, appointment.id);
    issued.token
}

#[tokio::test]
async fn test_resolve_lists_candidates_without_own_slot_blocking() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let appointment = book(&server, &ctx, 2, "09:00").await;
    let token = issue(&server, &appointment).await;

    let response = server.get(&format!("/api/reschedule/{token}")).await;
    response.assert_status(StatusCode::OK);

    let view = response.json::<RescheduleView>();
    assert!(view.can_move);
    assert_eq!(view.appointment.id, appointment.id);
    assert_eq!(view.candidate_slots.first().map(|slot| slot.date), Some(in_days(1)));
    assert!(
        view.candidate_slots
            .iter()
            .any(|slot| slot.date == in_days(2) && slot.start == t(9, 0))
    );
    assert!(view.candidate_slots.iter().all(|slot| slot.date <= in_days(15)));
    assert_eq!(view.candidate_slots.last().map(|slot| slot.date), Some(in_days(15)));
}

#[tokio::test]
async fn test_confirm_then_move_once() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let appointment = book(&server, &ctx, 2, "09:00").await;
    let token = issue(&server, &appointment).await;

    let confirmed = server
        .post(&format!("/api/reschedule/{token}/confirm"))
        .await
        .json::<Appointment>();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let response = server
        .post(&format!("/api/reschedule/{token}/move"))
        .json(&json!({ "date": in_days(3), "start": "10:00" }))
        .await;
    response.assert_status(StatusCode::OK);
    let moved = response.json::<Appointment>();
    assert_eq!(moved.date, in_days(3));
    assert_eq!((moved.start, moved.end), (t(10, 0), t(10, 50)));
    assert_eq!(moved.status, AppointmentStatus::Scheduled);

    server
        .post(&format!("/api/reschedule/{token}/move"))
        .json(&json!({ "date": in_days(4), "start": "10:00" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let view = server
        .get(&format!("/api/reschedule/{token}"))
        .await
        .json::<RescheduleView>();
    assert!(!view.can_move);
    assert!(view.candidate_slots.is_empty());
}

#[tokio::test]
async fn test_move_rejections() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let appointment = book(&server, &ctx, 2, "09:00").await;
    book(&server, &ctx, 3, "11:00").await;
    let token = issue(&server, &appointment).await;

    // window ends 14 days after tomorrow
    server
        .post(&format!("/api/reschedule/{token}/move"))
        .json(&json!({ "date": in_days(16), "start": "10:00" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // not on the slot grid
    server
        .post(&format!("/api/reschedule/{token}/move"))
        .json(&json!({ "date": in_days(3), "start": "09:30" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post(&format!("/api/reschedule/{token}/move"))
        .json(&json!({ "date": in_days(3), "start": "11:00" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    // failed attempts leave the link usable
    server
        .post(&format!("/api/reschedule/{token}/move"))
        .json(&json!({ "date": in_days(3), "start": "13:00" }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .get("/api/reschedule/not-a-real-token")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_token_is_gone() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let appointment = book(&server, &ctx, 2, "09:00").await;
    let now = Utc::now();
    ctx.store
        .insert_token(&RescheduleToken {
            token: "stale".to_string(),
            appointment_id: appointment.id,
            issued_at: now - Duration::days(15),
            expires_at: now - Duration::days(1),
            consumed_at: None,
        })
        .await
        .unwrap();

    server
        .get("/api/reschedule/stale")
        .await
        .assert_status(StatusCode::GONE);
    server
        .post("/api/reschedule/stale/confirm")
        .await
        .assert_status(StatusCode::GONE);
}

#[tokio::test]
async fn test_cancelled_appointment_cannot_get_a_token() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let appointment = book(&server, &ctx, 2, "09:00").await;
    server
        .post(&format!("/api/appointments/{}/cancel", appointment.id))
        .await
        .assert_status(StatusCode::OK);

    server
        .post(&format!("/api/appointments/{}/reschedule-token", appointment.id))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
