use agenda_core::models::appointment::{
    Appointment, AppointmentStatus, BookingOutcome, ListAppointmentsResponse,
};
use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{TestContext, in_days, t};

async fn book_one(server: &TestServer, ctx: &TestContext, days: i64, start: &str) -> Appointment {
    let response = server
        .post(&format!("/api/professionals/{}/appointments", ctx.professional_id))
        .json(&json!({
            "contract_id": ctx.contract.id,
            "slots": [{ "date": in_days(days), "start": start }]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<BookingOutcome>().appointments.remove(0)
}

#[tokio::test]
async fn test_partial_batch_is_created_with_rejections() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    book_one(&server, &ctx, 2, "09:00").await;

    let response = server
        .post(&format!("/api/professionals/{}/appointments", ctx.professional_id))
        .json(&json!({
            "contract_id": ctx.contract.id,
            "slots": [
                { "date": in_days(2), "start": "09:00" },
                { "date": in_days(2), "start": "10:00" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let outcome = response.json::<BookingOutcome>();
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.appointments[0].start, t(10, 0));
    assert_eq!(outcome.appointments[0].end, t(10, 50));
    assert_eq!(outcome.appointments[0].status, AppointmentStatus::Scheduled);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].reason, "Conflict");
}

#[tokio::test]
async fn test_fully_rejected_batch_is_ok_not_created() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    book_one(&server, &ctx, 2, "14:00").await;

    let response = server
        .post(&format!("/api/professionals/{}/appointments", ctx.professional_id))
        .json(&json!({
            "contract_id": ctx.contract.id,
            "slots": [{ "date": in_days(2), "start": "14:00" }]
        }))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<BookingOutcome>().created, 0);
}

#[tokio::test]
async fn test_booking_unknown_contract_is_not_found() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post(&format!("/api/professionals/{}/appointments", ctx.professional_id))
        .json(&json!({
            "contract_id": Uuid::new_v4(),
            "slots": [{ "date": in_days(2), "start": "09:00" }]
        }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_outside_window_is_bad_request() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post(&format!("/api/professionals/{}/appointments", ctx.professional_id))
        .json(&json!({
            "contract_id": ctx.contract.id,
            "slots": [{ "date": in_days(2), "start": "16:30" }]
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booked_slot_disappears_from_listing() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    book_one(&server, &ctx, 4, "11:00").await;
    let date = in_days(4);

    let slots = server
        .get(&format!(
            "/api/professionals/{}/slots?from={date}&to={date}",
            ctx.professional_id
        ))
        .await
        .json::<agenda_core::models::slot::ListSlotsResponse>()
        .slots;
    assert!(slots.iter().all(|slot| slot.start != t(11, 0)));
    assert_eq!(slots.len(), 6);
}

#[tokio::test]
async fn test_patch_into_taken_slot_is_conflict() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    book_one(&server, &ctx, 2, "09:00").await;
    let second = book_one(&server, &ctx, 2, "10:00").await;

    let response = server
        .patch(&format!("/api/appointments/{}", second.id))
        .json(&json!({ "start": "09:30" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patch_status_and_notes() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let booked = book_one(&server, &ctx, 3, "13:00").await;

    let response = server
        .patch(&format!("/api/appointments/{}", booked.id))
        .json(&json!({ "status": "CONFIRMED", "notes": "first session" }))
        .await;
    response.assert_status(StatusCode::OK);

    let updated = response.json::<Appointment>();
    assert_eq!(updated.status, AppointmentStatus::Confirmed);
    assert_eq!(updated.notes.as_deref(), Some("first session"));
    assert_eq!(updated.start, t(13, 0));
}

#[tokio::test]
async fn test_cancel_frees_slot_and_hides_from_default_listing() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let booked = book_one(&server, &ctx, 5, "15:00").await;

    let response = server
        .post(&format!("/api/appointments/{}/cancel", booked.id))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Appointment>().status, AppointmentStatus::Cancelled);

    let date = in_days(5);
    let listing = server
        .get(&format!(
            "/api/professionals/{}/appointments?from={date}&to={date}",
            ctx.professional_id
        ))
        .await
        .json::<ListAppointmentsResponse>();
    assert!(listing.appointments.is_empty());

    let everything = server
        .get(&format!(
            "/api/professionals/{}/appointments?from={date}&to={date}&include_inactive=true",
            ctx.professional_id
        ))
        .await
        .json::<ListAppointmentsResponse>();
    assert_eq!(everything.appointments.len(), 1);

    book_one(&server, &ctx, 5, "15:00").await;
}

#[tokio::test]
async fn test_moving_cancelled_appointment_is_unprocessable() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let booked = book_one(&server, &ctx, 2, "09:00").await;
    server
        .post(&format!("/api/appointments/{}/cancel", booked.id))
        .await
        .assert_status(StatusCode::OK);

    server
        .patch(&format!("/api/appointments/{}", booked.id))
        .json(&json!({ "date": in_days(3) }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
