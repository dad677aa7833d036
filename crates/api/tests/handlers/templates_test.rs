use agenda_core::models::{slot::ListSlotsResponse, template::WeekTemplate};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{TestContext, in_days, t};

#[tokio::test]
async fn test_unconfigured_professional_has_seven_disabled_days() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .get(&format!("/api/professionals/{}/templates", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::OK);

    let week = response.json::<WeekTemplate>();
    assert_eq!(week.days.len(), 7);
    assert!(week.days.iter().all(|day| !day.enabled));
}

#[tokio::test]
async fn test_put_templates_keeps_other_days() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .put(&format!("/api/professionals/{}/templates", ctx.professional_id))
        .json(&json!({
            "days": [{
                "weekday": 6,
                "enabled": false,
                "window": null
            }]
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let week = response.json::<WeekTemplate>();
    assert!(!week.day(6).enabled);
    assert!(week.day(5).enabled);
    assert_eq!(week.day(6).session_minutes, 50);
}

#[tokio::test]
async fn test_put_templates_rejects_inverted_window() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .put(&format!("/api/professionals/{}/templates", ctx.professional_id))
        .json(&json!({
            "days": [{
                "weekday": 2,
                "enabled": true,
                "window": { "start": "18:00", "end": "08:00" }
            }]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_copy_day_overwrites_target() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .put(&format!("/api/professionals/{}/templates", ctx.professional_id))
        .json(&json!({
            "days": [{
                "weekday": 1,
                "enabled": true,
                "window": { "start": "14:00", "end": "20:00" },
                "session_minutes": 30,
                "buffer_minutes": 0
            }]
        }))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post(&format!("/api/professionals/{}/templates/copy", ctx.professional_id))
        .json(&json!({ "from_day": 1, "to_day": 4 }))
        .await;
    response.assert_status(StatusCode::OK);

    let week = response.json::<WeekTemplate>();
    let thursday = week.day(4);
    assert_eq!(thursday.weekday, 4);
    assert_eq!(thursday.session_minutes, 30);
    assert_eq!(thursday.window.map(|w| w.start), Some(t(14, 0)));
}

#[tokio::test]
async fn test_copy_day_rejects_bad_weekday() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post(&format!("/api/professionals/{}/templates/copy", ctx.professional_id))
        .json(&json!({ "from_day": 1, "to_day": 7 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_slots_for_one_day() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let date = in_days(3);

    let response = server
        .get(&format!(
            "/api/professionals/{}/slots?from={date}&to={date}",
            ctx.professional_id
        ))
        .await;
    response.assert_status(StatusCode::OK);

    let listing = response.json::<ListSlotsResponse>();
    let starts: Vec<_> = listing.slots.iter().map(|slot| slot.start).collect();
    assert_eq!(
        starts,
        vec![t(9, 0), t(10, 0), t(11, 0), t(13, 0), t(14, 0), t(15, 0), t(16, 0)]
    );
    assert_eq!(listing.configured_days, vec![0, 1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_list_slots_rejects_reversed_range() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .get(&format!(
            "/api/professionals/{}/slots?from={}&to={}",
            ctx.professional_id,
            in_days(5),
            in_days(2)
        ))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
