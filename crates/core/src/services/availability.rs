use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::{AgendaError, AgendaResult},
    models::slot::ListSlotsResponse,
    services::templates::get_week,
    slots::slots_between,
    store::AgendaStore,
};

/// Longest range a single slot listing may cover.
pub const MAX_LISTING_DAYS: i64 = 84;

pub fn check_range(from: NaiveDate, to: NaiveDate, max_days: Option<i64>) -> AgendaResult<()> {
    if to < from {
        return Err(AgendaError::Validation(format!(
            "range end {to} is before its start {from}"
        )));
    }
    if let Some(max_days) = max_days {
        if (to - from).num_days() + 1 > max_days {
            return Err(AgendaError::Validation(format!(
                "range may cover at most {max_days} days"
            )));
        }
    }
    Ok(())
}

pub async fn list_slots(
    store: &dyn AgendaStore,
    professional_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> AgendaResult<ListSlotsResponse> {
    check_range(from, to, Some(MAX_LISTING_DAYS))?;

    let week = get_week(store, professional_id).await?;
    let booked = store.appointments_between(professional_id, from, to).await?;
    let slots = slots_between(&week, from, to, &booked, None);
    tracing::debug!(
        "Listed {} slots for professional_id={} from {} to {}",
        slots.len(),
        professional_id,
        from,
        to
    );

    Ok(ListSlotsResponse {
        slots,
        configured_days: week
            .days
            .iter()
            .filter(|day| day.bookable_window().is_some())
            .map(|day| day.weekday)
            .collect(),
    })
}
