use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::{
    errors::{AgendaError, AgendaResult},
    models::template::{AvailabilityTemplate, DAYS_IN_WEEK, WeekTemplate},
    store::AgendaStore,
};

pub async fn get_week(store: &dyn AgendaStore, professional_id: Uuid) -> AgendaResult<WeekTemplate> {
    let rows = store.templates(professional_id).await?;
    Ok(WeekTemplate::from_rows(professional_id, rows))
}

/// Validates and stores the given weekdays. Weekdays not mentioned keep
/// whatever they had before.
pub async fn put_week(
    store: &dyn AgendaStore,
    professional_id: Uuid,
    days: Vec<AvailabilityTemplate>,
) -> AgendaResult<WeekTemplate> {
    let mut seen = HashSet::new();
    for day in &days {
        day.validate()?;
        if !seen.insert(day.weekday) {
            return Err(AgendaError::Validation(format!(
                "weekday {} appears more than once",
                day.weekday
            )));
        }
    }

    store.replace_templates(professional_id, &days).await?;
    info!(
        "Availability updated: professional_id={}, weekdays={:?}",
        professional_id,
        days.iter().map(|day| day.weekday).collect::<Vec<_>>()
    );
    get_week(store, professional_id).await
}

/// Overwrites `to_day` with the configuration of `from_day`.
pub async fn copy_day(
    store: &dyn AgendaStore,
    professional_id: Uuid,
    from_day: u8,
    to_day: u8,
) -> AgendaResult<WeekTemplate> {
    if from_day >= DAYS_IN_WEEK || to_day >= DAYS_IN_WEEK {
        return Err(AgendaError::Validation(
            "weekdays must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        ));
    }
    let week = get_week(store, professional_id).await?;
    let copy = week.day(from_day).for_weekday(to_day);
    store.replace_templates(professional_id, &[copy]).await?;
    info!(
        "Availability day copied: professional_id={}, from_day={}, to_day={}",
        professional_id, from_day, to_day
    );
    get_week(store, professional_id).await
}
