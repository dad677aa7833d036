pub mod appointments;
pub mod contracts;
pub mod patients;
pub mod reminders;
pub mod reschedule;
pub mod slots;
pub mod templates;

use chrono::NaiveDate;
use serde::Deserialize;

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD`
#[derive(Debug, Clone, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub include_inactive: bool,
}
