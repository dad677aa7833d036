use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::civil::hhmm;

/// A bookable interval derived from a template. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSlotsResponse {
    pub slots: Vec<Slot>,
    /// Weekdays (0 = Sunday) that take bookings at all.
    pub configured_days: Vec<u8>,
}
