//! Civil (wall-clock) date and time helpers.
//!
//! The engine runs in one fixed civil timezone, so dates are `NaiveDate` and
//! times of day are `NaiveTime`. Intervals are half-open `[start, end)`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Adds whole minutes to a time of day. Returns `None` when the result would
/// wrap past midnight, so a session can never silently end "before" it starts.
pub fn add_minutes(time: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let (shifted, wrapped) = time.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    if wrapped == 0 { Some(shifted) } else { None }
}

/// Half-open interval intersection: touching intervals do not overlap.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

/// A single reading of the clock, both as an instant and as civil time in the
/// engine's configured zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub utc: DateTime<Utc>,
    pub local: NaiveDateTime,
}

impl Moment {
    pub fn at<Tz: TimeZone>(utc: DateTime<Utc>, zone: &Tz) -> Self {
        Self {
            utc,
            local: utc.with_timezone(zone).naive_local(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.local.date()
    }

    pub fn tomorrow(&self) -> NaiveDate {
        self.today() + Duration::days(1)
    }

    /// True when `date`/`start` lies strictly after this moment.
    pub fn is_before(&self, date: NaiveDate, start: NaiveTime) -> bool {
        date.and_time(start) > self.local
    }
}

/// Inclusive day iterator `[from, to]`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day <= to)
}

/// `HH:MM` serde format for times of day. Deserialization also accepts
/// `HH:MM:SS`, which is how Postgres renders `TIME` columns.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{raw}', expected HH:MM"))),
                None => Ok(None),
            }
        }
    }
}
