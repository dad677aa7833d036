use chrono::{Months, NaiveDate};

use crate::models::{appointment::SlotRequest, contract::ScheduleRule, template::{DAYS_IN_WEEK, weekday_index}};

/// Horizon used when a contract has neither an end date nor a count.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// Expands weekly rules into concrete `(date, start)` requests, ordered by date
/// then time.
///
/// * `end` bounds the dates (inclusive).
/// * `count` truncates the result.
/// * With neither, expansion stops one year after `start`.
///
/// Nothing here checks availability; the requests go to the booking ledger.
pub fn expand(
    rules: &[ScheduleRule],
    start: NaiveDate,
    end: Option<NaiveDate>,
    count: Option<u32>,
) -> Vec<SlotRequest> {
    if rules.is_empty() || count == Some(0) {
        return Vec::new();
    }
    let horizon = match (end, count) {
        (Some(end), _) => Some(end),
        (None, Some(_)) => None,
        (None, None) => start.checked_add_months(Months::new(DEFAULT_HORIZON_MONTHS)),
    };

    let mut ordered: Vec<ScheduleRule> = rules
        .iter()
        .copied()
        .filter(|rule| rule.weekday < DAYS_IN_WEEK)
        .collect();
    if ordered.is_empty() {
        return Vec::new();
    }
    ordered.sort_by_key(|rule| (rule.time, rule.weekday));
    ordered.dedup();

    let limit = count.map(|count| count as usize).unwrap_or(usize::MAX);
    let mut requests = Vec::new();
    for date in start.iter_days() {
        if horizon.is_some_and(|horizon| date > horizon) || requests.len() >= limit {
            break;
        }
        let weekday = weekday_index(date);
        for rule in ordered.iter().filter(|rule| rule.weekday == weekday) {
            if requests.len() >= limit {
                break;
            }
            requests.push(SlotRequest {
                date,
                start: rule.time,
            });
        }
    }
    requests
}
