//! Next-date arithmetic for the supported recurrence patterns.
//!
//! Dates here are civil dates in the institution's timezone, so "next day"
//! and weekday checks never depend on the host's locale.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use lectern_core::constants::CUSTOM_DAY_SCAN_LIMIT;
use lectern_core::types::is_weekend;
use lectern_db::db::enums::RecurrencePattern;
use lectern_db::model::occurrence::ClassOccurrence;

/// ## Summary
/// Next candidate date for the series `occurrence` belongs to.
///
/// Returns `None` when the record names no pattern, or when a custom pattern
/// has no usable weekdays.
#[must_use]
pub fn next_date(occurrence: &ClassOccurrence) -> Option<NaiveDate> {
    let pattern = occurrence.recurrence_pattern?;
    next_date_for(
        pattern,
        occurrence.occurrence_date,
        &occurrence.custom_weekdays(),
    )
}

/// ## Summary
/// Next date after `current` under `pattern`.
///
/// `custom_days` is only consulted for [`RecurrencePattern::Custom`]. The
/// custom scan starts at the day after `current` and gives up after
/// [`CUSTOM_DAY_SCAN_LIMIT`] days.
#[must_use]
pub fn next_date_for(
    pattern: RecurrencePattern,
    current: NaiveDate,
    custom_days: &[Weekday],
) -> Option<NaiveDate> {
    match pattern {
        RecurrencePattern::Weekly => current.checked_add_days(Days::new(7)),
        RecurrencePattern::Weekdays => {
            let mut date = current.succ_opt()?;
            while is_weekend(date.weekday()) {
                date = date.succ_opt()?;
            }
            Some(date)
        }
        RecurrencePattern::Custom => {
            if custom_days.is_empty() {
                return None;
            }
            (1..=CUSTOM_DAY_SCAN_LIMIT)
                .filter_map(|offset| current.checked_add_days(Days::new(u64::from(offset))))
                .find(|date| custom_days.contains(&date.weekday()))
        }
    }
}
