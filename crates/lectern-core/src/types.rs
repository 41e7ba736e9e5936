//! Calendar vocabulary shared across crates.

use chrono::{NaiveTime, Weekday};

use crate::error::{CoreError, CoreResult};

/// Wall-clock format used when displaying `start_time` / `end_time`.
pub const WALL_CLOCK_FORMAT: &str = "%H:%M";

/// ## Summary
/// Returns the English weekday name stored in the `day` column.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// ## Summary
/// Parses a weekday name as written by the admin tooling.
///
/// Accepts full and three-letter names, case-insensitively.
///
/// ## Errors
/// Returns `CoreError::ParseError` for anything else.
pub fn parse_weekday(name: &str) -> CoreResult<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        _ => Err(CoreError::ParseError(format!("unknown weekday: {name}"))),
    }
}

#[must_use]
pub const fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[must_use]
pub fn format_wall_clock(time: NaiveTime) -> String {
    time.format(WALL_CLOCK_FORMAT).to_string()
}
