//! Time source pinned to the institution's civil timezone.
//!
//! Every "today" and end-of-class computation goes through a [`Clock`] so the
//! schedule follows the local calendar regardless of the host's timezone.

use std::sync::Mutex;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Civil timezone all calendar arithmetic is done in.
    fn timezone(&self) -> Tz;

    /// Today's civil date in [`Clock::timezone`].
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.timezone()).date_naive()
    }

    /// ## Summary
    /// The instant a local wall-clock time on `date` occurs.
    ///
    /// Returns `None` only if the time cannot be placed even after shifting
    /// past a DST gap.
    fn local_instant(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        resolve_local(self.timezone(), date.and_time(time))
    }
}

/// ## Summary
/// Converts a local datetime in `tz` to UTC.
///
/// DST folds resolve to the earlier instant. Times inside a DST gap are
/// shifted forward by one hour.
#[must_use]
pub fn resolve_local(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _later) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => {
            let shifted = local + TimeDelta::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Wall clock of the host, interpreted in a configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Manually driven clock for tests and replay tooling.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    tz: Tz,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            now: Mutex::new(now),
            tz,
        }
    }

    /// ## Summary
    /// Clock reading the given local wall-clock time in `tz`.
    ///
    /// Returns `None` if that local time does not exist.
    #[must_use]
    pub fn at_local(tz: Tz, local: NaiveDateTime) -> Option<Self> {
        resolve_local(tz, local).map(|now| Self::new(now, tz))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut guard = self.lock();
        *guard += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.now.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}
