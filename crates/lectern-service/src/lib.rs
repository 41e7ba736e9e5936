//! Recurring class-schedule engine.
//!
//! A periodic sweep ([`sweep::ScheduleSweeper`]) looks at today's
//! occurrences, and for every series whose class has ended asks the
//! [`materialize::OccurrenceMaterializer`] to create the next occurrence. The
//! next date comes from [`recurrence`]; the attributes carried forward come
//! from the [`lineage`] resolver, which skips one-off deviations and honours
//! permanent ones.

pub mod clock;
pub mod error;
pub mod lineage;
pub mod materialize;
pub mod recurrence;
pub mod sweep;
