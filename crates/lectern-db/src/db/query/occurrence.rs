//! Query composition for `class_occurrence` table operations.

use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::schema::class_occurrence;
use crate::db::store::SeriesFilter;

/// Returns a query for all occurrences (unfiltered).
#[must_use]
pub fn all() -> class_occurrence::BoxedQuery<'static, diesel::pg::Pg> {
    class_occurrence::table.into_boxed()
}

/// Returns a query for a single occurrence by primary key.
#[must_use]
pub fn by_id(id: Uuid) -> class_occurrence::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(class_occurrence::id.eq(id))
}

/// Returns a query for occurrences on one civil date, earliest start first.
#[must_use]
pub fn on_date(date: NaiveDate) -> class_occurrence::BoxedQuery<'static, diesel::pg::Pg> {
    all()
        .filter(class_occurrence::occurrence_date.eq(date))
        .order((
            class_occurrence::start_time.asc(),
            class_occurrence::id.asc(),
        ))
}

/// Returns a query for the members of a series.
///
/// A row belongs to the series if it back-references the series key or *is*
/// the series root. Results are restricted to the filter's participant set,
/// subject and inclusive date range, newest first.
#[must_use]
pub fn in_series(filter: &SeriesFilter) -> class_occurrence::BoxedQuery<'static, diesel::pg::Pg> {
    all()
        .filter(
            class_occurrence::series_id
                .eq(filter.series_key)
                .or(class_occurrence::id.eq(filter.series_key)),
        )
        .filter(class_occurrence::participant_key.eq(filter.participant_key.clone()))
        .filter(class_occurrence::subject_id.eq(filter.subject_id))
        .filter(class_occurrence::occurrence_date.between(filter.from, filter.to))
        .order((
            class_occurrence::occurrence_date.desc(),
            class_occurrence::updated_at.desc(),
        ))
}
