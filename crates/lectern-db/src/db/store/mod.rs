//! Storage seam for class occurrences.
//!
//! The schedule service only needs find-many (by day, by series), find-one
//! and insert-one; everything else about the collection belongs to the
//! surrounding application.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DbResult;
use crate::model::occurrence::{ClassOccurrence, NewClassOccurrence};

pub mod memory;
pub mod postgres;

pub use memory::MemoryOccurrenceStore;
pub use postgres::PgOccurrenceStore;

/// Selects occurrences of one series for one participant set and subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFilter {
    /// Matched against both `series_id` and `id`.
    pub series_key: Uuid,
    pub participant_key: String,
    pub subject_id: Uuid,
    /// Inclusive lower bound on `occurrence_date`.
    pub from: NaiveDate,
    /// Inclusive upper bound on `occurrence_date`.
    pub to: NaiveDate,
}

impl SeriesFilter {
    /// ## Summary
    /// Filter for the series, participants and subject of `occurrence`,
    /// bounded to `from..=to`.
    #[must_use]
    pub fn for_occurrence(occurrence: &ClassOccurrence, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            series_key: occurrence.series_key(),
            participant_key: occurrence.participant_key.clone(),
            subject_id: occurrence.subject_id,
            from,
            to,
        }
    }

    /// Same filter narrowed to a single civil date.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.from = date;
        self.to = date;
        self
    }

    #[must_use]
    pub fn matches(&self, occurrence: &ClassOccurrence) -> bool {
        (occurrence.series_id == Some(self.series_key) || occurrence.id == self.series_key)
            && occurrence.participant_key == self.participant_key
            && occurrence.subject_id == self.subject_id
            && occurrence.occurrence_date >= self.from
            && occurrence.occurrence_date <= self.to
    }
}

#[async_trait]
pub trait OccurrenceStore: Send + Sync {
    /// ## Summary
    /// Loads every occurrence on `date`, ordered by `start_time` ascending.
    ///
    /// ## Errors
    /// Returns a database error if the query fails.
    async fn find_on_date(&self, date: NaiveDate) -> DbResult<Vec<ClassOccurrence>>;

    /// ## Summary
    /// Loads the series members matching `filter`, ordered by
    /// `occurrence_date` then `updated_at`, both descending.
    ///
    /// ## Errors
    /// Returns a database error if the query fails.
    async fn find_in_series(&self, filter: &SeriesFilter) -> DbResult<Vec<ClassOccurrence>>;

    /// ## Summary
    /// Loads one occurrence by id.
    ///
    /// ## Errors
    /// Returns a database error if the query fails.
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClassOccurrence>>;

    /// ## Summary
    /// Inserts a new occurrence and returns the stored row.
    ///
    /// ## Errors
    /// Returns `DbError::Duplicate` if the series already has an occurrence on
    /// that date for the same participants and subject, or a database error
    /// if the insert fails.
    async fn insert(&self, occurrence: NewClassOccurrence) -> DbResult<ClassOccurrence>;
}
