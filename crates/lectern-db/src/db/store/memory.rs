//! In-process occurrence store.
//!
//! Mirrors the ordering and uniqueness rules of the `PostgreSQL` store so the
//! schedule engine can run without a database (tests, dry runs).

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OccurrenceStore, SeriesFilter};
use crate::error::{DbError, DbResult};
use crate::model::occurrence::{ClassOccurrence, NewClassOccurrence};

#[derive(Debug, Default)]
pub struct MemoryOccurrenceStore {
    rows: RwLock<Vec<ClassOccurrence>>,
    fail_writes: AtomicBool,
}

impl MemoryOccurrenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds existing rows as-is, bypassing the uniqueness check.
    pub async fn seed(&self, rows: impl IntoIterator<Item = ClassOccurrence>) {
        self.rows.write().await.extend(rows);
    }

    /// Returns a copy of every stored row in insertion order.
    pub async fn snapshot(&self) -> Vec<ClassOccurrence> {
        self.rows.read().await.clone()
    }

    /// Makes subsequent inserts fail with `DbError::Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OccurrenceStore for MemoryOccurrenceStore {
    async fn find_on_date(&self, date: NaiveDate) -> DbResult<Vec<ClassOccurrence>> {
        let mut rows: Vec<ClassOccurrence> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| row.occurrence_date == date)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.start_time, row.id));
        Ok(rows)
    }

    async fn find_in_series(&self, filter: &SeriesFilter) -> DbResult<Vec<ClassOccurrence>> {
        let mut rows: Vec<ClassOccurrence> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.occurrence_date
                .cmp(&a.occurrence_date)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClassOccurrence>> {
        Ok(self.rows.read().await.iter().find(|row| row.id == id).cloned())
    }

    async fn insert(&self, new: NewClassOccurrence) -> DbResult<ClassOccurrence> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("writes disabled".to_string()));
        }

        let mut rows = self.rows.write().await;
        let clash = rows.iter().any(|row| {
            row.series_key() == new.series_key()
                && row.occurrence_date == new.occurrence_date
                && row.participant_key == new.participant_key
                && row.subject_id == new.subject_id
        });
        if clash {
            return Err(DbError::Duplicate {
                series_id: new.series_key(),
                date: new.occurrence_date,
            });
        }

        let stored = new.into_stored(Utc::now());
        rows.push(stored.clone());
        Ok(stored)
    }
}
