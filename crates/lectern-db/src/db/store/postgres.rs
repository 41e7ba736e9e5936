//! `PostgreSQL`-backed occurrence store.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::{OccurrenceStore, SeriesFilter};
use crate::db::DbProvider;
use crate::db::query::occurrence;
use crate::db::schema::class_occurrence;
use crate::error::{DbError, DbResult};
use crate::model::occurrence::{ClassOccurrence, NewClassOccurrence};

/// Occurrence store running against the `class_occurrence` table.
pub struct PgOccurrenceStore<P: DbProvider> {
    provider: P,
}

impl<P: DbProvider> PgOccurrenceStore<P> {
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: DbProvider> OccurrenceStore for PgOccurrenceStore<P> {
    #[tracing::instrument(skip(self))]
    async fn find_on_date(&self, date: NaiveDate) -> DbResult<Vec<ClassOccurrence>> {
        let mut conn = self.provider.get_connection().await?;
        let rows = occurrence::on_date(date)
            .select(ClassOccurrence::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(series_id = %filter.series_key))]
    async fn find_in_series(&self, filter: &SeriesFilter) -> DbResult<Vec<ClassOccurrence>> {
        let mut conn = self.provider.get_connection().await?;
        let rows = occurrence::in_series(filter)
            .select(ClassOccurrence::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClassOccurrence>> {
        let mut conn = self.provider.get_connection().await?;
        let row = occurrence::by_id(id)
            .select(ClassOccurrence::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    #[tracing::instrument(skip(self, new), fields(
        series_id = %new.series_key(),
        occurrence_date = %new.occurrence_date
    ))]
    async fn insert(&self, new: NewClassOccurrence) -> DbResult<ClassOccurrence> {
        let mut conn = self.provider.get_connection().await?;
        let result = diesel::insert_into(class_occurrence::table)
            .values(&new)
            .returning(ClassOccurrence::as_returning())
            .get_result(&mut conn)
            .await;

        result.map_err(|err| insert_error(err, new.series_key(), new.occurrence_date))
    }
}

/// A unique-index hit on insert means the occurrence already exists.
fn insert_error(err: DieselError, series_id: Uuid, date: NaiveDate) -> DbError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DbError::Duplicate { series_id, date }
        }
        other => other.into(),
    }
}
