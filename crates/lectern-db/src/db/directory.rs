//! Live display-name lookups for teachers, students and subjects.
//!
//! Occurrences carry denormalized names next to their ids. These lookups let
//! the materializer refresh them instead of copying a possibly stale name
//! forward through a long series.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::DbProvider;
use crate::db::schema::{app_user, subject};
use crate::error::DbResult;
use crate::model::reference::{AppUser, Subject};

#[async_trait]
pub trait NameDirectory: Send + Sync {
    /// ## Summary
    /// Looks up display names for users (teachers and students alike).
    ///
    /// Unknown ids are simply absent from the returned map.
    ///
    /// ## Errors
    /// Returns a database error if the lookup fails.
    async fn user_names(&self, ids: &[Uuid]) -> DbResult<HashMap<Uuid, String>>;

    /// ## Summary
    /// Looks up a subject record.
    ///
    /// ## Errors
    /// Returns a database error if the lookup fails.
    async fn subject(&self, id: Uuid) -> DbResult<Option<Subject>>;
}

pub struct PgNameDirectory<P: DbProvider> {
    provider: P,
}

impl<P: DbProvider> PgNameDirectory<P> {
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: DbProvider> NameDirectory for PgNameDirectory<P> {
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    async fn user_names(&self, ids: &[Uuid]) -> DbResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.provider.get_connection().await?;
        let users = app_user::table
            .filter(app_user::id.eq_any(ids.to_vec()))
            .select(AppUser::as_select())
            .load(&mut conn)
            .await?;
        Ok(users.into_iter().map(|user| (user.id, user.name)).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn subject(&self, id: Uuid) -> DbResult<Option<Subject>> {
        let mut conn = self.provider.get_connection().await?;
        let row = subject::table
            .filter(subject::id.eq(id))
            .select(Subject::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }
}

/// Directory backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryNameDirectory {
    users: RwLock<HashMap<Uuid, String>>,
    subjects: RwLock<HashMap<Uuid, Subject>>,
}

impl MemoryNameDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_user(&self, id: Uuid, name: impl Into<String>) {
        self.users.write().await.insert(id, name.into());
    }

    pub async fn put_subject(&self, subject: Subject) {
        self.subjects.write().await.insert(subject.id, subject);
    }
}

#[async_trait]
impl NameDirectory for MemoryNameDirectory {
    async fn user_names(&self, ids: &[Uuid]) -> DbResult<HashMap<Uuid, String>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(|name| (*id, name.clone())))
            .collect())
    }

    async fn subject(&self, id: Uuid) -> DbResult<Option<Subject>> {
        Ok(self.subjects.read().await.get(&id).cloned())
    }
}
