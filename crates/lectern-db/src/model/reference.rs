//! Read-only views of the user and subject records owned by the surrounding application.

use diesel::{pg::Pg, prelude::*};
use uuid::Uuid;

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::app_user)]
#[diesel(check_for_backend(Pg))]
pub struct AppUser {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::subject)]
#[diesel(check_for_backend(Pg))]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub subject_type: Option<String>,
}
