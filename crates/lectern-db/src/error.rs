use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Duplicate occurrence: series={series_id}, date={date}")]
    Duplicate {
        series_id: uuid::Uuid,
        date: chrono::NaiveDate,
    },

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    CoreError(#[from] lectern_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
