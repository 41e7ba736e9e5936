use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] lectern_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] lectern_core::error::CoreError),

    #[error("Sweep task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
