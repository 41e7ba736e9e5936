use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use lectern_core::config::DatabaseConfig;

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// How long a store call waits for a free connection.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// ## Summary
/// Creates the connection pool the schedule stores draw from.
///
/// ## Errors
/// Returns an error if the pool cannot be built for the configured URL.
#[tracing::instrument(skip(database), fields(pool_size = database.max_connections))]
pub async fn create_pool(database: &DatabaseConfig) -> anyhow::Result<DbPool> {
    tracing::debug!("Creating database connection pool");

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&database.url);
    let pool = Pool::builder()
        .max_size(u32::from(database.max_connections.max(1)))
        .min_idle(None)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .await?;

    tracing::info!(
        pool_size = database.max_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

impl DbProvider for DbPool {
    fn get_connection<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>>
    {
        Box::pin(async move { Ok(self.get().await?) })
    }
}
