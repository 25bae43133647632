use async_trait::async_trait;
use jiff::Timestamp;
use linkhop_core::repository::{ReadRepository, Repository, Result, VisitRepository};
use linkhop_core::{ShortCode, ShortUrlMapping, StorageError, Visit};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;

/// Postgres implementation of the repository contract.
///
/// Works against the `short_urls` and `visits` tables in `ddl/postgres`.
/// Code uniqueness is enforced by the `short_code` unique constraint, which
/// surfaces as [`StorageError::Conflict`] on insert.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing Postgres connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new pool of up to `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        debug!(max_connections, "opened Postgres pool");
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn mapping_from_row(row: &PgRow) -> Result<ShortUrlMapping> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(ShortUrlMapping {
        id,
        code: ShortCode::new_unchecked(code),
        original_url,
        created_at: parse_created_at(created_at)?,
    })
}

#[async_trait]
impl ReadRepository for PostgresRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortUrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT id, short_code, original_url,
                   EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at
            FROM short_urls
            WHERE short_code = $1
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<ShortUrlMapping> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (original_url, short_code)
            VALUES ($1, $2)
            RETURNING id, short_code, original_url,
                      EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at
            "#,
        )
        .bind(original_url)
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => mapping_from_row(&row),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}

#[async_trait]
impl VisitRepository for PostgresRepository {
    async fn record_visit(&self, visit: &Visit) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO visits (short_url_id, ip_address, user_agent)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(visit.mapping_id)
        .bind(visit.client_ip.as_str())
        .bind(visit.user_agent.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
