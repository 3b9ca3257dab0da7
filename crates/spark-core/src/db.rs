use std::path::Path;

use sqlx::query::QueryAs;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, FromRow, Sqlite};

use crate::error::CoreError;

pub type DbPool = SqlitePool;

/// Opens (creating if needed) the SQLite database at `path` and applies any
/// pending migrations.
pub async fn establish_connection(path: impl AsRef<Path>) -> Result<DbPool, CoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::debug!(path = %path.display(), "database ready");

    Ok(pool)
}

/// Runs `query` until SQLite reports the statement done and returns its first
/// row.
///
/// `fetch_one` and `fetch_optional` stop stepping after one row. The statement
/// then keeps its implicit transaction open on the pooled connection: writes
/// stay invisible to other connections and reads pin an old snapshot.
pub(crate) async fn fetch_first<'q, 'c, T, E>(
    executor: E,
    query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
) -> Result<Option<T>, CoreError>
where
    T: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    E: Executor<'c, Database = Sqlite>,
{
    Ok(query.fetch_all(executor).await?.into_iter().next())
}

/// Like [`fetch_first`] for statements that always yield a row, such as
/// `INSERT ... RETURNING` or an aggregate.
pub(crate) async fn fetch_single<'q, 'c, T, E>(
    executor: E,
    query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
) -> Result<T, CoreError>
where
    T: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    E: Executor<'c, Database = Sqlite>,
{
    fetch_first(executor, query)
        .await?
        .ok_or(CoreError::Database(sqlx::Error::RowNotFound))
}
