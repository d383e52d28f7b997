//! Schema setup for the league database.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info};

/// Bumped whenever `schema.sql` changes shape.
pub const SCHEMA_VERSION: i64 = 1;

const IN_MEMORY: &str = ":memory:";

/// Open (creating if needed) the league database and apply the schema.
///
/// `":memory:"` opens a private in-memory database on a single connection.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = db_path == IN_MEMORY;
    let url = if in_memory {
        "sqlite::memory:".to_string()
    } else {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }
        format!("sqlite:{}?mode=rwc", db_path)
    };

    // Every in-memory connection is a separate database.
    let max_connections = if in_memory { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .after_connect(move |conn, _meta| {
            Box::pin(async move { apply_pragmas(conn, in_memory).await })
        })
        .connect(&url)
        .await?;

    apply_schema(&pool).await?;

    info!(path = db_path, version = SCHEMA_VERSION, "League database ready");
    Ok(pool)
}

/// Apply `schema.sql`. Every statement is `IF NOT EXISTS`, so reruns are no-ops.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = include_str!("schema.sql")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut applied = 0usize;
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
        applied += 1;
    }

    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(pool)
        .await?;

    debug!(statements = applied, "Schema applied");
    Ok(())
}

async fn apply_pragmas(conn: &mut SqliteConnection, in_memory: bool) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;

    if !in_memory {
        // Returns the mode actually in effect.
        let (journal_mode,): (String,) = sqlx::query_as("PRAGMA journal_mode = WAL")
            .fetch_one(&mut *conn)
            .await?;
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&mut *conn)
            .await?;
        debug!(journal_mode = %journal_mode, "SQLite pragmas configured");
    }
    Ok(())
}
