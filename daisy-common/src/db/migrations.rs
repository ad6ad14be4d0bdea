//! Database schema migrations
//!
//! Versioned, idempotent upgrades for databases created by older tooling.
//!
//! # Migration Guidelines
//!
//! 1. Never modify an existing migration; add a new one
//! 2. Each migration must be safe to re-run (check before altering)
//! 3. Prefer ALTER TABLE over DROP/CREATE to preserve data

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Migration v1: adopt the legacy biographies table
///
/// The standalone biography migration script created
/// `biographies(adm_no TEXT PRIMARY KEY, biography TEXT)`. Rename the key
/// column and add `updated_at` so those databases work unchanged.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Normalize legacy biographies table");

    if has_column(pool, "biographies", "adm_no").await?
        && !has_column(pool, "biographies", "admission_number").await?
    {
        sqlx::query("ALTER TABLE biographies RENAME COLUMN adm_no TO admission_number")
            .execute(pool)
            .await?;
        info!("  Renamed biographies.adm_no to admission_number");
    }

    if !has_column(pool, "biographies", "updated_at").await? {
        sqlx::query("ALTER TABLE biographies ADD COLUMN updated_at TEXT NOT NULL DEFAULT ''")
            .execute(pool)
            .await?;
        info!("  Added updated_at column to biographies");
    }

    Ok(())
}
