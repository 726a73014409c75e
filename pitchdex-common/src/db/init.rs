//! Database initialization
//!
//! Creates the database file and schema on first run. Every statement is
//! idempotent, so opening an existing database runs the same path.

use std::path::Path;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::Result;

/// Schema version written to `schema_version` on first run
pub const SCHEMA_VERSION: i64 = 1;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY,
            permalink TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL,
            imported_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            name TEXT PRIMARY KEY
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS authorship (
            review_id INTEGER PRIMARY KEY REFERENCES reviews(id) ON DELETE CASCADE,
            author_name TEXT NOT NULL REFERENCES authors(name)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS review_scores (
            review_id INTEGER NOT NULL REFERENCES reviews(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            score INTEGER NOT NULL,
            PRIMARY KEY (review_id, name)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS author_scores (
            author_name TEXT NOT NULL,
            name TEXT NOT NULL,
            score INTEGER NOT NULL,
            PRIMARY KEY (author_name, name)
        )
        "#,
        "CREATE INDEX IF NOT EXISTS authorship_author ON authorship (author_name)",
        "CREATE INDEX IF NOT EXISTS review_score_name ON review_scores (name)",
        "CREATE INDEX IF NOT EXISTS review_score_nsc ON review_scores (name, score)",
        "CREATE INDEX IF NOT EXISTS author_score_name ON author_scores (name)",
        "CREATE INDEX IF NOT EXISTS author_score_nsc ON author_scores (name, score)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}
