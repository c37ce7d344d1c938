use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Open (and create if missing) the SQLite database holding users and
/// sessions, and apply the schema.
pub fn open_pool(path: &Path, max_size: u32) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .with_context(|| format!("Failed to create DB pool for {}", path.display()))?;

    init_schema(&pool)?;
    Ok(pool)
}

fn init_schema(pool: &DbPool) -> Result<()> {
    let conn = pool.get()?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            tier        TEXT NOT NULL DEFAULT 'free',
            active      INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            expires_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        "#,
    )
    .context("Failed to initialize database schema")?;
    Ok(())
}
