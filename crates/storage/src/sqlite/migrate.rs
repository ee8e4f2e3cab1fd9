use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the saved-game and profile tables. Both are single-row tables
/// (id fixed at 1): the quiz holds one resumable session and one profile per
/// installation, and writes always replace the whole row.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS saved_game (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    question_order TEXT NOT NULL,
                    current_index INTEGER NOT NULL CHECK (current_index >= 0),
                    score INTEGER NOT NULL CHECK (score >= 0),
                    streak INTEGER NOT NULL CHECK (streak >= 0),
                    best_streak INTEGER NOT NULL CHECK (best_streak >= 0),
                    correct_count INTEGER NOT NULL CHECK (correct_count >= 0),
                    started_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS profile (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    player_name TEXT,
                    high_score INTEGER CHECK (high_score >= 0),
                    high_score_player TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
