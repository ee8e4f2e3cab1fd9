use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{SavedGameRecord, SavedGameRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{join_track_ids, ser, split_track_ids, u32_from_i64};

#[async_trait]
impl SavedGameRepository for SqliteRepository {
    async fn load_saved_game(&self) -> Result<Option<SavedGameRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                question_order,
                current_index,
                score,
                streak,
                best_streak,
                correct_count,
                started_at
            FROM saved_game
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_order: String = row.try_get("question_order").map_err(ser)?;
        let question_order = split_track_ids(&raw_order)?;
        let current_index =
            u32_from_i64("current_index", row.try_get("current_index").map_err(ser)?)?;
        let score = u32_from_i64("score", row.try_get("score").map_err(ser)?)?;
        let streak = u32_from_i64("streak", row.try_get("streak").map_err(ser)?)?;
        let best_streak = u32_from_i64("best_streak", row.try_get("best_streak").map_err(ser)?)?;
        let correct_count =
            u32_from_i64("correct_count", row.try_get("correct_count").map_err(ser)?)?;
        let started_at: chrono::DateTime<chrono::Utc> =
            row.try_get("started_at").map_err(ser)?;

        Ok(Some(SavedGameRecord {
            question_order,
            current_index,
            score,
            streak,
            best_streak,
            correct_count,
            started_at,
        }))
    }

    async fn save_game(&self, record: &SavedGameRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO saved_game (
                id,
                question_order,
                current_index,
                score,
                streak,
                best_streak,
                correct_count,
                started_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                question_order = excluded.question_order,
                current_index = excluded.current_index,
                score = excluded.score,
                streak = excluded.streak,
                best_streak = excluded.best_streak,
                correct_count = excluded.correct_count,
                started_at = excluded.started_at
            ",
        )
        .bind(1_i64)
        .bind(join_track_ids(&record.question_order))
        .bind(i64::from(record.current_index))
        .bind(i64::from(record.score))
        .bind(i64::from(record.streak))
        .bind(i64::from(record.best_streak))
        .bind(i64::from(record.correct_count))
        .bind(record.started_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_saved_game(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM saved_game WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
