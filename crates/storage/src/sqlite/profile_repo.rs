use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{HighScoreRecord, ProfileRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{ser, u32_from_i64};

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn player_name(&self) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT player_name FROM profile WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        row.try_get("player_name").map_err(ser)
    }

    async fn set_player_name(&self, name: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profile (id, player_name)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                player_name = excluded.player_name
            ",
        )
        .bind(1_i64)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }

    async fn high_score(&self) -> Result<Option<HighScoreRecord>, StorageError> {
        let row = sqlx::query("SELECT high_score, high_score_player FROM profile WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let score: Option<i64> = row.try_get("high_score").map_err(ser)?;
        let player: Option<String> = row.try_get("high_score_player").map_err(ser)?;
        match (score, player) {
            (Some(score), Some(player)) => Ok(Some(HighScoreRecord {
                player,
                score: u32_from_i64("high_score", score)?,
            })),
            _ => Ok(None),
        }
    }

    async fn set_high_score(&self, record: &HighScoreRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profile (id, high_score, high_score_player)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                high_score = excluded.high_score,
                high_score_player = excluded.high_score_player
            ",
        )
        .bind(1_i64)
        .bind(i64::from(record.score))
        .bind(record.player.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
