use std::sync::Arc;

use tracing::info;

use quiz_core::model::GameSummary;
use storage::repository::{HighScoreRecord, ProfileRepository};

use crate::error::SessionError;

/// What recording a finished game established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResult {
    pub new_high_score: bool,
    /// The standing high score after recording, if any game has scored.
    pub best: Option<HighScoreRecord>,
}

/// Results collaborator: high-score bookkeeping for finished games.
///
/// Display formatting stays with the host; this service only owns the
/// persistence rules around the profile.
#[derive(Clone)]
pub struct ResultsService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ResultsService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Remember the player name for the next launch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn remember_player(&self, name: &str) -> Result<(), SessionError> {
        self.profiles.set_player_name(name).await?;
        Ok(())
    }

    /// Last player name entered, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn last_player(&self) -> Result<Option<String>, SessionError> {
        Ok(self.profiles.player_name().await?)
    }

    /// Current high score, if any game has finished.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn high_score(&self) -> Result<Option<HighScoreRecord>, SessionError> {
        Ok(self.profiles.high_score().await?)
    }

    /// Record a finished game: the high score is overwritten only when the
    /// new score strictly beats it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn record_game(
        &self,
        player: &str,
        summary: &GameSummary,
    ) -> Result<RecordedResult, SessionError> {
        let standing = self.profiles.high_score().await?;
        let to_beat = standing.as_ref().map_or(0, |record| record.score);

        if summary.score() > to_beat {
            let record = HighScoreRecord {
                player: player.to_string(),
                score: summary.score(),
            };
            self.profiles.set_high_score(&record).await?;
            info!(player, score = record.score, "new high score");
            return Ok(RecordedResult {
                new_high_score: true,
                best: Some(record),
            });
        }

        Ok(RecordedResult {
            new_high_score: false,
            best: standing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn summary(score: u32) -> GameSummary {
        GameSummary::new(score, 10, 5, 3, 60).unwrap()
    }

    #[tokio::test]
    async fn first_positive_score_becomes_the_high_score() {
        let results = ResultsService::new(Arc::new(InMemoryRepository::new()));
        let recorded = results.record_game("Ada", &summary(4_200)).await.unwrap();
        assert!(recorded.new_high_score);
        assert_eq!(
            recorded.best,
            Some(HighScoreRecord {
                player: "Ada".into(),
                score: 4_200
            })
        );
    }

    #[tokio::test]
    async fn zero_score_is_never_a_record() {
        let results = ResultsService::new(Arc::new(InMemoryRepository::new()));
        let recorded = results
            .record_game("Ada", &GameSummary::new(0, 10, 0, 0, 60).unwrap())
            .await
            .unwrap();
        assert!(!recorded.new_high_score);
        assert_eq!(recorded.best, None);
    }

    #[tokio::test]
    async fn equal_score_keeps_the_old_record() {
        let repo = Arc::new(InMemoryRepository::new());
        let results = ResultsService::new(repo);
        results.record_game("Ada", &summary(4_200)).await.unwrap();

        let recorded = results.record_game("Bela", &summary(4_200)).await.unwrap();
        assert!(!recorded.new_high_score);
        assert_eq!(recorded.best.unwrap().player, "Ada");

        let recorded = results.record_game("Bela", &summary(4_300)).await.unwrap();
        assert!(recorded.new_high_score);
        assert_eq!(recorded.best.unwrap().player, "Bela");
    }

    #[tokio::test]
    async fn player_name_round_trips() {
        let results = ResultsService::new(Arc::new(InMemoryRepository::new()));
        assert!(results.last_player().await.unwrap().is_none());
        results.remember_player("Grace").await.unwrap();
        assert_eq!(results.last_player().await.unwrap().as_deref(), Some("Grace"));
    }
}
