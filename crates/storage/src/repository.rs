use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::model::{SessionState, SessionStateError, TrackId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of an in-progress game.
///
/// This mirrors the domain `SessionState` so repositories can
/// serialize/deserialize without leaking storage concerns into the domain
/// layer. The presence of a record is the has-saved-game flag; writes are
/// whole-record, last-write-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGameRecord {
    pub question_order: Vec<TrackId>,
    pub current_index: u32,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub correct_count: u32,
    pub started_at: DateTime<Utc>,
}

impl SavedGameRecord {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            question_order: state.question_order().to_vec(),
            current_index: u32::try_from(state.current_index()).unwrap_or(u32::MAX),
            score: state.score(),
            streak: state.streak(),
            best_streak: state.best_streak(),
            correct_count: state.correct_count(),
            started_at: state.started_at(),
        }
    }

    /// Convert the record back into domain state, re-validating invariants.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if the stored fields are incoherent.
    pub fn into_state(self) -> Result<SessionState, SessionStateError> {
        SessionState::from_persisted(
            self.question_order,
            self.current_index as usize,
            self.score,
            self.streak,
            self.best_streak,
            self.correct_count,
            self.started_at,
        )
    }
}

/// Best score seen so far, with the player who set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub player: String,
    pub score: u32,
}

/// Repository contract for the resumable saved game.
#[async_trait]
pub trait SavedGameRepository: Send + Sync {
    /// Fetch the saved game, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures; a missing save is `Ok(None)`.
    async fn load_saved_game(&self) -> Result<Option<SavedGameRecord>, StorageError>;

    /// Persist the whole record, replacing any previous save.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_game(&self, record: &SavedGameRecord) -> Result<(), StorageError>;

    /// Drop the saved game (normal completion or explicit new game).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures. Clearing an absent save
    /// is not an error.
    async fn clear_saved_game(&self) -> Result<(), StorageError>;
}

/// Repository contract for the player profile and high score.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Last player name entered, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn player_name(&self) -> Result<Option<String>, StorageError>;

    /// Remember the player name for the next launch.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the name cannot be stored.
    async fn set_player_name(&self, name: &str) -> Result<(), StorageError>;

    /// Current high score, if any game has finished.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn high_score(&self) -> Result<Option<HighScoreRecord>, StorageError>;

    /// Overwrite the high score. Callers decide whether the new score beats
    /// the old one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn set_high_score(&self, record: &HighScoreRecord) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct ProfileState {
    player_name: Option<String>,
    high_score: Option<HighScoreRecord>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    saved_game: Arc<Mutex<Option<SavedGameRecord>>>,
    profile: Arc<Mutex<ProfileState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavedGameRepository for InMemoryRepository {
    async fn load_saved_game(&self) -> Result<Option<SavedGameRecord>, StorageError> {
        let guard = self
            .saved_game
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_game(&self, record: &SavedGameRecord) -> Result<(), StorageError> {
        let mut guard = self
            .saved_game
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    async fn clear_saved_game(&self) -> Result<(), StorageError> {
        let mut guard = self
            .saved_game
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn player_name(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.player_name.clone())
    }

    async fn set_player_name(&self, name: &str) -> Result<(), StorageError> {
        let mut guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.player_name = Some(name.to_string());
        Ok(())
    }

    async fn high_score(&self) -> Result<Option<HighScoreRecord>, StorageError> {
        let guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.high_score.clone())
    }

    async fn set_high_score(&self, record: &HighScoreRecord) -> Result<(), StorageError> {
        let mut guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.high_score = Some(record.clone());
        Ok(())
    }
}

/// Aggregates the quiz repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub saved_games: Arc<dyn SavedGameRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let saved_games: Arc<dyn SavedGameRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo);
        Self {
            saved_games,
            profiles,
        }
    }
}
