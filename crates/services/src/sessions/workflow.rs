use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use quiz_core::model::{AnswerOutcome, QuizRules, SongCatalog};
use storage::repository::{SavedGameRecord, SavedGameRepository};

use crate::Clock;
use crate::error::SessionError;
use crate::playback::PlaybackAdapter;

use super::engine::{LoadOutcome, QuizEngine, TickEvent};

/// Orchestrates the session state machine against its collaborators:
/// persistence after every mutation, playback commands around question
/// loads, saved-state cleanup on completion.
///
/// The engine itself stays pure; this is the only place quiz state meets
/// I/O.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    rules: QuizRules,
    catalog: Arc<SongCatalog>,
    saved_games: Arc<dyn SavedGameRepository>,
    playback: Arc<dyn PlaybackAdapter>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<SongCatalog>,
        saved_games: Arc<dyn SavedGameRepository>,
        playback: Arc<dyn PlaybackAdapter>,
    ) -> Self {
        Self {
            clock,
            rules: QuizRules::default(),
            catalog,
            saved_games,
            playback,
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: QuizRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn rules(&self) -> &QuizRules {
        &self.rules
    }

    /// Start a fresh game and persist its initial state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for an empty catalog or persistence failures.
    pub async fn new_game(&self) -> Result<QuizEngine, SessionError> {
        let engine = QuizEngine::start(
            Arc::clone(&self.catalog),
            self.rules.clone(),
            self.clock.now(),
        )?;
        self.persist(&engine).await?;
        info!(
            questions = engine.state().total_questions(),
            "started a new game"
        );
        Ok(engine)
    }

    /// Restore the saved game, falling back to a new game when the save is
    /// absent, unreadable, or stale.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if even the fallback new game cannot start.
    pub async fn resume_or_new(&self) -> Result<QuizEngine, SessionError> {
        let record = match self.saved_games.load_saved_game().await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "could not read saved game, starting a new one");
                None
            }
        };

        if let Some(record) = record {
            match restore(Arc::clone(&self.catalog), self.rules.clone(), record) {
                Ok(engine) => {
                    info!(
                        question = engine.state().current_index() + 1,
                        score = engine.state().score(),
                        "resumed saved game"
                    );
                    return Ok(engine);
                }
                Err(err) => {
                    warn!(error = %err, "saved game is stale, starting a new one");
                }
            }
        }

        self.new_game().await
    }

    /// Load the next question (commanding playback) or finish the session
    /// (clearing the save).
    ///
    /// Playback failures are swallowed: a question with failed audio is
    /// still fully playable.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for engine phase misuse or persistence
    /// failures.
    pub async fn begin_question(
        &self,
        engine: &mut QuizEngine,
    ) -> Result<LoadOutcome, SessionError> {
        let outcome = engine.load_question(self.clock.now())?;
        match &outcome {
            LoadOutcome::Question(view) => {
                if let Err(err) = self.playback.play(&view.audio) {
                    warn!(error = %err, "audio failed to start, question continues without it");
                }
            }
            LoadOutcome::Finished(summary) => {
                self.playback.stop();
                self.saved_games.clear_saved_game().await?;
                info!(score = summary.score(), "game finished, save cleared");
            }
        }
        Ok(outcome)
    }

    /// Resolve the current question with the player's tap and persist.
    ///
    /// A rejected tap (already answered, paused, out of range) returns
    /// `Ok(None)` and persists nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the updated state cannot be saved.
    pub async fn answer(
        &self,
        engine: &mut QuizEngine,
        option_index: usize,
    ) -> Result<Option<AnswerOutcome>, SessionError> {
        let outcome = engine.submit_answer(option_index, self.clock.now());
        if outcome.is_some() {
            self.persist(engine).await?;
        }
        Ok(outcome)
    }

    /// Pump time into the engine; a timeout resolution is persisted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the updated state cannot be saved.
    pub async fn tick(&self, engine: &mut QuizEngine) -> Result<Option<TickEvent>, SessionError> {
        let event = engine.tick(self.clock.now());
        if matches!(event, Some(TickEvent::Expired(_))) {
            self.persist(engine).await?;
        }
        Ok(event)
    }

    /// Move past the reveal once the host's reveal delay has elapsed.
    /// Returns whether the engine moved (a stale epoch does not).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the advanced state cannot be saved.
    pub async fn advance(
        &self,
        engine: &mut QuizEngine,
        epoch: u64,
    ) -> Result<bool, SessionError> {
        if !engine.advance(epoch) {
            debug!(epoch, "ignored stale advance");
            return Ok(false);
        }
        self.persist(engine).await?;
        Ok(true)
    }

    /// Freeze the countdown and the player. Idempotent.
    pub fn pause(&self, engine: &mut QuizEngine) {
        if engine.pause(self.clock.now()) {
            self.playback.pause();
        }
    }

    /// Restart the countdown and the player from their frozen positions.
    /// Idempotent.
    pub fn resume(&self, engine: &mut QuizEngine) {
        if engine.resume_play(self.clock.now()) {
            self.playback.resume();
        }
    }

    /// Persist progress and go quiet without clearing the save, so the game
    /// can be resumed later.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the state cannot be saved.
    pub async fn stop(&self, engine: &mut QuizEngine) -> Result<(), SessionError> {
        engine.stop(self.clock.now());
        self.playback.stop();
        self.persist(engine).await
    }

    /// Player position and track duration for a host progress bar, once the
    /// player knows them.
    #[must_use]
    pub fn playback_progress(&self) -> Option<(Duration, Duration)> {
        let position = self.playback.position()?;
        let duration = self.playback.duration()?;
        Some((position, duration))
    }

    async fn persist(&self, engine: &QuizEngine) -> Result<(), SessionError> {
        let record = SavedGameRecord::from_state(engine.state());
        self.saved_games.save_game(&record).await?;
        Ok(())
    }
}

fn restore(
    catalog: Arc<SongCatalog>,
    rules: QuizRules,
    record: SavedGameRecord,
) -> Result<QuizEngine, SessionError> {
    let state = record.into_state()?;
    QuizEngine::resume(catalog, rules, state)
}
