use chrono::Duration;
use thiserror::Error;

use quiz_core::model::AudioLocator;

/// Errors surfaced by playback adapters.
///
/// The quiz swallows these: a question with failed audio is still fully
/// playable and answerable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaybackError {
    #[error("player could not prepare {locator}: {reason}")]
    Prepare { locator: String, reason: String },

    #[error("player is unavailable: {0}")]
    Unavailable(String),
}

/// External audio player the engine commands but never owns.
///
/// `play` replaces whatever was playing before; readiness may arrive
/// arbitrarily late, which is why the engine gates the audible start behind
/// `QuizEngine::should_start_playback`. A player error reported after
/// `play` returned needs no engine notification: audio failures never
/// affect the question lifecycle, so hosts just log and move on.
pub trait PlaybackAdapter: Send + Sync {
    /// Begin (asynchronous) playback of the given locator.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if the player rejects the locator outright.
    fn play(&self, locator: &AudioLocator) -> Result<(), PlaybackError>;

    fn pause(&self);

    fn resume(&self);

    fn stop(&self);

    /// Current playback position, if the player knows it yet.
    fn position(&self) -> Option<Duration>;

    /// Total duration of the current track, if the player knows it yet.
    fn duration(&self) -> Option<Duration>;
}

/// Adapter that plays nothing. Useful for tests and audio-less hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlayback;

impl PlaybackAdapter for NullPlayback {
    fn play(&self, _locator: &AudioLocator) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn pause(&self) {}

    fn resume(&self) {}

    fn stop(&self) {}

    fn position(&self) -> Option<Duration> {
        None
    }

    fn duration(&self) -> Option<Duration> {
        None
    }
}
