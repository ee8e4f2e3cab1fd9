use thiserror::Error;
use url::Url;

use crate::model::ids::TrackId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackError {
    #[error("track title cannot be empty")]
    EmptyTitle,

    #[error("audio locator cannot be empty")]
    EmptyLocator,
}

/// Opaque reference to the playable audio for a track.
///
/// The engine never interprets the locator; it is handed to the playback
/// adapter verbatim. `as_url` is a convenience for hosts whose player wants
/// an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioLocator(String);

impl AudioLocator {
    /// Creates a locator from a raw string.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::EmptyLocator` if the string is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, TrackError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TrackError::EmptyLocator);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the locator as an absolute URL, if it is one.
    #[must_use]
    pub fn as_url(&self) -> Option<Url> {
        Url::parse(&self.0).ok()
    }
}

/// A playable track from the song catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    id: TrackId,
    title: String,
    audio_locator: AudioLocator,
}

impl Track {
    /// Creates a track with a validated title and locator.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::EmptyTitle` if the title is blank.
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        audio_locator: AudioLocator,
    ) -> Result<Self, TrackError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TrackError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            audio_locator,
        })
    }

    #[must_use]
    pub fn id(&self) -> TrackId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn audio_locator(&self) -> &AudioLocator {
        &self.audio_locator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> AudioLocator {
        AudioLocator::new("http://localhost:8080/songs/1.mp3").unwrap()
    }

    #[test]
    fn rejects_empty_title() {
        let err = Track::new(TrackId::new(1), "   ", locator()).unwrap_err();
        assert_eq!(err, TrackError::EmptyTitle);
    }

    #[test]
    fn rejects_empty_locator() {
        let err = AudioLocator::new("").unwrap_err();
        assert_eq!(err, TrackError::EmptyLocator);
    }

    #[test]
    fn locator_parses_absolute_url() {
        let loc = locator();
        let url = loc.as_url().unwrap();
        assert_eq!(url.path(), "/songs/1.mp3");
    }

    #[test]
    fn opaque_locator_is_kept_verbatim() {
        let loc = AudioLocator::new("asset://bundled/intro").unwrap();
        assert_eq!(loc.as_str(), "asset://bundled/intro");
    }
}
