use std::collections::HashMap;
use thiserror::Error;

use crate::model::ids::TrackId;
use crate::model::track::Track;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate track id in catalog: {0}")]
    DuplicateId(TrackId),
}

/// Immutable list of playable tracks, fetched once at startup.
///
/// The engine only reads from it; re-fetching produces a new catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongCatalog {
    tracks: Vec<Track>,
    index: HashMap<TrackId, usize>,
}

impl SongCatalog {
    /// Builds a catalog, rejecting duplicate track ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` when two tracks share an id.
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(tracks.len());
        for (pos, track) in tracks.iter().enumerate() {
            if index.insert(track.id(), pos).is_some() {
                return Err(CatalogError::DuplicateId(track.id()));
            }
        }
        Ok(Self { tracks, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.index.get(&id).map(|pos| &self.tracks[*pos])
    }

    #[must_use]
    pub fn contains(&self, id: TrackId) -> bool {
        self.index.contains_key(&id)
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::AudioLocator;

    fn track(id: u64) -> Track {
        Track::new(
            TrackId::new(id),
            format!("Track {id}"),
            AudioLocator::new(format!("http://localhost:8080/songs/{id}.mp3")).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn indexes_tracks_by_id() {
        let catalog = SongCatalog::new(vec![track(1), track(2), track(3)]).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(TrackId::new(2)).unwrap().title(), "Track 2");
        assert!(catalog.get(TrackId::new(9)).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = SongCatalog::new(vec![track(1), track(1)]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId(TrackId::new(1)));
    }

    #[test]
    fn empty_catalog_is_empty() {
        let catalog = SongCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
    }
}
