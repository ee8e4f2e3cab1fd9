use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use quiz_core::model::{AudioLocator, SongCatalog, Track, TrackId};

use crate::error::CatalogFetchError;

/// Fetches the song catalog from the backing catalog server.
///
/// The catalog is read once per launch; retrying a failed fetch is the
/// caller's policy, this service just performs one request.
#[derive(Clone)]
pub struct CatalogService {
    client: Client,
    base_url: String,
}

impl CatalogService {
    /// Creates a service against the given server base URL.
    ///
    /// # Errors
    ///
    /// Returns `CatalogFetchError::InvalidBaseUrl` for a blank URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogFetchError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(CatalogFetchError::InvalidBaseUrl);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Fetch all playable tracks.
    ///
    /// Wire entries missing an id, title, or file are skipped rather than
    /// failing the whole catalog; an all-skipped response is
    /// `CatalogFetchError::EmptyResponse`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogFetchError` for transport, decode, or empty-catalog
    /// failures.
    pub async fn fetch_catalog(&self) -> Result<SongCatalog, CatalogFetchError> {
        let url = format!("{}/songs", self.base_url.trim_end_matches('/'));
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogFetchError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        let songs: Vec<SongDto> = serde_json::from_str(&body)?;

        let mut tracks = Vec::with_capacity(songs.len());
        for song in songs {
            let (Some(id), Some(name), Some(file)) = (song.id, song.name, song.file) else {
                debug!("skipping catalog entry with missing fields");
                continue;
            };
            let Ok(locator) = AudioLocator::new(file) else {
                debug!(id, "skipping catalog entry with blank audio file");
                continue;
            };
            match Track::new(TrackId::new(id), name, locator) {
                Ok(track) => tracks.push(track),
                Err(err) => debug!(id, error = %err, "skipping invalid catalog entry"),
            }
        }

        if tracks.is_empty() {
            return Err(CatalogFetchError::EmptyResponse);
        }

        Ok(SongCatalog::new(tracks)?)
    }
}

/// Wire shape of the catalog server's song listing. Every field is nullable
/// on the wire; entries without all three are unplayable and dropped.
#[derive(Debug, Deserialize)]
struct SongDto {
    id: Option<u64>,
    name: Option<String>,
    file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_base_url() {
        assert!(matches!(
            CatalogService::new("   "),
            Err(CatalogFetchError::InvalidBaseUrl)
        ));
    }

    #[test]
    fn wire_entries_tolerate_missing_fields() {
        let songs: Vec<SongDto> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Song One", "file": "http://localhost:8080/media/1.mp3"},
                {"id": 2, "name": null, "file": null},
                {"name": "No Id", "file": "x.mp3"}
            ]"#,
        )
        .unwrap();
        assert_eq!(songs.len(), 3);
        assert_eq!(songs[0].id, Some(1));
        assert!(songs[1].name.is_none());
        assert!(songs[2].id.is_none());
    }
}
