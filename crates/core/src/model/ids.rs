use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Track, stable across runs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(u64);

impl TrackId {
    /// Creates a new `TrackId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackId({})", self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for TrackId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(TrackId::new)
            .map_err(|_| ParseIdError {
                kind: "TrackId".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_id_display() {
        let id = TrackId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_track_id_from_str() {
        let id: TrackId = "123".parse().unwrap();
        assert_eq!(id, TrackId::new(123));
    }

    #[test]
    fn test_track_id_from_str_invalid() {
        let result = "not-a-number".parse::<TrackId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_id_roundtrip() {
        let original = TrackId::new(7);
        let serialized = original.to_string();
        let deserialized: TrackId = serialized.parse().unwrap();
        assert_eq!(original, deserialized);
    }
}
