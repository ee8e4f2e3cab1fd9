use quiz_core::model::TrackId;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range")))
}

/// Ordered track ids serialized as a comma-joined string.
pub(crate) fn join_track_ids(ids: &[TrackId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn split_track_ids(raw: &str) -> Result<Vec<TrackId>, StorageError> {
    raw.split(',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<TrackId>().map_err(ser))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_ids_round_trip_through_text() {
        let ids = vec![TrackId::new(3), TrackId::new(14), TrackId::new(1)];
        let joined = join_track_ids(&ids);
        assert_eq!(joined, "3,14,1");
        assert_eq!(split_track_ids(&joined).unwrap(), ids);
    }

    #[test]
    fn empty_text_is_an_empty_order() {
        assert!(split_track_ids("").unwrap().is_empty());
    }

    #[test]
    fn garbage_text_is_a_serialization_error() {
        assert!(matches!(
            split_track_ids("1,x,3"),
            Err(StorageError::Serialization(_))
        ));
    }
}
