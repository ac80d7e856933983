use crate::error::DomainError;
use crate::schema::{BeatMap, MAX_LANE};

/// Structural validation of a beat map before it is persisted.
///
/// Missing or extra fields are caught at the serde boundary
/// (`deny_unknown_fields`); this checks the value ranges the wire types
/// cannot express. The error names the first violation encountered.
pub fn validate_beat_map(map: &BeatMap) -> Result<(), DomainError> {
    if map.version < 1 {
        return Err(DomainError::validation(format!(
            "beat map version must be at least 1, got {}",
            map.version
        )));
    }
    for (index, note) in map.notes.iter().enumerate() {
        if !note.time.is_finite() || note.time < 0.0 {
            return Err(DomainError::validation(format!(
                "note {} has invalid time {}",
                index, note.time
            )));
        }
        if note.lane > MAX_LANE {
            return Err(DomainError::validation(format!(
                "note {} lane {} is outside 0..={}",
                index, note.lane, MAX_LANE
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BeatNote;

    fn map_with(notes: Vec<BeatNote>) -> BeatMap {
        BeatMap::new(0.0, notes)
    }

    #[test]
    fn accepts_well_formed_map() {
        let map = map_with(vec![BeatNote::new(0.0, 0), BeatNote::new(1.5, 5)]);
        assert!(validate_beat_map(&map).is_ok());
    }

    #[test]
    fn accepts_empty_note_list() {
        assert!(validate_beat_map(&map_with(vec![])).is_ok());
    }

    #[test]
    fn rejects_version_zero() {
        let mut map = map_with(vec![]);
        map.version = 0;
        let err = validate_beat_map(&map).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn rejects_negative_time() {
        let map = map_with(vec![BeatNote::new(-1.0, 0)]);
        let err = validate_beat_map(&map).unwrap_err();
        assert!(err.to_string().contains("time"));
    }

    #[test]
    fn rejects_lane_six() {
        let map = map_with(vec![BeatNote::new(0.5, 6)]);
        let err = validate_beat_map(&map).unwrap_err();
        assert!(err.to_string().contains("lane 6"));
    }

    #[test]
    fn names_the_first_violation() {
        let map = map_with(vec![
            BeatNote::new(0.0, 0),
            BeatNote::new(-2.0, 0),
            BeatNote::new(0.5, 7),
        ]);
        let err = validate_beat_map(&map).unwrap_err();
        assert!(err.to_string().contains("note 1"));
    }
}
