use beatline_domain::{BeatMap, BeatNote};

/// Default interval before a note's scheduled time during which it is
/// visible and approaching the hit line.
pub const DEFAULT_LEAD_TIME_SECS: f64 = 1.7;

/// Streams beat-map notes ahead of the playback clock.
///
/// Two states: active while the cursor is within the note list, idle once it
/// has passed the end. The cursor only moves forward; a non-increasing clock
/// simply releases nothing new. Re-spawn protection comes from the cursor,
/// not from clock monotonicity, which is the caller's responsibility.
#[derive(Debug)]
pub struct NoteSpawner {
    notes: Vec<BeatNote>,
    cursor: usize,
    lead_time: f64,
}

impl NoteSpawner {
    pub fn new(beat_map: &BeatMap) -> Self {
        Self::with_lead_time(beat_map, DEFAULT_LEAD_TIME_SECS)
    }

    pub fn with_lead_time(beat_map: &BeatMap, lead_time: f64) -> Self {
        Self {
            notes: beat_map.notes.clone(),
            cursor: 0,
            lead_time,
        }
    }

    /// Change the lookahead window. Takes effect on the next update.
    pub fn set_lead_time(&mut self, lead_time: f64) {
        self.lead_time = lead_time;
    }

    pub fn lead_time(&self) -> f64 {
        self.lead_time
    }

    /// Whether every note has been released.
    pub fn is_idle(&self) -> bool {
        self.cursor >= self.notes.len()
    }

    /// Release every not-yet-released note whose scheduled time has entered
    /// the lookahead window (`time - current_time <= lead_time`), in
    /// ascending time order. Returns exactly the notes newly crossed by this
    /// call. Total over any input; never errors.
    pub fn update(&mut self, current_time: f64) -> &[BeatNote] {
        let start = self.cursor;
        while self.cursor < self.notes.len()
            && self.notes[self.cursor].time - current_time <= self.lead_time
        {
            self.cursor += 1;
        }
        &self.notes[start..self.cursor]
    }

    /// Rewind to the start of the chart (track or difficulty change).
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(times: &[f64]) -> BeatMap {
        BeatMap::new(0.0, times.iter().map(|&t| BeatNote::new(t, 0)).collect())
    }

    #[test]
    fn releases_notes_entering_the_window() {
        let map = map(&[1.0, 2.0, 3.0]);
        let mut spawner = NoteSpawner::with_lead_time(&map, 1.7);

        // 1.0 - 0.0 = 1.0 <= 1.7 so the first note is already in range.
        let spawned: Vec<f64> = spawner.update(0.0).iter().map(|n| n.time).collect();
        assert_eq!(spawned, vec![1.0]);

        // 2.0 - 1.5 = 0.5 and 3.0 - 1.5 = 1.5 are both within the window.
        let spawned: Vec<f64> = spawner.update(1.5).iter().map(|n| n.time).collect();
        assert_eq!(spawned, vec![2.0, 3.0]);
        assert!(spawner.is_idle());
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let map = map(&[2.0]);
        let mut spawner = NoteSpawner::with_lead_time(&map, 1.0);
        assert!(spawner.update(0.999).is_empty());
        assert_eq!(spawner.update(1.0).len(), 1);
    }

    #[test]
    fn notes_are_never_released_twice() {
        let map = map(&[0.5, 1.0]);
        let mut spawner = NoteSpawner::with_lead_time(&map, 1.7);
        assert_eq!(spawner.update(0.0).len(), 2);
        assert!(spawner.update(0.0).is_empty());
        assert!(spawner.update(5.0).is_empty());
    }

    #[test]
    fn non_increasing_clock_releases_nothing_new() {
        let map = map(&[1.0, 4.0]);
        let mut spawner = NoteSpawner::with_lead_time(&map, 1.0);
        assert_eq!(spawner.update(0.5).len(), 1);
        assert!(spawner.update(0.1).is_empty());
        assert_eq!(spawner.update(3.0).len(), 1);
    }

    #[test]
    fn cumulative_release_covers_every_note_in_order() {
        let times = [0.4, 0.9, 1.3, 2.6, 4.0];
        let map = map(&times);
        let mut spawner = NoteSpawner::with_lead_time(&map, 1.7);
        let mut seen = Vec::new();
        let mut clock = 0.0;
        while !spawner.is_idle() {
            seen.extend(spawner.update(clock).iter().map(|n| n.time));
            clock += 0.25;
        }
        assert_eq!(seen, times);
    }

    #[test]
    fn reset_restarts_from_the_first_note() {
        let map = map(&[1.0]);
        let mut spawner = NoteSpawner::new(&map);
        assert_eq!(spawner.update(0.0).len(), 1);
        spawner.reset();
        assert!(!spawner.is_idle());
        assert_eq!(spawner.update(0.0).len(), 1);
    }

    #[test]
    fn lead_time_change_applies_to_next_update() {
        let map = map(&[5.0]);
        let mut spawner = NoteSpawner::with_lead_time(&map, 1.0);
        assert!(spawner.update(0.0).is_empty());
        spawner.set_lead_time(6.0);
        assert_eq!(spawner.update(0.0).len(), 1);
    }

    #[test]
    fn empty_chart_is_immediately_idle() {
        let map = map(&[]);
        let mut spawner = NoteSpawner::new(&map);
        assert!(spawner.is_idle());
        assert!(spawner.update(10.0).is_empty());
    }
}
