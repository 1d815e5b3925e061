// Record ID Generator - millisecond timestamps that stay unique under bursts

use std::sync::atomic::{AtomicI64, Ordering};

use crate::framework::record::RecordId;

/// Largest integer a JSON client holds exactly (2^53 - 1).
pub const MAX_SAFE_ID: RecordId = (1 << 53) - 1;

/// Generates strictly increasing record identifiers.
///
/// Ids are the current Unix time in milliseconds. When two ids are
/// requested in the same millisecond (or the clock steps backwards) the
/// generator falls back to `last + 1`, so ids never repeat within a
/// generator. Seeded records register their ids through [`observe`] and
/// generated ids always land above them.
///
/// Every id stays at or below [`MAX_SAFE_ID`] so browser clients can send
/// it back unchanged.
///
/// [`observe`]: RecordIdGenerator::observe
#[derive(Debug, Default)]
pub struct RecordIdGenerator {
    last_id: AtomicI64,
}

impl RecordIdGenerator {
    pub fn new() -> Self {
        Self {
            last_id: AtomicI64::new(0),
        }
    }

    pub fn next_id(&self) -> RecordId {
        let candidate = chrono::Utc::now().timestamp_millis().clamp(0, MAX_SAFE_ID);
        let advance = |last: RecordId| if candidate > last { candidate } else { last + 1 };

        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(advance(last)))
            .unwrap_or_else(|last| last);

        advance(previous)
    }

    /// Record an externally assigned id so later ids stay above it.
    pub fn observe(&self, id: RecordId) {
        self.last_id.fetch_max(id, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_strictly_increase() {
        let generator = RecordIdGenerator::new();
        let mut last = 0;
        for _ in 0..10_000 {
            let id = generator.next_id();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn test_burst_ids_survive_json_numbers() {
        let generator = RecordIdGenerator::new();
        for _ in 0..5_000 {
            let id = generator.next_id();
            assert!(id <= MAX_SAFE_ID);
            assert_eq!(id as f64 as RecordId, id);
        }
    }

    #[test]
    fn test_ids_track_wall_clock() {
        let before = chrono::Utc::now().timestamp_millis();
        let id = RecordIdGenerator::new().next_id();
        assert!(id >= before);
    }

    #[test]
    fn test_observe_keeps_ids_above_seeds() {
        let generator = RecordIdGenerator::new();
        let far_future = MAX_SAFE_ID / 2;
        generator.observe(far_future);

        assert_eq!(generator.next_id(), far_future + 1);
        assert_eq!(generator.next_id(), far_future + 2);
    }

    #[test]
    fn test_unique_across_threads() {
        let generator = Arc::new(RecordIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..2_000).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("generator thread panicked") {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 8_000);
    }
}
