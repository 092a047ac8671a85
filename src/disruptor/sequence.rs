//! Sequence counters for coordinating producers and consumers
//!
//! A Sequence tracks progress through the ring buffer. Each instance has a
//! single logical writer (the sequencer owns the cursor, each event
//! processor owns its consumer sequence) and any number of readers, so the
//! memory layout pads every counter out to its own cache line to keep
//! writers from invalidating each other's lines.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::disruptor::INITIAL_CURSOR_VALUE;

/// Cache line size the padding is computed against
const CACHE_LINE_SIZE: usize = 64;

/// A cache-line-isolated atomic sequence number
///
/// Alignment plus trailing padding guarantee that two Sequences stored
/// back-to-back never share a cache line.
#[repr(align(64))]
pub struct Sequence {
    value: AtomicI64,
    _padding: [u8; CACHE_LINE_SIZE - std::mem::size_of::<AtomicI64>()],
}

impl Sequence {
    /// Create a new sequence with the given initial value.
    pub fn new(initial_value: i64) -> Self {
        Self {
            value: AtomicI64::new(initial_value),
            _padding: [0; CACHE_LINE_SIZE - std::mem::size_of::<AtomicI64>()],
        }
    }

    /// Get the current value.
    ///
    /// The acquire load synchronizes with the release store of whichever
    /// thread last advanced this sequence, so a reader that observes a
    /// value also observes every write made before it was published.
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Set the value with release ordering.
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    /// Atomically add `delta` and return the post-increment value.
    #[inline]
    pub fn increment_and_get(&self, delta: i64) -> i64 {
        self.value.fetch_add(delta, Ordering::Release) + delta
    }

    /// Compare and set, returning whether the exchange took place.
    #[inline]
    pub fn compare_and_set(&self, expected: i64, desired: i64) -> bool {
        self.value
            .compare_exchange(expected, desired, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Compare and exchange; on failure `Err` carries the observed value.
    #[inline]
    pub fn compare_exchange(&self, expected: i64, desired: i64) -> Result<i64, i64> {
        self.value
            .compare_exchange(expected, desired, Ordering::AcqRel, Ordering::Acquire)
    }

    /// Get the minimum value of a set of sequences.
    ///
    /// Returns `i64::MAX` for an empty slice so callers can fold the
    /// result into further minimum computations.
    pub fn get_minimum_sequence(sequences: &[Arc<Sequence>]) -> i64 {
        sequences
            .iter()
            .map(|seq| seq.get())
            .min()
            .unwrap_or(i64::MAX)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(INITIAL_CURSOR_VALUE)
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence").field("value", &self.get()).finish()
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sequence_creation() {
        let seq = Sequence::new(42);
        assert_eq!(seq.get(), 42);
    }

    #[test]
    fn test_sequence_default_is_initial_cursor_value() {
        let seq = Sequence::default();
        assert_eq!(seq.get(), INITIAL_CURSOR_VALUE);
    }

    #[test]
    fn test_sequence_set_get() {
        let seq = Sequence::new(0);
        seq.set(100);
        assert_eq!(seq.get(), 100);
    }

    #[test]
    fn test_sequence_increment_and_get() {
        let seq = Sequence::new(0);
        assert_eq!(seq.increment_and_get(1), 1);
        assert_eq!(seq.increment_and_get(5), 6);
        assert_eq!(seq.get(), 6);
    }

    #[test]
    fn test_sequence_compare_and_set() {
        let seq = Sequence::new(10);

        assert!(seq.compare_and_set(10, 20));
        assert_eq!(seq.get(), 20);

        assert!(!seq.compare_and_set(10, 30));
        assert_eq!(seq.get(), 20);
    }

    #[test]
    fn test_compare_exchange_reports_observed_value() {
        let seq = Sequence::new(7);
        assert_eq!(seq.compare_exchange(7, 8), Ok(7));
        assert_eq!(seq.compare_exchange(7, 9), Err(8));
        assert_eq!(seq.get(), 8);
    }

    #[test]
    fn test_minimum_sequence() {
        let sequences = vec![
            Arc::new(Sequence::new(10)),
            Arc::new(Sequence::new(3)),
            Arc::new(Sequence::new(7)),
        ];
        assert_eq!(Sequence::get_minimum_sequence(&sequences), 3);
        assert_eq!(Sequence::get_minimum_sequence(&[]), i64::MAX);
    }

    #[test]
    fn test_sequences_do_not_share_cache_lines() {
        // Two adjacent instances must land on distinct 64-byte lines.
        assert!(std::mem::size_of::<Sequence>() >= 64);
        assert!(std::mem::align_of::<Sequence>() >= 64);

        let pair = [Sequence::new(0), Sequence::new(0)];
        let first = &pair[0] as *const Sequence as usize;
        let second = &pair[1] as *const Sequence as usize;
        assert!(second - first >= 64);
    }

    #[test]
    fn test_sequence_concurrent_increments() {
        let seq = Arc::new(Sequence::new(0));
        let mut handles = vec![];

        for _ in 0..8 {
            let seq = Arc::clone(&seq);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    seq.increment_and_get(1);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(seq.get(), 8000);
    }
}
