//! Sequencer: producer-side claim and publish
//!
//! The sequencer owns the cursor and hands out sequence ranges to the
//! producer, gated so the claim never laps the slowest consumer. The
//! single-producer variant keeps its claim state in plain cells; the
//! protocol restricts `next`/`next_n` to one thread.

use std::cell::Cell;
use std::sync::Arc;

use crate::disruptor::{
    is_power_of_two, DisruptorError, Result, Sequence, WaitStrategy, INITIAL_CURSOR_VALUE,
};

/// Producer-side coordination surface consumed by the ring buffer and
/// the sequence barrier.
pub trait Sequencer: Send + Sync + std::fmt::Debug {
    /// Claim the next sequence. Equivalent to `next_n(1)`.
    fn next(&self) -> Result<i64> {
        self.next_n(1)
    }

    /// Claim the next `n` sequences and return the highest one.
    ///
    /// Blocks (via the wait strategy's producer back-off) while the claim
    /// would overwrite a slot the slowest gating consumer has not
    /// released. Fails with `InvalidClaim` unless `1 <= n <= buffer_size`.
    fn next_n(&self, n: i64) -> Result<i64>;

    /// Publish a claimed sequence, making it visible to consumers.
    fn publish(&self, sequence: i64);

    /// Current cursor value.
    fn get_cursor(&self) -> i64;

    /// The cursor counter itself, for wiring barriers.
    fn cursor_sequence(&self) -> Arc<Sequence>;

    /// Capacity of the ring this sequencer coordinates.
    fn buffer_size(&self) -> usize;

    /// The wait strategy shared by this sequencer and the barriers built
    /// over it.
    fn wait_strategy(&self) -> Arc<dyn WaitStrategy>;

    /// Replace the gating sequences.
    ///
    /// Must only be called while the producer is quiescent; the gating
    /// list is consulted on every wrapping claim.
    fn set_gating_sequences(&self, sequences: Vec<Arc<Sequence>>);

    /// Minimum over the gating sequences, or `i64::MAX` when none are
    /// registered.
    fn minimum_gating_sequence(&self) -> i64 {
        self.minimum_gating_sequence_from(i64::MAX)
    }

    /// Minimum over `initial` and all gating sequences.
    fn minimum_gating_sequence_from(&self, initial: i64) -> i64;

    /// Whether `sequence` has been published.
    fn is_available(&self, sequence: i64) -> bool;

    /// Highest sequence in `lower_bound..=available` that is safe to
    /// consume contiguously.
    fn highest_published_sequence(&self, lower_bound: i64, available: i64) -> i64;
}

/// Sequencer for a single publishing thread
///
/// Claiming is a plain read-modify-write of producer-private state; only
/// the cursor store in [`publish`](Sequencer::publish) is atomic. This is
/// the fastest variant but undefined if two threads ever claim
/// concurrently.
#[derive(Debug)]
pub struct SingleProducerSequencer {
    buffer_size: usize,
    wait_strategy: Arc<dyn WaitStrategy>,
    cursor: Arc<Sequence>,
    /// Last sequence claimed by the producer. Producer-private.
    next_value: Cell<i64>,
    /// Last observed minimum gating sequence. Pessimistic cache so the
    /// gating list is only re-read when a claim approaches the wrap point.
    cached_gating_value: Cell<i64>,
    gating_sequences: parking_lot::RwLock<Vec<Arc<Sequence>>>,
}

// SAFETY: the Cell fields are touched only by `next_n`, which the
// single-producer protocol restricts to one thread at a time. All other
// state is atomic or lock-protected.
unsafe impl Sync for SingleProducerSequencer {}

impl SingleProducerSequencer {
    /// Create a sequencer for a ring of `buffer_size` slots.
    pub fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        if !is_power_of_two(buffer_size) {
            return Err(DisruptorError::InvalidBufferSize(buffer_size));
        }
        Ok(Self {
            buffer_size,
            wait_strategy,
            cursor: Arc::new(Sequence::default()),
            next_value: Cell::new(INITIAL_CURSOR_VALUE),
            cached_gating_value: Cell::new(INITIAL_CURSOR_VALUE),
            gating_sequences: parking_lot::RwLock::new(Vec::new()),
        })
    }
}

impl Sequencer for SingleProducerSequencer {
    fn next_n(&self, n: i64) -> Result<i64> {
        let buffer_size = self.buffer_size as i64;
        if n < 1 || n > buffer_size {
            return Err(DisruptorError::InvalidClaim {
                requested: n,
                buffer_size,
            });
        }

        let next_value = self.next_value.get();
        let next_sequence = next_value + n;
        let wrap_point = next_sequence - buffer_size;
        let cached_gating = self.cached_gating_value.get();

        // The claimed slot is the one at wrap_point's ring index; wait
        // until every gating consumer has moved past it. The second
        // clause re-reads when the cache could be stale.
        if wrap_point > cached_gating || cached_gating > next_value {
            let mut min_sequence = self.minimum_gating_sequence_from(next_value);
            while wrap_point > min_sequence {
                self.wait_strategy.producer_wait();
                min_sequence = self.minimum_gating_sequence_from(next_value);
            }
            self.cached_gating_value.set(min_sequence);
        }

        self.next_value.set(next_sequence);
        Ok(next_sequence)
    }

    fn publish(&self, sequence: i64) {
        self.cursor.set(sequence);
        self.wait_strategy.signal_all_when_blocking();
    }

    fn get_cursor(&self) -> i64 {
        self.cursor.get()
    }

    fn cursor_sequence(&self) -> Arc<Sequence> {
        Arc::clone(&self.cursor)
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn wait_strategy(&self) -> Arc<dyn WaitStrategy> {
        Arc::clone(&self.wait_strategy)
    }

    fn set_gating_sequences(&self, sequences: Vec<Arc<Sequence>>) {
        *self.gating_sequences.write() = sequences;
    }

    fn minimum_gating_sequence_from(&self, initial: i64) -> i64 {
        let sequences = self.gating_sequences.read();
        initial.min(Sequence::get_minimum_sequence(&sequences))
    }

    fn is_available(&self, sequence: i64) -> bool {
        sequence <= self.cursor.get()
    }

    fn highest_published_sequence(&self, _lower_bound: i64, available: i64) -> i64 {
        // A single producer publishes contiguously, so everything up to
        // the cursor is consumable.
        available
    }
}
