//! Preallocated ring buffer
//!
//! The ring buffer is a fixed array of event slots addressed by
//! `sequence & (N - 1)`. Every slot is created once by the event factory
//! at construction and mutated in place afterwards; the sequence protocol
//! alone decides which thread may touch which slot. The buffer itself
//! carries no synchronization state — it is a typed view over memory plus
//! the sequencer it delegates claims to.

use std::cell::UnsafeCell;
use std::sync::Arc;

use crate::disruptor::{
    is_power_of_two, DisruptorError, EventFactory, ProcessingSequenceBarrier, Result, Sequence,
    Sequencer,
};

/// Data access abstraction consumed by event processors.
///
/// Decouples the processing loop from the concrete buffer so tests can
/// substitute their own providers.
pub trait DataProvider<T>: Send + Sync {
    /// Shared access to the event at `sequence`.
    fn get(&self, sequence: i64) -> &T;

    /// Exclusive access to the event at `sequence`.
    ///
    /// # Safety
    /// The caller must own the slot under the sequence protocol: a
    /// producer between claim and publish, or the consumer currently
    /// processing that sequence. No other reference to the slot may be
    /// live.
    #[allow(clippy::mut_from_ref)]
    unsafe fn get_mut(&self, sequence: i64) -> &mut T;
}

/// Fixed-size slot array plus the sequencer that coordinates it
pub struct RingBuffer<T> {
    slots: Box<[UnsafeCell<T>]>,
    index_mask: i64,
    sequencer: Arc<dyn Sequencer>,
}

impl<T> RingBuffer<T>
where
    T: Send + Sync,
{
    /// Create a ring buffer over the sequencer's capacity, filling every
    /// slot by invoking the factory exactly once per slot.
    pub fn new<F>(sequencer: Arc<dyn Sequencer>, factory: F) -> Result<Self>
    where
        F: EventFactory<T>,
    {
        let buffer_size = sequencer.buffer_size();
        if !is_power_of_two(buffer_size) {
            return Err(DisruptorError::InvalidBufferSize(buffer_size));
        }

        let slots: Box<[UnsafeCell<T>]> = (0..buffer_size)
            .map(|_| UnsafeCell::new(factory.new_instance()))
            .collect();

        Ok(Self {
            slots,
            index_mask: (buffer_size - 1) as i64,
            sequencer,
        })
    }

    /// Claim the next sequence for publication.
    pub fn next(&self) -> Result<i64> {
        self.sequencer.next()
    }

    /// Claim the next `n` sequences, returning the highest.
    pub fn next_n(&self, n: i64) -> Result<i64> {
        self.sequencer.next_n(n)
    }

    /// Publish a claimed sequence.
    pub fn publish(&self, sequence: i64) {
        self.sequencer.publish(sequence);
    }

    /// Register the consumer sequences that gate the producer.
    pub fn set_gating_sequences(&self, sequences: Vec<Arc<Sequence>>) {
        self.sequencer.set_gating_sequences(sequences);
    }

    /// Build a barrier over the sequencer's cursor and the given
    /// dependent consumer sequences.
    pub fn new_barrier(&self, dependents: Vec<Arc<Sequence>>) -> ProcessingSequenceBarrier {
        ProcessingSequenceBarrier::new(
            self.sequencer.cursor_sequence(),
            self.sequencer.wait_strategy(),
            dependents,
            Arc::clone(&self.sequencer),
        )
    }

    /// Current cursor value.
    pub fn cursor(&self) -> i64 {
        self.sequencer.get_cursor()
    }

    /// Minimum over the registered gating sequences.
    pub fn minimum_gating_sequence(&self) -> i64 {
        self.sequencer.minimum_gating_sequence()
    }

    /// Number of slots.
    pub fn buffer_size(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn slot(&self, sequence: i64) -> &UnsafeCell<T> {
        let index = (sequence & self.index_mask) as usize;
        // Index is in bounds: masked by buffer_size - 1.
        unsafe { self.slots.get_unchecked(index) }
    }
}

impl<T> DataProvider<T> for RingBuffer<T>
where
    T: Send + Sync,
{
    fn get(&self, sequence: i64) -> &T {
        unsafe { &*self.slot(sequence).get() }
    }

    #[allow(clippy::mut_from_ref)]
    unsafe fn get_mut(&self, sequence: i64) -> &mut T {
        &mut *self.slot(sequence).get()
    }
}

impl<T> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("buffer_size", &self.slots.len())
            .finish()
    }
}

// SAFETY: slot access goes through UnsafeCell, and the sequence protocol
// serializes writers and readers: a consumer only reads a slot after the
// cursor's release store covering it, and a producer only rewrites a slot
// after every gating consumer's release store has moved past it.
unsafe impl<T: Send + Sync> Send for RingBuffer<T> {}
unsafe impl<T: Send + Sync> Sync for RingBuffer<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::{
        event_factory, BusySpinWaitStrategy, DefaultEventFactory, SingleProducerSequencer,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct TestEvent {
        value: i64,
    }

    fn ring(buffer_size: usize) -> RingBuffer<TestEvent> {
        let sequencer = Arc::new(
            SingleProducerSequencer::new(buffer_size, Arc::new(BusySpinWaitStrategy::new()))
                .unwrap(),
        );
        RingBuffer::new(sequencer, DefaultEventFactory::<TestEvent>::new()).unwrap()
    }

    #[test]
    fn test_factory_invoked_once_per_slot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            event_factory(move || {
                calls.fetch_add(1, Ordering::Relaxed);
                TestEvent::default()
            })
        };
        let sequencer = Arc::new(
            SingleProducerSequencer::new(8, Arc::new(BusySpinWaitStrategy::new())).unwrap(),
        );
        let buffer = RingBuffer::new(sequencer, counted).unwrap();

        assert_eq!(buffer.buffer_size(), 8);
        assert_eq!(calls.load(Ordering::Relaxed), 8);
    }

    #[test]
    fn test_modular_indexing_reuses_slots() {
        let buffer = ring(4);

        unsafe { buffer.get_mut(1) }.value = 10;
        assert_eq!(buffer.get(1).value, 10);

        // Sequence 5 maps to the same slot as sequence 1.
        unsafe { buffer.get_mut(5) }.value = 50;
        assert_eq!(buffer.get(1).value, 50);
        assert_eq!(buffer.get(5).value, 50);
    }

    #[test]
    fn test_claim_and_publish_delegate_to_sequencer() {
        let buffer = ring(8);

        let sequence = buffer.next().unwrap();
        assert_eq!(sequence, 0);
        unsafe { buffer.get_mut(sequence) }.value = 99;
        buffer.publish(sequence);

        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.get(0).value, 99);

        assert_eq!(buffer.next_n(3).unwrap(), 3);
    }

    #[test]
    fn test_gating_delegates_to_sequencer() {
        let buffer = ring(8);
        assert_eq!(buffer.minimum_gating_sequence(), i64::MAX);

        buffer.set_gating_sequences(vec![Arc::new(crate::disruptor::Sequence::new(5))]);
        assert_eq!(buffer.minimum_gating_sequence(), 5);
    }

    #[test]
    fn test_large_sequences_wrap() {
        let buffer = ring(4);
        let sequence = i64::MAX - 3;
        unsafe { buffer.get_mut(sequence) }.value = 7;
        assert_eq!(buffer.get(sequence).value, 7);
    }
}
