//! `Ringbolt` - Lock-Free Inter-Thread Messaging Core
//!
//! A Rust implementation of the LMAX Disruptor pattern for low-latency
//! inter-thread messaging: one producer publishes fixed-type events into a
//! bounded, preallocated ring buffer while consumers observe them in
//! strict publication order, optionally arranged in a dependency graph.
//! All cross-thread coordination goes through monotonically increasing
//! 64-bit sequence counters with acquire/release atomics; there are no
//! locks, condition variables, or allocations on the hot path.
//!
//! ## Quick Start
//!
//! ```rust
//! use ringbolt::disruptor::{
//!     BatchEventProcessor, BusySpinWaitStrategy, ClosureEventHandler, DataProvider,
//!     DefaultEventFactory, EventProcessor, RingBuffer, Sequencer, SingleProducerSequencer,
//! };
//! use std::sync::Arc;
//! use std::thread;
//!
//! #[derive(Debug, Default)]
//! struct MyEvent {
//!     value: i64,
//! }
//!
//! // Wire the topology: sequencer, ring buffer, one consumer.
//! let sequencer = Arc::new(
//!     SingleProducerSequencer::new(1024, Arc::new(BusySpinWaitStrategy::new())).unwrap(),
//! );
//! let buffer = Arc::new(
//!     RingBuffer::new(
//!         Arc::clone(&sequencer) as Arc<dyn Sequencer>,
//!         DefaultEventFactory::<MyEvent>::new(),
//!     )
//!     .unwrap(),
//! );
//! let processor = Arc::new(BatchEventProcessor::new(
//!     Arc::clone(&buffer) as Arc<dyn DataProvider<MyEvent>>,
//!     buffer.new_barrier(vec![]),
//!     ClosureEventHandler::new(|event: &mut MyEvent, sequence, _end_of_batch| {
//!         assert_eq!(event.value, sequence * 2);
//!         Ok(())
//!     }),
//! ));
//!
//! // The tail consumer gates the producer.
//! buffer.set_gating_sequences(vec![processor.get_sequence()]);
//!
//! let consumer = {
//!     let processor = Arc::clone(&processor);
//!     thread::spawn(move || processor.run())
//! };
//!
//! // Publish: claim, write, publish.
//! for i in 0..5 {
//!     let sequence = buffer.next().unwrap();
//!     unsafe { buffer.get_mut(sequence) }.value = i * 2;
//!     buffer.publish(sequence);
//! }
//!
//! // Shut down: halt the processor and join its thread.
//! while processor.get_sequence().get() < 4 {
//!     thread::yield_now();
//! }
//! processor.halt();
//! consumer.join().unwrap().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - [`Sequence`](disruptor::Sequence): cache-line-isolated atomic counter
//! - [`SingleProducerSequencer`](disruptor::SingleProducerSequencer): claim/publish protocol
//! - [`RingBuffer`](disruptor::RingBuffer): preallocated slot array over the sequencer
//! - [`ProcessingSequenceBarrier`](disruptor::ProcessingSequenceBarrier): consumer wait point
//! - [`WaitStrategy`](disruptor::WaitStrategy): how waiters stall (busy-spin, yield, sleep, block)
//! - [`BatchEventProcessor`](disruptor::BatchEventProcessor): the consumer loop

pub mod disruptor;

pub use disruptor::{
    event_factory, is_power_of_two, AlertCheck, BatchEventProcessor, BlockingWaitStrategy,
    BusySpinWaitStrategy, ClosureEventFactory, ClosureEventHandler, ClosureExceptionHandler,
    DataProvider, DefaultEventFactory, DefaultExceptionHandler, DisruptorError, EventFactory,
    EventHandler, EventProcessor, ExceptionHandler, ExceptionOutcome, HandlerError,
    IgnoreExceptionHandler, NoOpEventHandler, ProcessingSequenceBarrier, Result, RingBuffer,
    RunState, Sequence, Sequencer, SingleProducerSequencer, SleepingWaitStrategy, WaitStrategy,
    YieldingWaitStrategy, DEFAULT_BATCH_SIZE, INITIAL_CURSOR_VALUE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
