//! Ringbolt Disruptor core
//!
//! This module provides the synchronization machinery of the LMAX Disruptor
//! pattern: cache-line-isolated sequence counters, the single-producer
//! claim/publish protocol, consumer sequence barriers with alert support,
//! pluggable wait strategies, and the batch event processing loop.

pub mod event_factory;
pub mod event_handler;
pub mod event_processor;
pub mod exception_handler;
pub mod ring_buffer;
pub mod sequence;
pub mod sequence_barrier;
pub mod sequencer;
pub mod wait_strategy;


pub use event_factory::{event_factory, ClosureEventFactory, DefaultEventFactory, EventFactory};
pub use event_handler::{ClosureEventHandler, EventHandler, NoOpEventHandler};
pub use event_processor::{BatchEventProcessor, EventProcessor, RunState, DEFAULT_BATCH_SIZE};
pub use exception_handler::{
    ClosureExceptionHandler, DefaultExceptionHandler, ExceptionHandler, ExceptionOutcome,
    IgnoreExceptionHandler,
};
pub use ring_buffer::{DataProvider, RingBuffer};
pub use sequence::Sequence;
pub use sequence_barrier::ProcessingSequenceBarrier;
pub use sequencer::{Sequencer, SingleProducerSequencer};
pub use wait_strategy::{
    AlertCheck, BlockingWaitStrategy, BusySpinWaitStrategy, SleepingWaitStrategy, WaitStrategy,
    YieldingWaitStrategy,
};

/// The value every sequence starts from before anything has been claimed
/// or consumed.
pub const INITIAL_CURSOR_VALUE: i64 = -1;

/// An error produced by application code inside an event handler.
///
/// Handler errors are routed through the processor's [`ExceptionHandler`]
/// rather than surfacing directly; the default policy wraps them into
/// one of the fatal [`DisruptorError`] variants.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the Disruptor core.
#[derive(Debug, thiserror::Error)]
pub enum DisruptorError {
    /// The ring buffer size was not a power of two.
    #[error("buffer size must be a power of two, got {0}")]
    InvalidBufferSize(usize),

    /// A claim was made for fewer than one or more than `buffer_size` slots.
    #[error("cannot claim {requested} slots on a ring of {buffer_size}")]
    InvalidClaim { requested: i64, buffer_size: i64 },

    /// `run()` was invoked on a processor that is not idle.
    #[error("event processor is already running")]
    AlreadyRunning,

    /// A sequence barrier was alerted while waiting.
    ///
    /// This is a control-flow condition used to unblock waits during
    /// shutdown; it is caught inside the processor and never reaches
    /// user code.
    #[error("sequence barrier alerted")]
    Alert,

    /// A handler error at a specific sequence, escalated by the
    /// exception handler.
    #[error("fatal exception at sequence {sequence}: {cause}")]
    FatalEvent { sequence: i64, cause: HandlerError },

    /// A handler error during `on_start`, escalated by the exception
    /// handler.
    #[error("exception during processor startup: {0}")]
    FatalStartup(HandlerError),

    /// A handler error during `on_shutdown`, escalated by the exception
    /// handler.
    #[error("exception during processor shutdown: {0}")]
    FatalShutdown(HandlerError),
}

pub type Result<T> = std::result::Result<T, DisruptorError>;

/// Check whether a buffer size is a power of two.
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}
