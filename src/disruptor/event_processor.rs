//! Event processors
//!
//! An event processor drives one handler on one thread: it waits on its
//! barrier for the next target sequence, delivers the available events in
//! batches, and advances its consumer sequence only after every handler
//! call for the batch has returned. That ordering is what lets the
//! producer reuse a slot `buffer_size` sequences later.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::disruptor::exception_handler::DefaultExceptionHandler;
use crate::disruptor::{
    DataProvider, DisruptorError, EventHandler, ExceptionHandler, ExceptionOutcome,
    ProcessingSequenceBarrier, Result, Sequence,
};

/// Events delivered per batch before the consumer sequence is published.
pub const DEFAULT_BATCH_SIZE: i64 = 64;

/// Lifecycle state of an event processor.
///
/// `Idle -> Running -> Idle` on normal completion; `halt()` moves a
/// running processor through `Halted` back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Halted = 1,
    Running = 2,
}

/// Consumer loop surface exposed to the application driver
pub trait EventProcessor: Send + Sync {
    /// The consumer sequence, for downstream barriers and producer gating.
    fn get_sequence(&self) -> Arc<Sequence>;

    /// Request the processing loop to stop. Safe from any thread; the
    /// running thread observes it at its next wait.
    fn halt(&self);

    /// Whether the processor is currently between `run()` entry and exit.
    fn is_running(&self) -> bool;

    /// Run the processing loop on the calling thread until halted.
    fn run(&self) -> Result<()>;
}

/// Batch event processor
///
/// Delivers contiguous runs of published events to its handler, bounded
/// per iteration by the batch size, and routes handler failures through
/// the injected [`ExceptionHandler`].
pub struct BatchEventProcessor<T, H>
where
    H: EventHandler<T>,
{
    data_provider: Arc<dyn DataProvider<T>>,
    barrier: ProcessingSequenceBarrier,
    handler: Mutex<H>,
    exception_handler: Box<dyn ExceptionHandler<T>>,
    sequence: Arc<Sequence>,
    run_state: AtomicU8,
    batch_size: i64,
}

impl<T, H> BatchEventProcessor<T, H>
where
    T: Send + Sync + 'static,
    H: EventHandler<T>,
{
    /// Create a processor over a data provider and its barrier, with the
    /// default batch size and the escalating default exception handler.
    pub fn new(
        data_provider: Arc<dyn DataProvider<T>>,
        barrier: ProcessingSequenceBarrier,
        mut handler: H,
    ) -> Self {
        let sequence = Arc::new(Sequence::default());
        handler.set_sequence_callback(Arc::clone(&sequence));
        Self {
            data_provider,
            barrier,
            handler: Mutex::new(handler),
            exception_handler: Box::new(DefaultExceptionHandler::new()),
            sequence,
            run_state: AtomicU8::new(RunState::Idle as u8),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size. Must be at least 1.
    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        assert!(batch_size >= 1, "batch size must be at least 1");
        self.batch_size = batch_size;
        self
    }

    /// Replace the exception handler.
    pub fn with_exception_handler(
        mut self,
        exception_handler: Box<dyn ExceptionHandler<T>>,
    ) -> Self {
        self.exception_handler = exception_handler;
        self
    }

    fn state(&self) -> u8 {
        self.run_state.load(Ordering::Acquire)
    }

    fn process_events(&self, handler: &mut H) -> Result<()> {
        let mut next_sequence = self.sequence.get() + 1;

        while self.state() == RunState::Running as u8 {
            let available = match self.barrier.wait_for(next_sequence) {
                Ok(available) => available,
                Err(DisruptorError::Alert) => {
                    if self.state() != RunState::Running as u8 {
                        break;
                    }
                    // Alerted without a halt: not ours to swallow.
                    return Err(DisruptorError::Alert);
                }
                Err(other) => return Err(other),
            };

            if available < next_sequence {
                // A timeout-capable strategy gave up early; tell the
                // handler and go back to waiting.
                if let Err(error) = handler.on_timeout(next_sequence) {
                    warn!(sequence = next_sequence, %error, "timeout callback failed");
                }
                continue;
            }

            let end_of_batch = (next_sequence + self.batch_size - 1).min(available);
            handler.on_batch_start(
                end_of_batch - next_sequence + 1,
                available - next_sequence + 1,
            );

            let mut batch_error = None;
            while next_sequence <= end_of_batch {
                // SAFETY: sequences up to `available` are published and
                // this consumer owns them until its sequence passes them.
                let event = unsafe { self.data_provider.get_mut(next_sequence) };
                let end = next_sequence == end_of_batch;
                if let Err(error) = handler.on_event(event, next_sequence, end) {
                    batch_error = Some(error);
                    break;
                }
                next_sequence += 1;
            }

            match batch_error {
                None => self.sequence.set(end_of_batch),
                Some(error) => {
                    // Expose the events that did succeed before deciding
                    // the fate of the failed one.
                    self.sequence.set(next_sequence - 1);
                    let event = self.data_provider.get(next_sequence);
                    match self
                        .exception_handler
                        .handle_event_exception(error, next_sequence, event)?
                    {
                        ExceptionOutcome::Skip => {
                            warn!(sequence = next_sequence, "skipping failed sequence");
                            self.sequence.set(next_sequence);
                            next_sequence += 1;
                        }
                        ExceptionOutcome::Retry => {}
                    }
                }
            }
        }

        Ok(())
    }
}

impl<T, H> EventProcessor for BatchEventProcessor<T, H>
where
    T: Send + Sync + 'static,
    H: EventHandler<T>,
{
    fn get_sequence(&self) -> Arc<Sequence> {
        Arc::clone(&self.sequence)
    }

    fn halt(&self) {
        self.run_state
            .store(RunState::Halted as u8, Ordering::Release);
        self.barrier.alert();
    }

    fn is_running(&self) -> bool {
        self.state() != RunState::Idle as u8
    }

    fn run(&self) -> Result<()> {
        if self
            .run_state
            .compare_exchange(
                RunState::Idle as u8,
                RunState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Err(DisruptorError::AlreadyRunning);
        }

        self.barrier.clear_alert();
        let mut handler = self.handler.lock();
        debug!(sequence = self.sequence.get(), "event processor starting");

        if let Err(error) = handler.on_start() {
            if let Err(fatal) = self.exception_handler.handle_on_start_exception(error) {
                // The handler never started; abort without on_shutdown
                // and leave the processor restartable.
                self.run_state.store(RunState::Idle as u8, Ordering::Release);
                return Err(fatal);
            }
        }

        let loop_result = self.process_events(&mut handler);

        let shutdown_result = match handler.on_shutdown() {
            Ok(()) => Ok(()),
            Err(error) => self.exception_handler.handle_on_shutdown_exception(error),
        };

        self.run_state.store(RunState::Idle as u8, Ordering::Release);
        debug!(sequence = self.sequence.get(), "event processor stopped");

        loop_result.and(shutdown_result)
    }
}

impl<T, H> std::fmt::Debug for BatchEventProcessor<T, H>
where
    H: EventHandler<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEventProcessor")
            .field("sequence", &self.sequence)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
