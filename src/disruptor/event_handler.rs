//! Event handler contracts
//!
//! An event handler is the unit of consumer business logic driven by a
//! [`BatchEventProcessor`](crate::disruptor::BatchEventProcessor). Only
//! `on_event` is required; the batch, lifecycle, and timeout callbacks
//! default to no-ops.

use std::sync::Arc;

use crate::disruptor::{HandlerError, Sequence};

/// Handler for processing events in publication order
pub trait EventHandler<T>: Send {
    /// Process the event at `sequence`.
    ///
    /// `end_of_batch` is true for the last event the processor will
    /// deliver before returning to its wait, letting handlers amortize
    /// flushes across a batch. Errors are routed through the processor's
    /// exception handler.
    fn on_event(
        &mut self,
        event: &mut T,
        sequence: i64,
        end_of_batch: bool,
    ) -> std::result::Result<(), HandlerError>;

    /// Called before the first event of each batch with the batch length
    /// and the total backlog visible through the barrier.
    fn on_batch_start(&mut self, _batch_size: i64, _queue_depth: i64) {}

    /// Called once when the processor starts, before any event.
    fn on_start(&mut self) -> std::result::Result<(), HandlerError> {
        Ok(())
    }

    /// Called once when the processor shuts down.
    fn on_shutdown(&mut self) -> std::result::Result<(), HandlerError> {
        Ok(())
    }

    /// Called when a timeout-capable wait strategy gave up waiting for
    /// `sequence`; the processor resumes waiting afterwards.
    fn on_timeout(&mut self, _sequence: i64) -> std::result::Result<(), HandlerError> {
        Ok(())
    }

    /// Hands the handler the processor's own sequence so it can publish
    /// progress mid-batch. Optional.
    fn set_sequence_callback(&mut self, _sequence: Arc<Sequence>) {}
}

/// Event handler backed by a closure
pub struct ClosureEventHandler<T, F>
where
    F: FnMut(&mut T, i64, bool) -> std::result::Result<(), HandlerError> + Send,
{
    handler: F,
    _phantom: std::marker::PhantomData<fn(&mut T)>,
}

impl<T, F> ClosureEventHandler<T, F>
where
    F: FnMut(&mut T, i64, bool) -> std::result::Result<(), HandlerError> + Send,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, F> EventHandler<T> for ClosureEventHandler<T, F>
where
    T: Send + Sync,
    F: FnMut(&mut T, i64, bool) -> std::result::Result<(), HandlerError> + Send,
{
    fn on_event(
        &mut self,
        event: &mut T,
        sequence: i64,
        end_of_batch: bool,
    ) -> std::result::Result<(), HandlerError> {
        (self.handler)(event, sequence, end_of_batch)
    }
}

/// Handler that does nothing, for benchmarks and framework-overhead tests
pub struct NoOpEventHandler<T> {
    _phantom: std::marker::PhantomData<fn(&mut T)>,
}

impl<T> NoOpEventHandler<T> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Default for NoOpEventHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventHandler<T> for NoOpEventHandler<T>
where
    T: Send + Sync,
{
    fn on_event(
        &mut self,
        _event: &mut T,
        _sequence: i64,
        _end_of_batch: bool,
    ) -> std::result::Result<(), HandlerError> {
        Ok(())
    }
}
