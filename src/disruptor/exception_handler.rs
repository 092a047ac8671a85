//! Exception handler contracts
//!
//! When a handler callback fails, the processor routes the error here.
//! The handler decides the fate of the failed sequence explicitly: skip
//! it, retry it, or escalate and end the run.

use crate::disruptor::{DisruptorError, HandlerError, Result};

/// What the processor should do with a sequence whose handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionOutcome {
    /// Advance the consumer sequence past the failed event. Keeps the
    /// producer's gating invariant intact at the cost of a lost event.
    Skip,
    /// Leave the consumer sequence untouched and re-attempt the same
    /// event.
    Retry,
}

/// Handler for errors raised by event-handler callbacks
pub trait ExceptionHandler<T>: Send + Sync {
    /// Handle an error from `on_event` or `on_batch_start` at `sequence`.
    ///
    /// Returning an outcome resumes the processing loop with the chosen
    /// policy; returning an error escalates it and ends the run.
    fn handle_event_exception(
        &self,
        error: HandlerError,
        sequence: i64,
        event: &T,
    ) -> Result<ExceptionOutcome>;

    /// Handle an error from `on_start`. An error return aborts the run
    /// before the processing loop begins.
    fn handle_on_start_exception(&self, error: HandlerError) -> Result<()>;

    /// Handle an error from `on_shutdown`.
    fn handle_on_shutdown_exception(&self, error: HandlerError) -> Result<()>;
}

/// Default policy: wrap the cause with the sequence and escalate
///
/// The processor treats the escalated error as irrecoverable; `run()`
/// returns it after the shutdown callbacks have executed.
#[derive(Debug, Default)]
pub struct DefaultExceptionHandler<T> {
    _phantom: std::marker::PhantomData<fn(&T)>,
}

impl<T> DefaultExceptionHandler<T> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> ExceptionHandler<T> for DefaultExceptionHandler<T>
where
    T: Send + Sync,
{
    fn handle_event_exception(
        &self,
        error: HandlerError,
        sequence: i64,
        _event: &T,
    ) -> Result<ExceptionOutcome> {
        Err(DisruptorError::FatalEvent {
            sequence,
            cause: error,
        })
    }

    fn handle_on_start_exception(&self, error: HandlerError) -> Result<()> {
        Err(DisruptorError::FatalStartup(error))
    }

    fn handle_on_shutdown_exception(&self, error: HandlerError) -> Result<()> {
        Err(DisruptorError::FatalShutdown(error))
    }
}

/// Policy that logs and drops every error, skipping failed sequences
///
/// Use with care: a misbehaving handler becomes invisible apart from the
/// log. Mainly useful when losing an event is preferable to stalling the
/// pipeline.
#[derive(Debug, Default)]
pub struct IgnoreExceptionHandler<T> {
    _phantom: std::marker::PhantomData<fn(&T)>,
}

impl<T> IgnoreExceptionHandler<T> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> ExceptionHandler<T> for IgnoreExceptionHandler<T>
where
    T: Send + Sync,
{
    fn handle_event_exception(
        &self,
        error: HandlerError,
        sequence: i64,
        _event: &T,
    ) -> Result<ExceptionOutcome> {
        tracing::warn!(sequence, %error, "skipping event after handler error");
        Ok(ExceptionOutcome::Skip)
    }

    fn handle_on_start_exception(&self, error: HandlerError) -> Result<()> {
        tracing::warn!(%error, "ignoring startup error");
        Ok(())
    }

    fn handle_on_shutdown_exception(&self, error: HandlerError) -> Result<()> {
        tracing::warn!(%error, "ignoring shutdown error");
        Ok(())
    }
}

/// Exception handler assembled from closures
pub struct ClosureExceptionHandler<T, F>
where
    F: Fn(HandlerError, i64, &T) -> Result<ExceptionOutcome> + Send + Sync,
{
    on_event_error: F,
    _phantom: std::marker::PhantomData<fn(&T)>,
}

impl<T, F> ClosureExceptionHandler<T, F>
where
    F: Fn(HandlerError, i64, &T) -> Result<ExceptionOutcome> + Send + Sync,
{
    /// Build a handler from an event-error closure; start and shutdown
    /// errors are escalated as in the default policy.
    pub fn new(on_event_error: F) -> Self {
        Self {
            on_event_error,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, F> ExceptionHandler<T> for ClosureExceptionHandler<T, F>
where
    T: Send + Sync,
    F: Fn(HandlerError, i64, &T) -> Result<ExceptionOutcome> + Send + Sync,
{
    fn handle_event_exception(
        &self,
        error: HandlerError,
        sequence: i64,
        event: &T,
    ) -> Result<ExceptionOutcome> {
        (self.on_event_error)(error, sequence, event)
    }

    fn handle_on_start_exception(&self, error: HandlerError) -> Result<()> {
        Err(DisruptorError::FatalStartup(error))
    }

    fn handle_on_shutdown_exception(&self, error: HandlerError) -> Result<()> {
        Err(DisruptorError::FatalShutdown(error))
    }
}
