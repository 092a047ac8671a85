//! Wait strategies
//!
//! A wait strategy decides how a consumer stalls until its next target
//! sequence is observable and how a producer backs off when the ring is
//! full. Strategies trade CPU usage against wake-up latency; all of them
//! must poll the barrier's alert flag so `halt()` can preempt a wait.

use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::Duration;

use crate::disruptor::{Result, Sequence};
use std::sync::Arc;

/// The alert-facing view of a sequence barrier handed to wait strategies.
///
/// Strategies call [`check_alert`](AlertCheck::check_alert) on every
/// iteration of their wait loop; an `Err(Alert)` unwinds the wait so the
/// owning processor can observe a halt request.
pub trait AlertCheck {
    /// Fails with [`DisruptorError::Alert`](crate::disruptor::DisruptorError::Alert)
    /// when the owning barrier has been alerted.
    fn check_alert(&self) -> Result<()>;
}

/// Minimum of the cursor and all dependent sequences.
///
/// With no dependents the cursor alone bounds what is consumable; with
/// dependents the slowest of them does.
#[inline]
pub fn dependent_sequence(cursor: &Sequence, dependents: &[Arc<Sequence>]) -> i64 {
    if dependents.is_empty() {
        cursor.get()
    } else {
        cursor.get().min(Sequence::get_minimum_sequence(dependents))
    }
}

/// Strategy for waiting until a target sequence becomes observable
pub trait WaitStrategy: Send + Sync + std::fmt::Debug {
    /// Block until `min(cursor, dependents) >= sequence` and return that
    /// minimum, which may exceed the requested sequence.
    ///
    /// Implementations must invoke `barrier.check_alert()` periodically;
    /// the resulting `Err(Alert)` is the only way a blocked consumer
    /// observes shutdown.
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependents: &[Arc<Sequence>],
        barrier: &dyn AlertCheck,
    ) -> Result<i64>;

    /// Wake any threads suspended in `wait_for`. No-op for strategies
    /// that never sleep on a primitive.
    fn signal_all_when_blocking(&self);

    /// Back-off hint invoked by the sequencer while the ring is full.
    fn producer_wait(&self);
}

/// Busy-spin strategy: lowest latency, one core pinned at 100%
///
/// Each iteration issues the architecture's CPU relaxation hint (a
/// pause on x86, a yield on ARM) via `std::hint::spin_loop`.
#[derive(Debug, Default)]
pub struct BusySpinWaitStrategy;

impl BusySpinWaitStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl WaitStrategy for BusySpinWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependents: &[Arc<Sequence>],
        barrier: &dyn AlertCheck,
    ) -> Result<i64> {
        let mut available_sequence = dependent_sequence(cursor, dependents);
        while available_sequence < sequence {
            barrier.check_alert()?;
            std::hint::spin_loop();
            available_sequence = dependent_sequence(cursor, dependents);
        }
        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {}

    fn producer_wait(&self) {
        std::hint::spin_loop();
    }
}

/// Yielding strategy: a bounded spin, then yield the scheduler slot
#[derive(Debug)]
pub struct YieldingWaitStrategy {
    spin_tries: u32,
}

impl YieldingWaitStrategy {
    pub fn new() -> Self {
        Self { spin_tries: 100 }
    }

    /// Number of spin iterations before each yield.
    pub fn with_spin_tries(spin_tries: u32) -> Self {
        Self { spin_tries }
    }
}

impl Default for YieldingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for YieldingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependents: &[Arc<Sequence>],
        barrier: &dyn AlertCheck,
    ) -> Result<i64> {
        let mut counter = self.spin_tries;
        let mut available_sequence = dependent_sequence(cursor, dependents);
        while available_sequence < sequence {
            barrier.check_alert()?;
            if counter > 0 {
                counter -= 1;
                std::hint::spin_loop();
            } else {
                thread::yield_now();
            }
            available_sequence = dependent_sequence(cursor, dependents);
        }
        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {}

    fn producer_wait(&self) {
        thread::yield_now();
    }
}

/// Sleeping strategy: poll with a fixed sleep between checks
#[derive(Debug)]
pub struct SleepingWaitStrategy {
    sleep_duration: Duration,
}

impl SleepingWaitStrategy {
    pub fn new() -> Self {
        Self {
            sleep_duration: Duration::from_millis(1),
        }
    }

    pub fn with_duration(sleep_duration: Duration) -> Self {
        Self { sleep_duration }
    }
}

impl Default for SleepingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for SleepingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependents: &[Arc<Sequence>],
        barrier: &dyn AlertCheck,
    ) -> Result<i64> {
        let mut available_sequence = dependent_sequence(cursor, dependents);
        while available_sequence < sequence {
            barrier.check_alert()?;
            thread::sleep(self.sleep_duration);
            available_sequence = dependent_sequence(cursor, dependents);
        }
        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {}

    fn producer_wait(&self) {
        thread::sleep(self.sleep_duration);
    }
}

/// Blocking strategy: condvar suspension, woken by `publish` and `alert`
///
/// The wait is bounded so a signal raised between the availability check
/// and the suspension cannot be lost for longer than the timeout.
#[derive(Debug, Default)]
pub struct BlockingWaitStrategy {
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl BlockingWaitStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaitStrategy for BlockingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependents: &[Arc<Sequence>],
        barrier: &dyn AlertCheck,
    ) -> Result<i64> {
        let mut available_sequence = dependent_sequence(cursor, dependents);
        if available_sequence >= sequence {
            return Ok(available_sequence);
        }

        let mut guard = self.mutex.lock().expect("wait strategy mutex poisoned");
        loop {
            barrier.check_alert()?;
            available_sequence = dependent_sequence(cursor, dependents);
            if available_sequence >= sequence {
                return Ok(available_sequence);
            }
            let (returned, _timeout) = self
                .condvar
                .wait_timeout(guard, Duration::from_millis(1))
                .expect("wait strategy mutex poisoned");
            guard = returned;
        }
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock().expect("wait strategy mutex poisoned");
        self.condvar.notify_all();
    }

    fn producer_wait(&self) {
        thread::yield_now();
    }
}
