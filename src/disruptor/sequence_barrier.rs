//! Sequence barrier: consumer-side waiting with alert support
//!
//! A barrier blocks its single owning consumer until the producer cursor
//! and every dependent consumer sequence have reached a target, and
//! carries the alert flag used to preempt waits during shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::disruptor::wait_strategy::{dependent_sequence, AlertCheck};
use crate::disruptor::{DisruptorError, Result, Sequence, Sequencer, WaitStrategy};

/// Barrier over the producer cursor and a set of dependent sequences
#[derive(Debug)]
pub struct ProcessingSequenceBarrier {
    cursor: Arc<Sequence>,
    wait_strategy: Arc<dyn WaitStrategy>,
    dependents: Vec<Arc<Sequence>>,
    sequencer: Arc<dyn Sequencer>,
    alerted: AtomicBool,
}

impl ProcessingSequenceBarrier {
    /// Wire a barrier to a sequencer's cursor, the given dependent
    /// sequences, and the shared wait strategy.
    pub fn new(
        cursor: Arc<Sequence>,
        wait_strategy: Arc<dyn WaitStrategy>,
        dependents: Vec<Arc<Sequence>>,
        sequencer: Arc<dyn Sequencer>,
    ) -> Self {
        Self {
            cursor,
            wait_strategy,
            dependents,
            sequencer,
            alerted: AtomicBool::new(false),
        }
    }

    /// Wait for `sequence` to become consumable.
    ///
    /// Returns the highest contiguously published sequence at or beyond
    /// the target, or a smaller value when a timeout-capable strategy
    /// gave up early. Fails with `Alert` when the barrier is alerted
    /// before or during the wait.
    pub fn wait_for(&self, sequence: i64) -> Result<i64> {
        self.check_alert()?;

        let available =
            self.wait_strategy
                .wait_for(sequence, &self.cursor, &self.dependents, self)?;

        if available < sequence {
            return Ok(available);
        }

        Ok(self
            .sequencer
            .highest_published_sequence(sequence, available))
    }

    /// The effective sequence visible through this barrier: the minimum
    /// of the cursor and all dependents.
    pub fn get_cursor(&self) -> i64 {
        dependent_sequence(&self.cursor, &self.dependents)
    }

    /// Alert the barrier, waking any blocked waiter.
    pub fn alert(&self) {
        self.alerted.store(true, Ordering::Release);
        self.wait_strategy.signal_all_when_blocking();
    }

    /// Clear the alert flag so the barrier can be waited on again.
    pub fn clear_alert(&self) {
        self.alerted.store(false, Ordering::Release);
    }

    /// Whether the barrier is currently alerted.
    pub fn is_alerted(&self) -> bool {
        self.alerted.load(Ordering::Acquire)
    }
}

impl AlertCheck for ProcessingSequenceBarrier {
    fn check_alert(&self) -> Result<()> {
        if self.is_alerted() {
            Err(DisruptorError::Alert)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::{BusySpinWaitStrategy, SingleProducerSequencer};
    use std::thread;
    use std::time::Duration;

    fn barrier_over(
        sequencer: &Arc<SingleProducerSequencer>,
        dependents: Vec<Arc<Sequence>>,
    ) -> ProcessingSequenceBarrier {
        ProcessingSequenceBarrier::new(
            sequencer.cursor_sequence(),
            sequencer.wait_strategy(),
            dependents,
            Arc::clone(sequencer) as Arc<dyn Sequencer>,
        )
    }

    fn sequencer() -> Arc<SingleProducerSequencer> {
        Arc::new(
            SingleProducerSequencer::new(16, Arc::new(BusySpinWaitStrategy::new())).unwrap(),
        )
    }

    #[test]
    fn test_wait_for_published_sequence() {
        let sequencer = sequencer();
        let barrier = barrier_over(&sequencer, vec![]);

        for _ in 0..3 {
            let sequence = sequencer.next().unwrap();
            sequencer.publish(sequence);
        }

        assert_eq!(barrier.wait_for(0).unwrap(), 2);
        assert_eq!(barrier.wait_for(2).unwrap(), 2);
    }

    #[test]
    fn test_dependents_gate_the_barrier() {
        let dependent = Arc::new(Sequence::new(1));
        let sequencer = sequencer();
        let barrier = barrier_over(&sequencer, vec![Arc::clone(&dependent)]);

        for _ in 0..5 {
            let sequence = sequencer.next().unwrap();
            sequencer.publish(sequence);
        }

        // Cursor is at 4 but the dependent has only reached 1.
        assert_eq!(barrier.wait_for(0).unwrap(), 1);
        assert_eq!(barrier.get_cursor(), 1);

        dependent.set(4);
        assert_eq!(barrier.wait_for(2).unwrap(), 4);
        assert_eq!(barrier.get_cursor(), 4);
    }

    #[test]
    fn test_alert_preempts_wait() {
        let barrier = Arc::new(barrier_over(&sequencer(), vec![]));

        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.wait_for(0))
        };

        thread::sleep(Duration::from_millis(10));
        barrier.alert();

        assert!(matches!(waiter.join().unwrap(), Err(DisruptorError::Alert)));
    }

    #[test]
    fn test_alert_flag_lifecycle() {
        let barrier = barrier_over(&sequencer(), vec![]);

        assert!(!barrier.is_alerted());
        assert!(barrier.check_alert().is_ok());

        barrier.alert();
        assert!(barrier.is_alerted());
        assert!(matches!(barrier.check_alert(), Err(DisruptorError::Alert)));
        assert!(matches!(barrier.wait_for(0), Err(DisruptorError::Alert)));

        barrier.clear_alert();
        assert!(!barrier.is_alerted());
        assert!(barrier.check_alert().is_ok());
    }
}
