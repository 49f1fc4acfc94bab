//! Cross-thread task queue drained on the core thread.

use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Boxed unit of work for the core thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

type Notifier = Arc<dyn Fn() + Send + Sync + 'static>;

/// Buffers tasks submitted from any thread until the core thread drains them.
///
/// There is no blocking wait: the owner of the core loop calls
/// [`ExtensionExecutor::execute_pending`] when notified or once per frame.
#[derive(Default)]
pub struct ExtensionExecutor {
    queue: Mutex<VecDeque<Task>>,
    notifier: Option<Notifier>,
}

impl ExtensionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor that calls `notifier` after every enqueue, so the
    /// host can schedule a drain on its core thread.
    pub fn with_notifier(notifier: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notifier: Some(Arc::new(notifier)),
        }
    }

    /// Queues one task. Safe to call from any thread, including from a task
    /// that is currently running.
    pub fn enqueue(&self, task: impl FnOnce() + Send + 'static) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Box::new(task));
        if let Some(notifier) = &self.notifier {
            notifier();
        }
    }

    /// Runs queued tasks in FIFO order until the queue is empty.
    ///
    /// Tasks queued while draining run in the same pass. Returns the number
    /// of executed tasks.
    pub fn execute_pending(&self) -> usize {
        let mut executed = 0;
        loop {
            // Lock scope ends before the task runs.
            let next = self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            executed += 1;
        }
        if executed > 0 {
            debug!("event=executor_drain module=runtime status=ok executed={executed}");
        }
        executed
    }

    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::ExtensionExecutor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn drains_in_fifo_order() {
        let executor = ExtensionExecutor::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let seen = Arc::clone(&seen);
            executor.enqueue(move || seen.lock().unwrap().push(i));
        }
        assert_eq!(executor.pending(), 3);
        assert_eq!(executor.execute_pending(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(executor.pending(), 0);
    }

    #[test]
    fn tasks_enqueued_while_draining_run_in_same_pass() {
        let executor = Arc::new(ExtensionExecutor::new());
        let count = Arc::new(AtomicUsize::new(0));
        {
            let inner_executor = Arc::clone(&executor);
            let count = Arc::clone(&count);
            executor.enqueue(move || {
                count.fetch_add(1, Ordering::SeqCst);
                let count = Arc::clone(&count);
                inner_executor.enqueue(move || {
                    count.fetch_add(1, Ordering::SeqCst);
                });
            });
        }
        assert_eq!(executor.execute_pending(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn notifier_fires_per_enqueue() {
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        let executor = ExtensionExecutor::with_notifier(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        executor.enqueue(|| {});
        executor.enqueue(|| {});
        assert_eq!(notified.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn accepts_tasks_from_other_threads() {
        let executor = Arc::new(ExtensionExecutor::new());
        let count = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let executor = Arc::clone(&executor);
                let count = Arc::clone(&count);
                std::thread::spawn(move || {
                    executor.enqueue(move || {
                        count.fetch_add(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(executor.execute_pending(), 4);
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }
}
