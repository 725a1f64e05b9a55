use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Task = Box<dyn FnOnce() + Send>;

/// Cooperative "run after the current synchronous turn" queue. Not a timer:
/// the only contract is that scheduled work runs when the driver flushes,
/// after the turn that scheduled it has finished.
#[derive(Clone, Default)]
pub struct DeferredQueue {
    tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        self.lock_tasks().push_back(Box::new(task));
    }

    /// Drains until empty and returns how many tasks ran. Tasks scheduled by
    /// a running task are drained in the same flush; the lock is released
    /// while each task runs so they may schedule freely.
    pub fn flush(&self) -> usize {
        let mut ran = 0;
        loop {
            let Some(task) = self.lock_tasks().pop_front() else {
                return ran;
            };
            task();
            ran += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock_tasks().is_empty()
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, VecDeque<Task>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn scheduled_work_waits_for_flush() {
        let queue = DeferredQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let counter = counter.clone();
            queue.schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(queue.flush(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn tasks_scheduled_mid_flush_run_in_the_same_flush() {
        let queue = DeferredQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let inner_queue = queue.clone();
            let counter = counter.clone();
            queue.schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let counter = counter.clone();
                inner_queue.schedule(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            });
        }

        assert_eq!(queue.flush(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
