//! Cooperative task queue.
//!
//! The renderer is single-threaded. Work that must happen "after the current
//! synchronous pass" (the `mounted` notification, deferred streams) is queued
//! here and runs when the embedder calls [`Scheduler::run_pending`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

type Task = Box<dyn FnOnce()>;

/// Shared FIFO of deferred tasks.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Rc<RefCell<VecDeque<Task>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run queued tasks until the queue is empty, including tasks queued by
    /// the tasks being run. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.queue.borrow_mut().pop_front();
            let Some(task) = task else { break };
            task();
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "scheduler drained");
        }
        ran
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_runs_in_order_including_nested() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let (o1, o2) = (order.clone(), order.clone());
        let nested = scheduler.clone();
        scheduler.schedule(move || {
            o1.borrow_mut().push(1);
            let o3 = o1.clone();
            nested.schedule(move || o3.borrow_mut().push(3));
        });
        scheduler.schedule(move || o2.borrow_mut().push(2));

        assert_eq!(scheduler.pending(), 2);
        assert_eq!(scheduler.run_pending(), 3);
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_cancelled_work_checks_its_own_flag() {
        let scheduler = Scheduler::new();
        let cancelled = Rc::new(Cell::new(false));
        let ran = Rc::new(Cell::new(false));

        let (c, r) = (cancelled.clone(), ran.clone());
        scheduler.schedule(move || {
            if !c.get() {
                r.set(true);
            }
        });
        cancelled.set(true);

        assert_eq!(scheduler.run_pending(), 1);
        assert!(!ran.get());
    }
}
