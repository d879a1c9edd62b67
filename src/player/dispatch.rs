use std::{
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

/// Unit of work posted to another thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on a target thread, in submission order.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

/// FIFO task queue drained by the thread that owns it (the host's UI thread).
///
/// Other threads post through the [`Dispatcher`] returned by [`UiQueue::dispatcher`].
pub struct UiQueue {
    tx: mpsc::Sender<Task>,
    rx: mpsc::Receiver<Task>,
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UiQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn dispatcher(&self) -> Arc<dyn Dispatcher> {
        Arc::new(UiDispatcher {
            tx: self.tx.clone(),
        })
    }

    /// Run every task already queued. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut n = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            n += 1;
        }
        n
    }

    /// Run tasks as they arrive until `timeout` has elapsed.
    pub fn run_for(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut n = 0;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(task) => {
                    task();
                    n += 1;
                }
                Err(_) => break,
            }
        }
        n + self.run_pending()
    }
}

struct UiDispatcher {
    tx: mpsc::Sender<Task>,
}

impl Dispatcher for UiDispatcher {
    fn dispatch(&self, task: Task) {
        // The queue owner may already be gone; frames for a closed queue are dropped.
        if self.tx.send(task).is_err() {
            tracing::trace!("dispatch target closed, dropping task");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/dispatch.rs"]
mod tests;
