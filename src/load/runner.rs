use std::{sync::mpsc, time::Duration};

use crate::foundation::error::{GifViewError, GifViewResult};

/// Background job submitted to a [`TaskRunner`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Executes jobs off the calling thread.
pub trait TaskRunner: Send + Sync {
    fn spawn(&self, name: &str, job: Job) -> GifViewResult<()>;
}

/// Runs every job on its own named OS thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRunner;

impl TaskRunner for ThreadRunner {
    fn spawn(&self, name: &str, job: Job) -> GifViewResult<()> {
        std::thread::Builder::new()
            .name(name.to_string())
            .spawn(job)
            .map(|_| ())
            .map_err(|e| GifViewError::Io(format!("failed to spawn '{name}': {e}")))
    }
}

/// State of a [`Completion`] observed from the owning thread.
#[derive(Debug)]
pub enum TaskStatus<T> {
    /// The job has not produced a value yet.
    Pending,
    /// The job's value.
    Ready(T),
    /// The job ended without producing a value.
    Abandoned,
}

/// Sending half of a one-shot result, moved into the job.
#[derive(Debug)]
pub struct Completer<T> {
    tx: mpsc::SyncSender<T>,
}

impl<T> Completer<T> {
    pub fn complete(self, value: T) {
        // Receiver gone means nobody is waiting for the result any more.
        let _ = self.tx.send(value);
    }
}

/// Receiving half of a one-shot result, polled by the thread that submitted the job.
#[derive(Debug)]
pub struct Completion<T> {
    rx: mpsc::Receiver<T>,
}

/// Create a connected [`Completer`] / [`Completion`] pair.
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let (tx, rx) = mpsc::sync_channel(1);
    (Completer { tx }, Completion { rx })
}

impl<T> Completion<T> {
    pub fn try_take(&self) -> TaskStatus<T> {
        match self.rx.try_recv() {
            Ok(v) => TaskStatus::Ready(v),
            Err(mpsc::TryRecvError::Empty) => TaskStatus::Pending,
            Err(mpsc::TryRecvError::Disconnected) => TaskStatus::Abandoned,
        }
    }

    /// Block up to `timeout` for the value.
    pub fn wait(&self, timeout: Duration) -> TaskStatus<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(v) => TaskStatus::Ready(v),
            Err(mpsc::RecvTimeoutError::Timeout) => TaskStatus::Pending,
            Err(mpsc::RecvTimeoutError::Disconnected) => TaskStatus::Abandoned,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/load/runner.rs"]
mod tests;
