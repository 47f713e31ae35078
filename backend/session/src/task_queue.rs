//! FIFO queue of asynchronous session operations.
//!
//! Tasks run one at a time on a dedicated worker, each starting only after its
//! predecessor has settled. A task that fails or panics is reported through its
//! ticket and the queue moves on to the next one.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

type BoxedTask = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// How a queued task settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(String),
    Panicked(String),
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed)
    }
}

struct QueuedTask {
    id: u64,
    name: &'static str,
    future: BoxedTask,
    done: oneshot::Sender<TaskOutcome>,
}

/// Resolves once the enqueued task has settled.
#[derive(Debug)]
pub struct TaskTicket {
    id: u64,
    rx: oneshot::Receiver<TaskOutcome>,
}

impl TaskTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn settled(self) -> TaskOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| TaskOutcome::Failed("task queue shut down".to_string()))
    }
}

/// Serializes tasks so that at most one body executes at any instant.
///
/// Must be created inside a Tokio runtime; the worker stops once the queue is
/// dropped and every task already enqueued has run.
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<QueuedTask>,
    next_id: AtomicU64,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx));
        Self {
            tx,
            next_id: AtomicU64::new(1),
        }
    }

    /// Append `task` to the chain. It is not polled until every previously
    /// enqueued task has settled.
    pub fn enqueue<F>(&self, name: &'static str, task: F) -> TaskTicket
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (done, rx) = oneshot::channel();
        let queued = QueuedTask {
            id,
            name,
            future: Box::pin(task),
            done,
        };
        if self.tx.send(queued).is_err() {
            warn!(task_id = id, task = name, "Task queue worker is gone, dropping task");
        } else {
            debug!(task_id = id, task = name, "Task enqueued");
        }
        TaskTicket { id, rx }
    }

    /// Wait until every task enqueued before this call has settled.
    pub async fn idle(&self) {
        self.enqueue("idle", async { Ok(()) }).settled().await;
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<QueuedTask>) {
    while let Some(task) = rx.recv().await {
        debug!(task_id = task.id, task = task.name, "Task started");

        let outcome = match AssertUnwindSafe(task.future).catch_unwind().await {
            Ok(Ok(())) => TaskOutcome::Completed,
            Ok(Err(e)) => {
                warn!(task_id = task.id, task = task.name, error = %e, "Task failed");
                TaskOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!(task_id = task.id, task = task.name, panic = %msg, "Task panicked");
                TaskOutcome::Panicked(msg)
            }
        };

        debug!(task_id = task.id, task = task.name, ?outcome, "Task settled");
        let _ = task.done.send(outcome);
    }
    debug!("Task queue closed, worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
