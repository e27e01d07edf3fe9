//! Background run-list poller.
//!
//! Fetches the list of available runs immediately, then again every
//! interval for as long as the list comes back empty. The loop ends on
//! the first non-empty list, on the first error, or when its handle is
//! stopped or dropped. Errors are terminal; they are not retried.

use crate::{
    error::{InsightsError, InsightsResult},
    model::Run,
    store::InsightsStore,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};

/// Anything that can list the available runs.
pub trait RunSource: Send + Sync + 'static {
    fn list_runs(&self) -> InsightsResult<Vec<Run>>;
}

/// Run source backed by a SQLite store.
pub struct StoreRunSource {
    store: Mutex<InsightsStore>,
    limit: usize,
}

impl StoreRunSource {
    pub fn new(store: InsightsStore, limit: usize) -> Self {
        Self { store: Mutex::new(store), limit }
    }
}

impl RunSource for StoreRunSource {
    fn list_runs(&self) -> InsightsResult<Vec<Run>> {
        let store = self
            .store
            .lock()
            .map_err(|_| InsightsError::Other(anyhow::anyhow!("run store lock poisoned")))?;
        store.list_runs(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    /// Still waiting; `attempts` fetches so far returned no runs.
    Polling { attempts: u32 },
    Ready(Vec<Run>),
    /// User-visible failure message.
    Failed(String),
    Stopped,
}

impl PollStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling { .. })
    }
}

pub struct RunListPoller;

impl RunListPoller {
    /// Start polling on the current tokio runtime.
    pub fn spawn(source: Arc<dyn RunSource>, interval: Duration) -> PollHandle {
        let (status_tx, status_rx) = watch::channel(PollStatus::Polling { attempts: 0 });
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(source, interval, status_tx, shutdown_rx));
        PollHandle {
            status: status_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

async fn poll_loop(
    source: Arc<dyn RunSource>,
    interval: Duration,
    status: watch::Sender<PollStatus>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::debug!("run-list poller stopped after {attempts} attempt(s)");
                status.send_replace(PollStatus::Stopped);
                return;
            }
            _ = ticker.tick() => {}
        }

        attempts += 1;
        let fetch_source = Arc::clone(&source);
        let outcome = tokio::task::spawn_blocking(move || fetch_source.list_runs()).await;
        match outcome {
            Ok(Ok(runs)) if !runs.is_empty() => {
                log::info!("run list available: {} run(s) after {attempts} attempt(s)", runs.len());
                status.send_replace(PollStatus::Ready(runs));
                return;
            }
            Ok(Ok(_)) => {
                log::debug!("no runs yet (attempt {attempts}); retrying in {interval:?}");
                status.send_replace(PollStatus::Polling { attempts });
            }
            Ok(Err(e)) => {
                log::warn!("run-list fetch failed: {e}");
                status.send_replace(PollStatus::Failed(format!("Failed to load runs: {e}")));
                return;
            }
            Err(e) => {
                log::warn!("run-list fetch task aborted: {e}");
                status.send_replace(PollStatus::Failed(format!("Failed to load runs: {e}")));
                return;
            }
        }
    }
}

/// Owner of a running poll loop. Dropping it tears the loop down.
pub struct PollHandle {
    status: watch::Receiver<PollStatus>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn status(&self) -> PollStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollStatus> {
        self.status.clone()
    }

    /// Wait until the loop reaches a terminal state.
    pub async fn wait(&mut self) -> PollStatus {
        loop {
            let current = self.status.borrow_and_update().clone();
            if current.is_terminal() {
                return current;
            }
            if self.status.changed().await.is_err() {
                return self.status.borrow().clone();
            }
        }
    }

    /// Stop polling and return the final status. A loop that already
    /// finished keeps its terminal status.
    pub async fn stop(mut self) -> PollStatus {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.status.borrow().clone()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
