//! Long-running operation poller
//!
//! After a mutating call returns, the poller re-reads the watched entity at a
//! fixed interval and reports each observed state until the entity is ready.

use std::time::Duration;

use log::debug;
use tokio::sync::{mpsc, watch};

use crate::config::poll;
use crate::error::{CloudError, Result};

/// One progress update for the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    /// Terminal event; the renderer stops on the first one
    pub ready: bool,
}

impl ProgressEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ready: false,
        }
    }

    pub fn ready() -> Self {
        Self {
            message: String::new(),
            ready: true,
        }
    }
}

/// Edge detector over observed state names.
///
/// A terminal reading only counts after at least one non-terminal reading, so
/// a stale "running" observed before the mutation took effect is ignored.
#[derive(Debug, Default)]
pub struct ReadinessLatch {
    initialized: bool,
}

impl ReadinessLatch {
    /// Record a state; true when the operation should be considered ready
    pub fn observe(&mut self, state: &str) -> bool {
        let terminal = state.eq_ignore_ascii_case(poll::TERMINAL_STATE);
        if !terminal {
            self.initialized = true;
        }
        terminal && self.initialized
    }
}

/// Sender side of an operator cancellation
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiver side of an operator cancellation
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; never resolves if the handle is dropped without cancelling
    pub async fn cancelled(&mut self) {
        let signalled = self.rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if !signalled {
            std::future::pending::<()>().await;
        }
    }
}

/// Linked cancellation handle and token
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Something whose state can be re-read on every poll tick
#[allow(async_fn_in_trait)]
pub trait WatchTarget {
    /// Current state name of the watched entity
    async fn observe(&mut self) -> Result<String>;

    /// Status line shown for a non-terminal state
    fn status_message(&self, state: &str) -> String {
        format!("Status: {}", state)
    }

    /// Final piece of work once ready; its outcome is reported, never fatal
    async fn on_ready(&mut self) -> Option<String> {
        None
    }
}

/// Drives a watch to completion at a fixed interval
#[derive(Debug, Clone, Copy)]
pub struct OperationPoller {
    interval: Duration,
}

impl Default for OperationPoller {
    fn default() -> Self {
        Self::new(poll::INTERVAL)
    }
}

impl OperationPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until the target is ready, reporting each tick on `events`.
    ///
    /// Every tick sleeps first. Any error aborts the watch; there is no per-tick retry
    /// and no overall timeout. Returns the `on_ready` result.
    pub async fn watch<T: WatchTarget>(
        &self,
        target: &mut T,
        events: &mpsc::Sender<ProgressEvent>,
        cancel: &mut CancelToken,
    ) -> Result<Option<String>> {
        let mut latch = ReadinessLatch::default();

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = cancel.cancelled() => {
                    debug!("Watch cancelled while waiting");
                    return Err(CloudError::Cancelled);
                }
            }

            let state = target.observe().await?;
            debug!("Observed state '{}'", state);

            if latch.observe(&state) {
                let result = target.on_ready().await;
                Self::send(events, ProgressEvent::ready(), cancel).await?;
                return Ok(result);
            }

            let message = target.status_message(&state);
            Self::send(events, ProgressEvent::status(message), cancel).await?;
        }
    }

    async fn send(
        events: &mpsc::Sender<ProgressEvent>,
        event: ProgressEvent,
        cancel: &mut CancelToken,
    ) -> Result<()> {
        tokio::select! {
            sent = events.send(event) => sent.map_err(|_| CloudError::Cancelled),
            _ = cancel.cancelled() => Err(CloudError::Cancelled),
        }
    }
}
