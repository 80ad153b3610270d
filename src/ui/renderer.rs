//! Spinner rendering of progress events

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use tokio::sync::mpsc;

use crate::env::ProgressEvent;

/// Why the renderer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A ready event arrived
    Ready,
    /// The operator cancelled
    Cancelled,
    /// The producer went away without signalling ready
    Disconnected,
}

/// Keeps the latest status line on a spinner until the operation is ready
pub struct ProgressRenderer {
    bar: ProgressBar,
    message: String,
}

impl ProgressRenderer {
    pub fn new(initial: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
            .template("{spinner:.blue} {msg}")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self::with_bar(bar, initial)
    }

    /// Renderer that draws nothing
    pub fn hidden(initial: &str) -> Self {
        Self::with_bar(ProgressBar::hidden(), initial)
    }

    fn with_bar(bar: ProgressBar, initial: &str) -> Self {
        bar.set_message(initial.to_string());
        Self {
            bar,
            message: initial.to_string(),
        }
    }

    /// Latest status line
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consume events until ready, cancelled or disconnected
    pub async fn run<F>(
        &mut self,
        events: &mut mpsc::Receiver<ProgressEvent>,
        cancel: F,
    ) -> RenderOutcome
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) if event.ready => {
                        self.bar.finish_and_clear();
                        return RenderOutcome::Ready;
                    }
                    Some(event) => {
                        self.message = event.message;
                        self.bar.set_message(self.message.clone());
                    }
                    None => {
                        debug!("Progress channel closed before ready");
                        self.bar.abandon();
                        return RenderOutcome::Disconnected;
                    }
                },
                _ = &mut cancel => {
                    self.bar.abandon_with_message(format!("{} (cancelled)", self.message));
                    return RenderOutcome::Cancelled;
                }
            }
        }
    }
}

/// Resolves on Ctrl+C; never resolves if the signal cannot be installed
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
