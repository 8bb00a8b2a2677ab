//! Step pacing and progress reporting for session pipelines.
//!
//! A [`StepPacer`] is driven by the pipeline; the paired [`PacerHandle`] lets a
//! caller observe progress and cancel between steps.

use crate::error::{SessionError, SessionResult};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// A named pipeline step and the progress it represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub index: usize,
    pub label: &'static str,
    pub percent: u8,
}

/// Steps of the encryption pipeline.
pub const ENCRYPTION_STEPS: [Step; 3] = [
    Step { index: 0, label: "Initializing encryption context", percent: 33 },
    Step { index: 1, label: "Generating encryption keys", percent: 66 },
    Step { index: 2, label: "Encrypting data", percent: 100 },
];

/// Steps of the decryption pipeline.
pub const DECRYPTION_STEPS: [Step; 4] = [
    Step { index: 0, label: "Validating secret key", percent: 25 },
    Step { index: 1, label: "Loading encryption context", percent: 50 },
    Step { index: 2, label: "Decrypting data", percent: 75 },
    Step { index: 3, label: "Decryption complete", percent: 100 },
];

/// Latest progress published by a pacer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub step: Option<Step>,
    pub completed: bool,
}

/// Caller side: observe progress, request cancellation.
#[derive(Debug)]
pub struct PacerHandle {
    cancel_tx: watch::Sender<bool>,
    progress_rx: watch::Receiver<Progress>,
}

impl PacerHandle {
    /// Requests cancellation; the pipeline stops at its next step boundary.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Snapshot of the most recent progress.
    pub fn progress(&self) -> Progress {
        *self.progress_rx.borrow()
    }

    /// A receiver that wakes on every progress change.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress_rx.clone()
    }
}

/// Pipeline side: announces steps and waits out their delay.
#[derive(Debug)]
pub struct StepPacer {
    cancel_rx: watch::Receiver<bool>,
    progress_tx: watch::Sender<Progress>,
}

impl StepPacer {
    pub fn new() -> (PacerHandle, StepPacer) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (progress_tx, progress_rx) = watch::channel(Progress::default());

        let handle = PacerHandle {
            cancel_tx,
            progress_rx,
        };
        let pacer = StepPacer {
            cancel_rx,
            progress_tx,
        };
        (handle, pacer)
    }

    /// Fails with `Cancelled` if cancellation was requested.
    pub fn check(&self) -> SessionResult<()> {
        if *self.cancel_rx.borrow() {
            return Err(SessionError::Cancelled);
        }
        Ok(())
    }

    /// Publishes `step`, then waits `delay` unless cancelled first.
    ///
    /// A dropped handle never cancels; the delay simply runs out.
    pub async fn step(&mut self, step: Step, delay: Duration) -> SessionResult<()> {
        self.check()?;
        self.progress_tx.send_replace(Progress {
            step: Some(step),
            completed: false,
        });
        debug!("step {}: {} ({}%)", step.index + 1, step.label, step.percent);

        if delay.is_zero() {
            return self.check();
        }

        let cancel_rx = &mut self.cancel_rx;
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            true = async { cancel_rx.wait_for(|cancelled| *cancelled).await.is_ok() } => {
                Err(SessionError::Cancelled)
            }
        }
    }

    /// Publishes the closing `step`, waits `delay` and finishes.
    ///
    /// Cancellation is not honoured here: the pipeline's work is already done.
    pub async fn conclude(&mut self, step: Step, delay: Duration) {
        self.progress_tx.send_replace(Progress {
            step: Some(step),
            completed: false,
        });
        debug!("step {}: {} ({}%)", step.index + 1, step.label, step.percent);
        tokio::time::sleep(delay).await;
        self.finish();
    }

    /// Marks the pipeline as finished.
    pub fn finish(&self) {
        self.progress_tx.send_modify(|progress| progress.completed = true);
    }
}
