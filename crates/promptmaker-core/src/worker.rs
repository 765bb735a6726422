//! Running a generation off the interactive thread.
//!
//! The worker is a tokio task that publishes exactly one outcome on a
//! single-slot channel. The foreground owns the receiving end and picks the
//! outcome up on its own turn, so no UI state is ever touched by the worker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::{PromptError, Result, ServiceError};
use crate::generator::PromptGenerator;
use crate::input::GenerationRequest;
use crate::types::GenerationResult;

/// A generation in flight.
pub struct GenerationTask {
    rx: Option<oneshot::Receiver<Result<GenerationResult>>>,
    started: Instant,
}

impl GenerationTask {
    /// Start `generate` on a background task. Must be called inside a tokio runtime.
    pub fn spawn(generator: Arc<PromptGenerator>, request: GenerationRequest) -> Self {
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let outcome = generator.generate(&request).await;
            if tx.send(outcome).is_err() {
                tracing::debug!("Generation finished after its receiver was dropped");
            }
        });

        Self {
            rx: Some(rx),
            started: Instant::now(),
        }
    }

    /// Time since the task was started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Take the outcome if it is ready, without waiting.
    ///
    /// Returns `Some` exactly once; after that the task is done and every
    /// further call returns `None`.
    pub fn try_take(&mut self) -> Option<Result<GenerationResult>> {
        let rx = self.rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(worker_stopped()),
        };
        self.rx = None;
        Some(outcome)
    }
}

fn worker_stopped() -> PromptError {
    ServiceError::unavailable("generation worker stopped before producing a result").into()
}
