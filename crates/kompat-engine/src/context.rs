//! Cancellable run context
//!
//! Every cluster read a check performs goes through [`RunContext::guard`],
//! so cancelling the run resolves all in-flight reads to
//! [`CheckError::Cancelled`] at once.

use crate::error::CheckError;
use std::future::Future;
use tokio::sync::watch;

/// Per-run context shared (by clone) with every check
#[derive(Debug, Clone)]
pub struct RunContext {
    cancelled: watch::Receiver<bool>,
}

/// Cancels the run it was created with
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the run. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RunContext {
    /// A context that is never cancelled
    pub fn background() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { cancelled: rx }
    }

    /// A context plus the handle that cancels it
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { cancelled: rx }, CancelHandle { tx })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once the run is cancelled; never resolves for a background context
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // handle dropped without cancelling
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` unless the run is cancelled first
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output, CheckError>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(CheckError::Cancelled),
            out = fut => Ok(out),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn background_context_runs_futures() {
        let ctx = RunContext::background();
        assert!(!ctx.is_cancelled());
        let out = ctx.guard(async { 7 }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let (ctx, handle) = RunContext::with_cancel();
        handle.cancel();
        assert!(ctx.is_cancelled());

        let err = ctx.guard(async { 7 }).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_aborts_in_flight_work() {
        let (ctx, handle) = RunContext::with_cancel();

        let slow = ctx.guard(tokio::time::sleep(Duration::from_secs(60)));
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        };

        let (result, _) = tokio::join!(slow, cancel);
        assert!(matches!(result, Err(CheckError::Cancelled)));
    }

    #[tokio::test]
    async fn dropped_handle_never_cancels() {
        let (ctx, handle) = RunContext::with_cancel();
        drop(handle);
        let out = ctx.guard(async { "done" }).await.unwrap();
        assert_eq!(out, "done");
    }
}
