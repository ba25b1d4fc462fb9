//! Cancellation signal threaded through every gateway call.
//!
//! Backed by a `tokio::sync::watch` channel: the handle flips the value to
//! `true` once and every cloned `Cancellation` observes it.

use crate::error::ApiError;
use std::future::Future;
use tokio::sync::watch;

/// Fires the paired [`Cancellation`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation requested through a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle/signal pair.
pub fn channel() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

impl Cancellation {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without cancelling.
                futures::future::pending::<()>().await;
            }
        }
    }

    /// Drive `fut` to completion unless cancellation fires first.
    ///
    /// A cancelled future is dropped, which releases any HTTP connection it
    /// held.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ApiError::Cancelled),
            res = fut => res,
        }
    }
}
