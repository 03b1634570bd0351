//! Hand-back from the background worker to the UI-owning thread
//!
//! The worker never touches UI state. It resolves a [`Pending`] and the
//! result is posted into a [`UiInbox`] that the UI thread drains on its own
//! schedule. Once the inbox is closed or dropped, posting is a silent no-op.

use crate::error::TransportError;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Create a connected poster/inbox pair.
pub fn ui_channel<M>() -> (UiPoster<M>, UiInbox<M>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiPoster { tx }, UiInbox { rx })
}

/// Sending half, safe to move onto any thread
pub struct UiPoster<M> {
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for UiPoster<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> UiPoster<M> {
    /// Post to the UI thread. Returns false if the UI side is gone.
    pub fn post(&self, message: M) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(_) => {
                debug!("UI context gone, dropping completion");
                false
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Receiving half, owned by the UI thread
pub struct UiInbox<M> {
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M> UiInbox<M> {
    /// Take everything posted so far without blocking.
    pub fn drain(&mut self) -> Vec<M> {
        let mut out = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            out.push(message);
        }
        out
    }

    /// Stop accepting posts. Already queued messages are discarded.
    pub fn close(&mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

/// Result of a request that has been queued on the dispatcher
#[must_use = "a Pending does nothing unless awaited or delivered"]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, TransportError>>,
}

impl<T> Pending<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, TransportError>>) -> Self {
        Self { rx }
    }

    /// A pending result that is already failed.
    pub(crate) fn failed(err: TransportError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        Self { rx }
    }
}

impl<T: Send + 'static> Pending<T> {
    /// Resolve on `runtime` and post `map(result)` to the UI thread.
    ///
    /// If the UI side has gone away by the time the result arrives, the
    /// result is dropped.
    pub fn deliver_to<M, F>(self, runtime: &Handle, poster: UiPoster<M>, map: F)
    where
        M: Send + 'static,
        F: FnOnce(Result<T, TransportError>) -> M + Send + 'static,
    {
        runtime.spawn(async move {
            let result = self.await;
            if poster.is_alive() {
                poster.post(map(result));
            } else {
                debug!("Result arrived after UI teardown, ignoring");
            }
        });
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, TransportError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx
            .poll_unpin(cx)
            .map(|received| received.unwrap_or(Err(TransportError::WorkerGone)))
    }
}
