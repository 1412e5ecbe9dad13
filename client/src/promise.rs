//! Single-resolution deferred value shared between one producer and any number of awaiters.

use core::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use std::sync::Arc;

use futures::{
    channel::oneshot,
    future::{FutureExt, Shared},
};
use parking_lot::Mutex;

/// Result future abandoned without settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub struct Abandoned;

/// Create an unsettled future and the handle that settles it.
pub fn pending<T: Clone, E: Clone>() -> (Outcome<T, E>, Settle<T, E>) {
    let (sender, receiver) = oneshot::channel();
    (
        Outcome {
            inner: receiver.shared(),
        },
        Settle {
            sender: Arc::new(Mutex::new(Some(sender))),
        },
    )
}

/// Awaitable side. Cloning yields another awaiter of the same value.
#[derive(Clone)]
pub struct Outcome<T, E> {
    inner: Shared<oneshot::Receiver<Result<T, E>>>,
}

impl<T, E> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome").finish_non_exhaustive()
    }
}

impl<T: Clone, E: Clone> Outcome<T, E> {
    /// Value already observed by some awaiter, without waiting.
    pub fn peek(&self) -> Option<Result<Result<T, E>, Abandoned>> {
        self.inner
            .peek()
            .map(|settled| settled.clone().map_err(|oneshot::Canceled| Abandoned))
    }
}

impl<T: Clone, E: Clone> Future for Outcome<T, E> {
    type Output = Result<Result<T, E>, Abandoned>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner
            .poll_unpin(cx)
            .map(|settled| settled.map_err(|oneshot::Canceled| Abandoned))
    }
}

/// Producing side. Only the first settlement is observed.
pub struct Settle<T, E> {
    sender: Arc<Mutex<Option<oneshot::Sender<Result<T, E>>>>>,
}

impl<T, E> fmt::Debug for Settle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settle")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<T, E> Clone for Settle<T, E> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T, E> Settle<T, E> {
    /// Settle with a success value. Returns `false` if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with a failure. Returns `false` if already settled.
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    /// Whether a value was already supplied.
    pub fn is_settled(&self) -> bool {
        self.sender.lock().is_none()
    }

    fn settle(&self, value: Result<T, E>) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            return false;
        };
        let _ = sender.send(value);
        true
    }
}
