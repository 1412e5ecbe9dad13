//! Boundary to the chain node: broadcasting, status subscriptions and storage reads.

use core::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{stream::BoxStream, Stream, StreamExt};
use healthchain_data_model::{
    call::Call, events::Notification, storage::StorageQuery, BlockHash, BlockNumber,
};
use healthchain_logger::prelude::*;

use crate::{decode::MetadataRegistry, signer::Signer};

/// Failure talking to the node.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum TransportError {
    /// Failed to sign the extrinsic: {0}
    Signing(String),
    /// Node rejected the submission: {0}
    Submission(String),
    /// Connection error: {0}
    Connection(String),
    /// Unknown block {0}
    UnknownBlock(BlockHash),
    /// Malformed response: {0}
    Malformed(String),
}

/// Connection to a healthchain node.
///
/// Shared by every concurrent submission and query.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Sign `call` with `signer`, broadcast it and subscribe to its status.
    async fn sign_and_watch(
        &self,
        call: &Call,
        signer: &dyn Signer,
    ) -> Result<Subscription, TransportError>;

    /// Height of the block with the given hash.
    async fn block_number(&self, hash: &BlockHash) -> Result<BlockNumber, TransportError>;

    /// Raw value of a storage entry, `None` if it holds no value.
    async fn query_storage(&self, query: &StorageQuery) -> Result<Option<Vec<u8>>, TransportError>;

    /// Error section of the runtime metadata.
    fn metadata(&self) -> &dyn MetadataRegistry;
}

type Release = Box<dyn FnOnce() + Send>;

/// Status notifications of one extrinsic.
///
/// The node-side subscription is released by [`Subscription::release`] or on drop,
/// whichever comes first, and only once.
pub struct Subscription {
    notifications: BoxStream<'static, Notification>,
    release: Option<Release>,
}

impl Subscription {
    /// Wrap a notification stream with the action that unsubscribes it.
    pub fn new(
        notifications: impl Stream<Item = Notification> + Send + 'static,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            notifications: notifications.boxed(),
            release: Some(Box::new(release)),
        }
    }

    /// Stop the node-side subscription. Later calls do nothing.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            trace!("Releasing status subscription");
            release();
        }
    }

    /// Whether the subscription was released.
    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Stream for Subscription {
    type Item = Notification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.is_released() {
            return Poll::Ready(None);
        }
        self.notifications.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
