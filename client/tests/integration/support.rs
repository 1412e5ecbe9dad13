//! Scripted in-memory chain.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use futures::{stream, StreamExt};
use healthchain_client::{
    chain::{ChainClient, Subscription, TransportError},
    decode::{MetadataRegistry, StaticRegistry},
    signer::{Keyring, Signer},
    submit::{TransactionConfig, WaitFor},
};
use healthchain_crypto::KeyPair;
use healthchain_data_model::prelude::*;
use parity_scale_codec::Encode;
use parking_lot::Mutex;

pub fn alice() -> KeyPair {
    KeyPair::from_seed("//Alice")
}

pub fn bob() -> KeyPair {
    KeyPair::from_seed("//Bob")
}

pub fn charlie() -> KeyPair {
    KeyPair::from_seed("//Charlie")
}

pub fn account(key_pair: &KeyPair) -> AccountId {
    key_pair.public_key().into()
}

pub fn block(seed: &str) -> BlockHash {
    BlockHash::new(seed)
}

pub fn in_block(seed: &str, events: impl IntoIterator<Item = Event>) -> Notification {
    Notification::new(LifecycleStage::InBlock(block(seed))).with_events(events)
}

pub fn finalized(seed: &str) -> Notification {
    Notification::new(LifecycleStage::Finalized(block(seed)))
}

pub fn config(wait_for: WaitFor) -> TransactionConfig {
    TransactionConfig {
        status_timeout: std::time::Duration::from_secs(5),
        wait_for,
    }
}

/// Notifications delivered for one submission.
#[derive(Debug, Clone, Default)]
pub struct Script {
    notifications: Vec<Notification>,
    closes: bool,
}

impl Script {
    pub fn new(notifications: impl IntoIterator<Item = Notification>) -> Self {
        Self {
            notifications: notifications.into_iter().collect(),
            closes: false,
        }
    }

    /// End the stream after the last notification instead of leaving it open.
    pub fn closing(mut self) -> Self {
        self.closes = true;
        self
    }
}

#[derive(Default)]
pub struct FakeChain {
    scripts: Mutex<HashMap<CallHash, Script>>,
    default_script: Script,
    heights: HashMap<BlockHash, BlockNumber>,
    storage: HashMap<StorageQuery, Vec<u8>>,
    registry: StaticRegistry,
    submit_error: Option<TransportError>,
    query_error: Option<TransportError>,
    pub submissions: Mutex<Vec<(Call, AccountId)>>,
    pub queries: AtomicUsize,
    pub releases: Arc<AtomicUsize>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            registry: StaticRegistry::healthchain(),
            ..Self::default()
        }
    }

    /// Script delivered to every call without its own script.
    pub fn with_script(mut self, script: Script) -> Self {
        self.default_script = script;
        self
    }

    pub fn with_call_script(self, call: &Call, script: Script) -> Self {
        self.scripts.lock().insert(call.hash(), script);
        self
    }

    pub fn with_block(mut self, seed: &str, number: BlockNumber) -> Self {
        self.heights.insert(block(seed), number);
        self
    }

    pub fn with_storage(mut self, query: StorageQuery, value: Vec<u8>) -> Self {
        self.storage.insert(query, value);
        self
    }

    pub fn with_registry(mut self, registry: StaticRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn failing_submission(mut self, error: TransportError) -> Self {
        self.submit_error = Some(error);
        self
    }

    pub fn failing_queries(mut self, error: TransportError) -> Self {
        self.query_error = Some(error);
        self
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl ChainClient for FakeChain {
    async fn sign_and_watch(
        &self,
        call: &Call,
        signer: &dyn Signer,
    ) -> Result<Subscription, TransportError> {
        if let Some(error) = &self.submit_error {
            return Err(error.clone());
        }
        signer
            .sign(&call.encode())
            .map_err(|error| TransportError::Signing(error.to_string()))?;
        self.submissions.lock().push((call.clone(), signer.account_id()));

        let script = self
            .scripts
            .lock()
            .remove(&call.hash())
            .unwrap_or_else(|| self.default_script.clone());
        let notifications = stream::iter(script.notifications);
        let notifications = if script.closes {
            notifications.boxed()
        } else {
            notifications.chain(stream::pending()).boxed()
        };

        let releases = Arc::clone(&self.releases);
        Ok(Subscription::new(notifications, move || {
            releases.fetch_add(1, Ordering::SeqCst);
        }))
    }

    async fn block_number(&self, hash: &BlockHash) -> Result<BlockNumber, TransportError> {
        self.heights
            .get(hash)
            .copied()
            .ok_or(TransportError::UnknownBlock(*hash))
    }

    async fn query_storage(&self, query: &StorageQuery) -> Result<Option<Vec<u8>>, TransportError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.query_error {
            return Err(error.clone());
        }
        Ok(self.storage.get(query).cloned())
    }

    fn metadata(&self) -> &dyn MetadataRegistry {
        &self.registry
    }
}

pub fn keyring() -> Keyring {
    Keyring::new().with(alice()).with(bob())
}
