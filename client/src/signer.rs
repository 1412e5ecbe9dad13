//! Signing capability and the registry of signers available to the client.

use std::{collections::HashMap, sync::Arc};

use healthchain_crypto::{KeyPair, Signature};
use healthchain_data_model::account::AccountId;

/// Failure to produce a signature.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum SignError {
    /// Signing was refused: {0}
    Refused(String),
    /// Signer is unavailable: {0}
    Unavailable(String),
}

/// Something that signs on behalf of one account. Key material never leaves it.
pub trait Signer: Send + Sync {
    /// Account the signatures belong to.
    fn account_id(&self) -> AccountId;

    /// Sign `payload`.
    ///
    /// # Errors
    /// If the signer refuses or cannot sign.
    fn sign(&self, payload: &[u8]) -> Result<Signature, SignError>;
}

impl Signer for KeyPair {
    fn account_id(&self) -> AccountId {
        self.public_key().into()
    }

    fn sign(&self, payload: &[u8]) -> Result<Signature, SignError> {
        Ok(KeyPair::sign(self, payload))
    }
}

/// Signers by the account they sign for.
#[derive(Clone, Default)]
pub struct Keyring {
    signers: HashMap<AccountId, Arc<dyn Signer>>,
}

impl Keyring {
    /// Empty keyring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Development keyring with Alice, Bob, Charlie, Dave, Eve and Ferdie.
    ///
    /// Keys are derived with [`KeyPair::from_seed`] and are public knowledge.
    pub fn dev() -> Self {
        ["Alice", "Bob", "Charlie", "Dave", "Eve", "Ferdie"]
            .into_iter()
            .fold(Self::new(), |keyring, name| {
                keyring.with(KeyPair::from_seed(format!("//{name}")))
            })
    }

    /// Add a signer, replacing any previous one for the same account.
    #[must_use]
    pub fn with(mut self, signer: impl Signer + 'static) -> Self {
        self.insert(Arc::new(signer));
        self
    }

    /// Add a shared signer, replacing any previous one for the same account.
    pub fn insert(&mut self, signer: Arc<dyn Signer>) {
        self.signers.insert(signer.account_id(), signer);
    }

    /// Signer for `account`, if known.
    pub fn get(&self, account: &AccountId) -> Option<Arc<dyn Signer>> {
        self.signers.get(account).cloned()
    }

    /// Accounts that have a signer.
    pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.signers.keys()
    }
}

impl core::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.signers.keys()).finish()
    }
}
