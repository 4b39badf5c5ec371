//! Keystore-backed wallet
//!
//! `LocalWallet` holds one ed25519 key and approves every request it can
//! satisfy. It knows the chain it starts on plus any chain registered through
//! `add_chain`; switching to anything else reports `UnrecognizedChain`, which
//! is what drives the client's add-then-switch path.

use async_trait::async_trait;
use ballot_core::effects::{TransactionSigner, WalletEffects, WalletError};
use ballot_core::{Address, ChainId, NetworkConfig, SignedTransaction, UnsignedTransaction};
use ed25519_dalek::SigningKey;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Signs with an in-memory ed25519 key
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    /// Wrap a signing key
    pub fn new(key: SigningKey) -> Self {
        let address = Address::from_verifying_key(&key.verifying_key().to_bytes());
        Self { key, address }
    }

    /// Fresh random key
    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Deterministic key from a 32-byte seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(&seed))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, WalletError> {
        SignedTransaction::sign(tx, &self.key).map_err(|e| WalletError::Unavailable {
            reason: e.to_string(),
        })
    }
}

#[derive(Debug)]
struct ChainState {
    active: ChainId,
    known: HashSet<ChainId>,
}

/// Auto-approving single-account wallet
#[derive(Debug)]
pub struct LocalWallet {
    signer: Arc<LocalSigner>,
    chains: RwLock<ChainState>,
}

impl LocalWallet {
    /// Wallet for `signer`, starting on `chain_id`
    pub fn new(signer: LocalSigner, chain_id: ChainId) -> Self {
        Self {
            signer: Arc::new(signer),
            chains: RwLock::new(ChainState {
                active: chain_id,
                known: HashSet::from([chain_id]),
            }),
        }
    }

    /// Account address
    pub fn address(&self) -> Address {
        self.signer.address
    }
}

#[async_trait]
impl WalletEffects for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.signer.address])
    }

    async fn signer(&self) -> Result<Arc<dyn TransactionSigner>, WalletError> {
        let signer: Arc<dyn TransactionSigner> = self.signer.clone();
        Ok(signer)
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        Ok(self.chains.read().await.active)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError> {
        let mut chains = self.chains.write().await;
        if !chains.known.contains(&chain_id) {
            return Err(WalletError::UnrecognizedChain { chain_id });
        }
        chains.active = chain_id;
        tracing::debug!(chain = %chain_id, "wallet switched chain");
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), WalletError> {
        self.chains.write().await.known.insert(network.chain_id);
        tracing::debug!(
            chain = %network.chain_id,
            name = %network.name,
            rpc = %network.rpc_url,
            "wallet registered chain"
        );
        Ok(())
    }
}
