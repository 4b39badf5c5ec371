//! Wallet provider capability
//!
//! The client service never holds key material. It asks a wallet for account
//! access, a signer and network changes; the wallet may refuse any of them.
//!
//! # Effect Classification
//!
//! - **Category**: External service (user-mediated)
//! - **Implementation**: `ballot-effects::LocalWallet`, `ballot-testkit::ScriptedWallet`
//! - **Usage**: `VotingClientService::connect`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{Address, ChainId, NetworkConfig, SignedTransaction, UnsignedTransaction, VotingError};

/// Wallet refusals and failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum WalletError {
    /// The user declined the request
    #[error("user rejected the request")]
    UserRejected,
    /// The wallet does not know the requested chain and must add it first
    #[error("unrecognized chain {chain_id}")]
    UnrecognizedChain {
        /// Requested chain
        chain_id: ChainId,
    },
    /// The wallet could not service the request
    #[error("wallet unavailable: {reason}")]
    Unavailable {
        /// Failure detail
        reason: String,
    },
}

impl From<WalletError> for VotingError {
    fn from(err: WalletError) -> Self {
        VotingError::wallet(err.to_string())
    }
}

/// Signs ledger transactions on behalf of one account
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Account whose key signs
    fn address(&self) -> Address;

    /// Sign a transaction
    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, WalletError>;
}

/// Account access, signing and network management
#[async_trait]
pub trait WalletEffects: Send + Sync {
    /// Ask the user to expose their accounts
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Signer for the active account
    async fn signer(&self) -> Result<Arc<dyn TransactionSigner>, WalletError>;

    /// Currently active chain
    async fn chain_id(&self) -> Result<ChainId, WalletError>;

    /// Switch to a known chain
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError>;

    /// Register a chain with its RPC and explorer endpoints and currency
    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), WalletError>;
}

#[async_trait]
impl<T: WalletEffects + ?Sized> WalletEffects for Arc<T> {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        (**self).request_accounts().await
    }

    async fn signer(&self) -> Result<Arc<dyn TransactionSigner>, WalletError> {
        (**self).signer().await
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        (**self).chain_id().await
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError> {
        (**self).switch_chain(chain_id).await
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), WalletError> {
        (**self).add_chain(network).await
    }
}
