//! Ledger endpoint
//!
//! What the client service sees of a deployed ledger: its coordinates, the
//! public read surface, transaction submission and the event stream.
//!
//! # Effect Classification
//!
//! - **Category**: External service
//! - **Implementation**: `ballot-ledger::LocalLedgerNode`
//! - **Usage**: `ballot-client`

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    Address, ChainId, EventRecord, ProposalId, ProposalInfo, Result, SignedTransaction,
    TxReceipt, VoteResults,
};

/// Read, submit and subscribe against one deployed ledger
#[async_trait]
pub trait LedgerEffects: Send + Sync {
    /// Deployed ledger address
    fn address(&self) -> Address;

    /// Chain the ledger runs on
    fn chain_id(&self) -> ChainId;

    /// Admin account
    async fn admin(&self) -> Result<Address>;

    /// Number of proposals created so far
    async fn total_proposals(&self) -> Result<u64>;

    /// Public fields of a proposal; `NotFound` for unknown ids
    async fn proposal(&self, id: ProposalId) -> Result<ProposalInfo>;

    /// Whether `account` may vote
    async fn is_authorized_voter(&self, account: Address) -> Result<bool>;

    /// Whether `voter` voted on `id`; `NotFound` for unknown ids
    async fn has_voted(&self, id: ProposalId, voter: Address) -> Result<bool>;

    /// Revealed tallies; `InvalidState` until the proposal is revealed
    async fn vote_results(&self, id: ProposalId) -> Result<VoteResults>;

    /// Execute a signed transaction and wait for its inclusion
    ///
    /// A rejected transaction returns the abort reason and changes nothing.
    async fn submit(&self, tx: SignedTransaction) -> Result<TxReceipt>;

    /// Receiver for every event emitted from now on
    fn subscribe(&self) -> broadcast::Receiver<EventRecord>;
}

#[async_trait]
impl<T: LedgerEffects + ?Sized> LedgerEffects for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn chain_id(&self) -> ChainId {
        (**self).chain_id()
    }

    async fn admin(&self) -> Result<Address> {
        (**self).admin().await
    }

    async fn total_proposals(&self) -> Result<u64> {
        (**self).total_proposals().await
    }

    async fn proposal(&self, id: ProposalId) -> Result<ProposalInfo> {
        (**self).proposal(id).await
    }

    async fn is_authorized_voter(&self, account: Address) -> Result<bool> {
        (**self).is_authorized_voter(account).await
    }

    async fn has_voted(&self, id: ProposalId, voter: Address) -> Result<bool> {
        (**self).has_voted(id, voter).await
    }

    async fn vote_results(&self, id: ProposalId) -> Result<VoteResults> {
        (**self).vote_results(id).await
    }

    async fn submit(&self, tx: SignedTransaction) -> Result<TxReceipt> {
        (**self).submit(tx).await
    }

    fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        (**self).subscribe()
    }
}
