//! Serial execution node
//!
//! `LocalLedgerNode` plays the part of the chain: it authenticates signed
//! transactions, executes them strictly one at a time against a single
//! [`VotingLedger`], numbers blocks, and publishes the events of each
//! successful transaction on a broadcast channel. A failed transaction returns
//! its abort reason and publishes nothing.

use async_trait::async_trait;
use ballot_core::effects::{
    DecryptionEffects, EncryptedTallyEffects, LedgerEffects, PhysicalTimeEffects,
};
use ballot_core::{
    Address, ChainId, EventRecord, NetworkConfig, ProposalId, ProposalInfo, Result,
    SignedTransaction, TxHash, TxReceipt, VoteResults, VotingError,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::ledger::{ExecutionContext, VotingLedger};

/// Buffered events per subscriber before it starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

struct NodeState {
    ledger: VotingLedger,
    block_number: u64,
    included: HashSet<TxHash>,
}

/// In-process ledger endpoint
pub struct LocalLedgerNode {
    address: Address,
    chain_id: ChainId,
    state: Mutex<NodeState>,
    events: broadcast::Sender<EventRecord>,
    clock: Arc<dyn PhysicalTimeEffects>,
    oracle: Arc<dyn DecryptionEffects>,
}

impl fmt::Debug for LocalLedgerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalLedgerNode")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl LocalLedgerNode {
    /// Deploy a fresh ledger with `deployer` as admin
    ///
    /// The ledger address is derived from the deployer and the chain id.
    pub fn deploy(
        network: &NetworkConfig,
        deployer: Address,
        tally: Arc<dyn EncryptedTallyEffects>,
        oracle: Arc<dyn DecryptionEffects>,
        clock: Arc<dyn PhysicalTimeEffects>,
    ) -> Result<Self> {
        let ledger = VotingLedger::new(deployer, tally)?;
        let address = Address::derive_ledger(&deployer, network.chain_id);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        info!(
            ledger = %address,
            admin = %deployer,
            chain = %network.chain_id,
            "voting ledger deployed"
        );
        Ok(Self {
            address,
            chain_id: network.chain_id,
            state: Mutex::new(NodeState {
                ledger,
                block_number: 0,
                included: HashSet::new(),
            }),
            events,
            clock,
            oracle,
        })
    }

    /// Height of the last block
    pub async fn block_number(&self) -> u64 {
        self.state.lock().await.block_number
    }

    /// Verify, execute and include one transaction
    pub async fn submit(&self, signed: SignedTransaction) -> Result<TxReceipt> {
        if signed.tx.chain_id != self.chain_id {
            return Err(VotingError::invalid_argument(format!(
                "transaction for chain {} submitted to chain {}",
                signed.tx.chain_id, self.chain_id
            )));
        }
        if signed.tx.to != self.address {
            return Err(VotingError::invalid_argument(format!(
                "transaction addressed to {}, ledger is {}",
                signed.tx.to, self.address
            )));
        }
        let from = signed.verify()?;
        let tx_hash = signed.hash()?;
        let method = signed.tx.call.name();

        let mut state = self.state.lock().await;
        if state.included.contains(&tx_hash) {
            return Err(VotingError::already_done(format!(
                "transaction {tx_hash} already included"
            )));
        }
        let timestamp = self.clock.now_secs().await?;
        let ctx = ExecutionContext::new(from, timestamp);

        let output = match state
            .ledger
            .execute(&ctx, &signed.tx.call, self.oracle.as_ref())
            .await
        {
            Ok(output) => output,
            Err(err) => {
                state.ledger.discard_events();
                debug!(%tx_hash, %from, method, error = %err, "transaction reverted");
                return Err(err);
            }
        };

        state.block_number += 1;
        state.included.insert(tx_hash);
        let block_number = state.block_number;
        let events: Vec<EventRecord> = state
            .ledger
            .take_events()
            .into_iter()
            .enumerate()
            .map(|(i, event)| EventRecord {
                block_number,
                tx_hash,
                log_index: i as u32,
                event,
            })
            .collect();
        for record in &events {
            // No subscribers is not an error.
            let _ = self.events.send(record.clone());
        }
        info!(
            %tx_hash,
            %from,
            method,
            block = block_number,
            events = events.len(),
            "transaction included"
        );

        Ok(TxReceipt {
            tx_hash,
            block_number,
            from,
            output,
            events,
        })
    }
}

#[async_trait]
impl LedgerEffects for LocalLedgerNode {
    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn admin(&self) -> Result<Address> {
        Ok(self.state.lock().await.ledger.admin())
    }

    async fn total_proposals(&self) -> Result<u64> {
        Ok(self.state.lock().await.ledger.total_proposals())
    }

    async fn proposal(&self, id: ProposalId) -> Result<ProposalInfo> {
        self.state.lock().await.ledger.proposal(id)
    }

    async fn is_authorized_voter(&self, account: Address) -> Result<bool> {
        Ok(self.state.lock().await.ledger.is_authorized_voter(&account))
    }

    async fn has_voted(&self, id: ProposalId, voter: Address) -> Result<bool> {
        self.state.lock().await.ledger.has_voted(id, &voter)
    }

    async fn vote_results(&self, id: ProposalId) -> Result<VoteResults> {
        self.state.lock().await.ledger.vote_results(id)
    }

    async fn submit(&self, tx: SignedTransaction) -> Result<TxReceipt> {
        LocalLedgerNode::submit(self, tx).await
    }

    fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }
}
