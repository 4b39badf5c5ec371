//! The client service

use ballot_core::effects::{
    LedgerEffects, TransactionSigner, VoteEncryptionEffects, WalletEffects,
};
use ballot_core::{
    Address, ChainId, ClientConfig, LedgerCall, ProposalId, Result, TxHash, TxReceipt,
    UnsignedTransaction, VotingError,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::network::ensure_network;
use crate::subscriptions::{
    ProposalCreatedEvent, ProposalEndedEvent, SubscriptionHandle, SubscriptionRegistry,
    VoteCastEvent,
};
use crate::view::{ContractInfo, ProposalSummary};

/// What `connect` binds: one account, its signer, the confirmed chain
struct Session {
    account: Address,
    signer: Arc<dyn TransactionSigner>,
    chain_id: ChainId,
}

/// Wallet-bound access to one deployed ledger
///
/// Until [`connect`](Self::connect) succeeds every operation fails with
/// `NotConnected`. Calling `connect` again replaces the session only if the
/// new connect fully succeeds; concurrent connects race and the last one to
/// finish wins.
pub struct VotingClientService {
    ledger: Arc<dyn LedgerEffects>,
    config: ClientConfig,
    encryptor: Arc<dyn VoteEncryptionEffects>,
    session: RwLock<Option<Arc<Session>>>,
    subscriptions: SubscriptionRegistry,
}

impl fmt::Debug for VotingClientService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VotingClientService")
            .field("ledger", &self.ledger.address())
            .field("chain_id", &self.config.network.chain_id)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl VotingClientService {
    /// Create an unconnected service
    pub fn new(
        ledger: Arc<dyn LedgerEffects>,
        config: ClientConfig,
        encryptor: Arc<dyn VoteEncryptionEffects>,
    ) -> Self {
        Self {
            ledger,
            config,
            encryptor,
            session: RwLock::new(None),
            subscriptions: SubscriptionRegistry::new(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Bind a wallet session
    ///
    /// Requests account access, acquires a signer, puts the wallet on the
    /// configured network (registering it if the wallet does not know it),
    /// and checks that the configured ledger is the one this endpoint serves.
    /// Any failure leaves the previous session, if any, in place.
    pub async fn connect(&self, wallet: &dyn WalletEffects) -> Result<Address> {
        let accounts = wallet
            .request_accounts()
            .await
            .map_err(|e| VotingError::wallet(format!("account access denied: {e}")))?;
        if accounts.is_empty() {
            return Err(VotingError::wallet("wallet exposed no accounts"));
        }
        let signer = wallet
            .signer()
            .await
            .map_err(|e| VotingError::wallet(format!("signer unavailable: {e}")))?;

        let chain_id = ensure_network(wallet, &self.config.network).await?;
        self.check_ledger()?;

        let account = signer.address();
        *self.session.write().await = Some(Arc::new(Session {
            account,
            signer,
            chain_id,
        }));
        info!(%account, chain = %chain_id, ledger = %self.ledger.address(), "wallet connected");
        Ok(account)
    }

    fn check_ledger(&self) -> Result<()> {
        let configured = self.config.ledger.address;
        if configured.is_zero() {
            return Err(VotingError::configuration("ledger address not configured"));
        }
        if configured != self.ledger.address() {
            return Err(VotingError::network_mismatch(format!(
                "configured ledger {configured} is not served by this endpoint ({})",
                self.ledger.address()
            )));
        }
        if self.ledger.chain_id() != self.config.network.chain_id {
            return Err(VotingError::network_mismatch(format!(
                "endpoint serves chain {}, expected {}",
                self.ledger.chain_id(),
                self.config.network.chain_id
            )));
        }
        Ok(())
    }

    async fn session(&self) -> Result<Arc<Session>> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| VotingError::not_connected("connect a wallet first"))
    }

    /// Whether a session is bound
    pub async fn is_connected(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Connected account, if any
    pub async fn account(&self) -> Option<Address> {
        self.session.read().await.as_ref().map(|s| s.account)
    }

    async fn send(&self, call: LedgerCall) -> Result<TxReceipt> {
        let session = self.session().await?;
        let method = call.name();
        let tx = UnsignedTransaction::new(
            session.chain_id,
            self.ledger.address(),
            rand::random(),
            call,
        );
        let signed = session.signer.sign(tx).await?;
        let receipt = self.ledger.submit(signed).await?;
        debug!(
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            method,
            "transaction confirmed"
        );
        Ok(receipt)
    }

    /// Open a proposal (admin only)
    pub async fn create_proposal(&self, description: &str) -> Result<TxHash> {
        let receipt = self
            .send(LedgerCall::CreateProposal {
                description: description.to_string(),
            })
            .await?;
        Ok(receipt.tx_hash)
    }

    /// Grant voting rights (admin only)
    pub async fn authorize_voter(&self, voter: Address) -> Result<TxHash> {
        Ok(self.send(LedgerCall::AuthorizeVoter { voter }).await?.tx_hash)
    }

    /// Withdraw voting rights (admin only)
    pub async fn revoke_voter(&self, voter: Address) -> Result<TxHash> {
        Ok(self.send(LedgerCall::RevokeVoter { voter }).await?.tx_hash)
    }

    /// Encrypt and cast a yes/no vote
    pub async fn vote(&self, proposal_id: ProposalId, support: bool) -> Result<TxHash> {
        self.session().await?;
        let encrypted_vote = self.encryptor.encrypt_vote(support)?;
        let receipt = self
            .send(LedgerCall::Vote {
                proposal_id,
                encrypted_vote,
            })
            .await?;
        Ok(receipt.tx_hash)
    }

    /// Close a proposal and reveal its tallies (admin only)
    pub async fn end_voting(&self, proposal_id: ProposalId) -> Result<TxHash> {
        Ok(self
            .send(LedgerCall::EndVoting { proposal_id })
            .await?
            .tx_hash)
    }

    /// Whether the connected account voted on `proposal_id`
    pub async fn has_voted(&self, proposal_id: ProposalId) -> Result<bool> {
        let session = self.session().await?;
        self.ledger.has_voted(proposal_id, session.account).await
    }

    /// Snapshot of the ledger from the connected account's point of view
    ///
    /// Proposals are read one by one in id order. Tallies of a revealed
    /// proposal that cannot be read yet are left empty.
    pub async fn get_contract_info(&self) -> Result<ContractInfo> {
        let session = self.session().await?;
        let admin = self.ledger.admin().await?;
        let total_proposals = self.ledger.total_proposals().await?;
        let is_authorized_voter = self.ledger.is_authorized_voter(session.account).await?;

        let mut proposals = Vec::with_capacity(total_proposals as usize);
        for n in 0..total_proposals {
            let id = ProposalId(n);
            let info = self.ledger.proposal(id).await?;
            let results = if info.revealed {
                match self.ledger.vote_results(id).await {
                    Ok(results) => Some(results),
                    Err(err) => {
                        debug!(proposal = %id, error = %err, "tallies not readable yet");
                        None
                    }
                }
            } else {
                None
            };
            proposals.push(ProposalSummary::new(id, info, results));
        }

        Ok(ContractInfo {
            address: self.ledger.address(),
            account: session.account,
            admin,
            is_admin: admin == session.account,
            is_authorized_voter,
            total_proposals,
            proposals,
        })
    }

    /// Call `handler` for every `ProposalCreated` from now on
    pub async fn on_proposal_created<F>(&self, handler: F) -> Result<SubscriptionHandle>
    where
        F: Fn(ProposalCreatedEvent) + Send + 'static,
    {
        self.session().await?;
        Ok(self.subscriptions.listen(
            "ProposalCreated",
            self.ledger.subscribe(),
            ProposalCreatedEvent::decode,
            handler,
        ))
    }

    /// Call `handler` for every `VoteCast` from now on
    pub async fn on_vote_cast<F>(&self, handler: F) -> Result<SubscriptionHandle>
    where
        F: Fn(VoteCastEvent) + Send + 'static,
    {
        self.session().await?;
        Ok(self.subscriptions.listen(
            "VoteCast",
            self.ledger.subscribe(),
            VoteCastEvent::decode,
            handler,
        ))
    }

    /// Call `handler` for every `ProposalEnded` from now on
    pub async fn on_proposal_ended<F>(&self, handler: F) -> Result<SubscriptionHandle>
    where
        F: Fn(ProposalEndedEvent) + Send + 'static,
    {
        self.session().await?;
        Ok(self.subscriptions.listen(
            "ProposalEnded",
            self.ledger.subscribe(),
            ProposalEndedEvent::decode,
            handler,
        ))
    }

    /// Release one subscription; false if it was already released
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.cancel(handle)
    }

    /// Release every subscription; returns how many were live
    pub fn remove_all_listeners(&self) -> usize {
        let released = self.subscriptions.cancel_all();
        debug!(released, "removed all event listeners");
        released
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}
