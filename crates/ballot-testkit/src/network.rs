//! Pre-wired local network
//!
//! One ledger node deployed by a fixed admin key, driven by a [`ManualClock`],
//! with ElGamal tallies under a fixed key pair. Accounts are derived from
//! one-byte seeds so tests can name them (`TestNetwork::signer(2)`).

use ballot_client::VotingClientService;
use ballot_core::effects::{DecryptionEffects, LedgerEffects, TransactionSigner};
use ballot_core::{
    ClientConfig, LedgerCall, Result, SignedTransaction, TxReceipt, UnsignedTransaction,
};
use ballot_effects::{LocalSigner, TallyKeyPair};
use ballot_ledger::LocalLedgerNode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::ManualClock;
use crate::wallet::ScriptedWallet;

/// Clock reading at deployment, seconds since the Unix epoch
pub const GENESIS_SECS: u64 = 1_700_000_000;

/// Seed of the deploying (admin) account
pub const ADMIN_SEED: u8 = 1;

/// A deployed ledger plus everything needed to talk to it
#[derive(Debug)]
pub struct TestNetwork {
    /// Client configuration pointing at `node`
    pub config: ClientConfig,
    /// The ledger node
    pub node: Arc<LocalLedgerNode>,
    /// The node's clock
    pub clock: Arc<ManualClock>,
    /// Tally key material
    pub keys: TallyKeyPair,
    salt: AtomicU64,
}

impl TestNetwork {
    /// Deploy with a working decryption oracle
    pub fn new() -> Result<Self> {
        let keys = TallyKeyPair::from_seed([7u8; 32]);
        let oracle = Arc::new(keys.oracle());
        Self::build(keys, oracle)
    }

    /// Deploy with a custom decryption oracle
    pub fn with_oracle(oracle: Arc<dyn DecryptionEffects>) -> Result<Self> {
        Self::build(TallyKeyPair::from_seed([7u8; 32]), oracle)
    }

    fn build(keys: TallyKeyPair, oracle: Arc<dyn DecryptionEffects>) -> Result<Self> {
        let mut config = ClientConfig::default();
        let clock = Arc::new(ManualClock::at_secs(GENESIS_SECS));
        let admin = Self::signer(ADMIN_SEED);
        let node = LocalLedgerNode::deploy(
            &config.network,
            admin.address(),
            Arc::new(keys.tally_handler()),
            oracle,
            clock.clone(),
        )?;
        config.ledger.address = node.address();
        Ok(Self {
            config,
            node: Arc::new(node),
            clock,
            keys,
            salt: AtomicU64::new(0),
        })
    }

    /// Deterministic account for `seed`
    pub fn signer(seed: u8) -> LocalSigner {
        LocalSigner::from_seed([seed; 32])
    }

    /// The admin account's signer
    pub fn admin() -> LocalSigner {
        Self::signer(ADMIN_SEED)
    }

    /// Wallet for `seed` already on the network's chain
    pub fn wallet(&self, seed: u8) -> ScriptedWallet {
        ScriptedWallet::new(Self::signer(seed), self.config.network.chain_id)
    }

    /// Unconnected client service for this network
    pub fn client(&self) -> VotingClientService {
        VotingClientService::new(
            self.node.clone(),
            self.config.clone(),
            Arc::new(self.keys.encryptor()),
        )
    }

    /// Connected client service for `seed`
    pub async fn connected_client(&self, seed: u8) -> Result<VotingClientService> {
        let client = self.client();
        client.connect(&self.wallet(seed)).await?;
        Ok(client)
    }

    /// Transaction carrying `call`, addressed to this network's ledger
    pub fn transaction(&self, call: LedgerCall) -> UnsignedTransaction {
        UnsignedTransaction::new(
            self.config.network.chain_id,
            self.config.ledger.address,
            self.salt.fetch_add(1, Ordering::Relaxed),
            call,
        )
    }

    /// Sign `call` with the `seed` account and submit it to the node
    pub async fn submit_as(&self, seed: u8, call: LedgerCall) -> Result<TxReceipt> {
        let signer = Self::signer(seed);
        let signed = signer.sign(self.transaction(call)).await?;
        self.node.submit(signed).await
    }

    /// Submit an already-signed transaction
    pub async fn submit(&self, signed: SignedTransaction) -> Result<TxReceipt> {
        self.node.submit(signed).await
    }
}
