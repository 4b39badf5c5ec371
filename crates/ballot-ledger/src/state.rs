//! Root state record and proposals

use ballot_core::{Address, Ciphertext, ProposalId, ProposalInfo, VoteResults};
use std::collections::HashSet;

/// One proposal and its running encrypted tallies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Identifier, equal to the proposal's position
    pub id: ProposalId,
    /// Proposal text
    pub description: String,
    /// Voting deadline, seconds since the Unix epoch
    pub end_time: u64,
    /// Voting closed
    pub ended: bool,
    /// Tallies decrypted
    pub revealed: bool,
    /// Encrypted yes count
    pub encrypted_yes: Ciphertext,
    /// Encrypted no count
    pub encrypted_no: Ciphertext,
    /// Plaintext tallies, set exactly once at reveal
    pub results: Option<VoteResults>,
}

impl Proposal {
    /// Public fields
    pub fn info(&self) -> ProposalInfo {
        ProposalInfo {
            description: self.description.clone(),
            end_time: self.end_time,
            ended: self.ended,
            revealed: self.revealed,
        }
    }
}

/// Everything the ledger persists
///
/// `admin` is fixed at construction. The admin is always a member of
/// `authorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    admin: Address,
    pub(crate) proposals: Vec<Proposal>,
    pub(crate) authorized: HashSet<Address>,
    pub(crate) voted: HashSet<(ProposalId, Address)>,
}

impl LedgerState {
    pub(crate) fn new(admin: Address) -> Self {
        Self {
            admin,
            proposals: Vec::new(),
            authorized: HashSet::from([admin]),
            voted: HashSet::new(),
        }
    }

    /// Admin account
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// All proposals in creation order
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Look up a proposal
    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(id.index())
    }

    /// Whether `account` may vote
    pub fn is_authorized(&self, account: &Address) -> bool {
        self.authorized.contains(account)
    }

    /// Whether `voter` voted on `id`
    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> bool {
        self.voted.contains(&(id, *voter))
    }
}
