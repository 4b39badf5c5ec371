//! The voting state machine
//!
//! Every mutating operation checks all of its preconditions before it writes
//! anything, so a failed operation leaves the state exactly as it was. Events
//! are buffered and handed to the execution node with [`VotingLedger::take_events`].

use ballot_core::effects::{DecryptionEffects, EncryptedTallyEffects};
use ballot_core::{
    Address, CallOutput, Ciphertext, LedgerCall, LedgerEvent, ProposalId, ProposalInfo, Result,
    VoteResults, VotingError, MAX_DESCRIPTION_CHARS, VOTING_PERIOD_SECS,
};
use std::fmt;
use std::sync::Arc;

use crate::state::{LedgerState, Proposal};

/// Who is calling and when, as established by the execution substrate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Authenticated caller
    pub caller: Address,
    /// Block timestamp, seconds since the Unix epoch
    pub timestamp: u64,
}

impl ExecutionContext {
    /// Build a context
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}

/// Confidential voting ledger
pub struct VotingLedger {
    state: LedgerState,
    tally: Arc<dyn EncryptedTallyEffects>,
    pending_events: Vec<LedgerEvent>,
}

impl fmt::Debug for VotingLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VotingLedger")
            .field("state", &self.state)
            .field("pending_events", &self.pending_events.len())
            .finish_non_exhaustive()
    }
}

impl VotingLedger {
    /// Create a ledger administered by `admin`
    ///
    /// The admin is authorized to vote from the start and can never be
    /// revoked.
    pub fn new(admin: Address, tally: Arc<dyn EncryptedTallyEffects>) -> Result<Self> {
        if admin.is_zero() {
            return Err(VotingError::invalid_argument("invalid admin address"));
        }
        Ok(Self {
            state: LedgerState::new(admin),
            tally,
            pending_events: Vec::new(),
        })
    }

    /// Read-only view of the persisted state
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    fn ensure_admin(&self, ctx: &ExecutionContext) -> Result<()> {
        if ctx.caller != self.state.admin() {
            return Err(VotingError::unauthorized("only admin can perform this action"));
        }
        Ok(())
    }

    fn existing(&self, id: ProposalId) -> Result<&Proposal> {
        self.state
            .proposal(id)
            .ok_or_else(|| VotingError::not_found("invalid proposal id"))
    }

    /// Grant voting rights; authorizing twice is allowed and emits again
    pub fn authorize_voter(&mut self, ctx: &ExecutionContext, voter: Address) -> Result<()> {
        self.ensure_admin(ctx)?;
        if voter.is_zero() {
            return Err(VotingError::invalid_argument("invalid voter address"));
        }
        self.state.authorized.insert(voter);
        self.pending_events
            .push(LedgerEvent::VoterAuthorized { voter });
        Ok(())
    }

    /// Withdraw voting rights
    ///
    /// Targeting the admin is an `InvariantViolation` whoever the caller is.
    pub fn revoke_voter(&mut self, ctx: &ExecutionContext, voter: Address) -> Result<()> {
        if voter == self.state.admin() {
            return Err(VotingError::invariant_violation("cannot revoke admin"));
        }
        self.ensure_admin(ctx)?;
        self.state.authorized.remove(&voter);
        self.pending_events.push(LedgerEvent::VoterRevoked { voter });
        Ok(())
    }

    /// Open a proposal; voting closes `VOTING_PERIOD_SECS` after `ctx.timestamp`
    pub fn create_proposal(
        &mut self,
        ctx: &ExecutionContext,
        description: &str,
    ) -> Result<ProposalId> {
        self.ensure_admin(ctx)?;
        let chars = description.chars().count();
        if chars == 0 {
            return Err(VotingError::invalid_argument("description cannot be empty"));
        }
        if chars > MAX_DESCRIPTION_CHARS {
            return Err(VotingError::invalid_argument("description too long"));
        }

        let id = ProposalId(self.state.proposals.len() as u64);
        let end_time = ctx.timestamp.saturating_add(VOTING_PERIOD_SECS);
        self.state.proposals.push(Proposal {
            id,
            description: description.to_string(),
            end_time,
            ended: false,
            revealed: false,
            encrypted_yes: self.tally.zero(),
            encrypted_no: self.tally.zero(),
            results: None,
        });
        self.pending_events.push(LedgerEvent::ProposalCreated {
            proposal_id: id,
            description: description.to_string(),
            end_time,
        });
        Ok(id)
    }

    /// Fold an encrypted 0/1 vote into the proposal's tallies
    ///
    /// The payload's 0-or-1 proof is verified first. Its ciphertext goes into
    /// the yes tally and its complement into the no tally. Neither is ever
    /// decrypted here.
    pub fn vote(
        &mut self,
        ctx: &ExecutionContext,
        id: ProposalId,
        encrypted_vote: &Ciphertext,
    ) -> Result<()> {
        if !self.state.is_authorized(&ctx.caller) {
            return Err(VotingError::unauthorized("not an authorized voter"));
        }
        let proposal = self.existing(id)?;
        if proposal.ended {
            return Err(VotingError::invalid_state("voting already ended"));
        }
        if ctx.timestamp > proposal.end_time {
            return Err(VotingError::invalid_state("voting period has elapsed"));
        }
        if self.state.has_voted(id, &ctx.caller) {
            return Err(VotingError::already_done("already voted"));
        }
        let vote = self.tally.validate(encrypted_vote)?;

        let yes = self.tally.add(&proposal.encrypted_yes, &vote)?;
        let no = self
            .tally
            .add(&proposal.encrypted_no, &self.tally.complement(&vote)?)?;

        let proposal = &mut self.state.proposals[id.index()];
        proposal.encrypted_yes = yes;
        proposal.encrypted_no = no;
        self.state.voted.insert((id, ctx.caller));
        self.pending_events.push(LedgerEvent::VoteCast {
            proposal_id: id,
            voter: ctx.caller,
        });
        Ok(())
    }

    /// Close a proposal and reveal its tallies
    ///
    /// Both tallies are decrypted before anything is written. If the oracle
    /// fails the proposal stays open and the error is `DecryptionUnavailable`.
    pub async fn end_voting(
        &mut self,
        ctx: &ExecutionContext,
        id: ProposalId,
        oracle: &dyn DecryptionEffects,
    ) -> Result<VoteResults> {
        self.ensure_admin(ctx)?;
        let proposal = self.existing(id)?;
        if proposal.ended {
            return Err(VotingError::invalid_state("voting already ended"));
        }

        let yes_votes = decrypt(oracle, &proposal.encrypted_yes).await?;
        let no_votes = decrypt(oracle, &proposal.encrypted_no).await?;
        let results = VoteResults {
            yes_votes,
            no_votes,
        };

        let proposal = &mut self.state.proposals[id.index()];
        proposal.ended = true;
        proposal.revealed = true;
        proposal.results = Some(results);
        self.pending_events.push(LedgerEvent::ProposalEnded {
            proposal_id: id,
            yes_votes,
            no_votes,
        });
        Ok(results)
    }

    /// Dispatch a decoded call
    pub async fn execute(
        &mut self,
        ctx: &ExecutionContext,
        call: &LedgerCall,
        oracle: &dyn DecryptionEffects,
    ) -> Result<CallOutput> {
        match call {
            LedgerCall::AuthorizeVoter { voter } => {
                self.authorize_voter(ctx, *voter).map(|()| CallOutput::Unit)
            }
            LedgerCall::RevokeVoter { voter } => {
                self.revoke_voter(ctx, *voter).map(|()| CallOutput::Unit)
            }
            LedgerCall::CreateProposal { description } => self
                .create_proposal(ctx, description)
                .map(CallOutput::ProposalId),
            LedgerCall::Vote {
                proposal_id,
                encrypted_vote,
            } => self
                .vote(ctx, *proposal_id, encrypted_vote)
                .map(|()| CallOutput::Unit),
            LedgerCall::EndVoting { proposal_id } => self
                .end_voting(ctx, *proposal_id, oracle)
                .await
                .map(|_| CallOutput::Unit),
        }
    }

    /// Events emitted since the last call, oldest first
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Drop buffered events without publishing them
    pub fn discard_events(&mut self) {
        self.pending_events.clear();
    }

    /// Admin account
    pub fn admin(&self) -> Address {
        self.state.admin()
    }

    /// Number of proposals created
    pub fn total_proposals(&self) -> u64 {
        self.state.proposals.len() as u64
    }

    /// Public fields of a proposal
    pub fn proposal(&self, id: ProposalId) -> Result<ProposalInfo> {
        self.existing(id).map(Proposal::info)
    }

    /// Whether `account` may vote
    pub fn is_authorized_voter(&self, account: &Address) -> bool {
        self.state.is_authorized(account)
    }

    /// Whether `voter` voted on `id`
    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> Result<bool> {
        self.existing(id)?;
        Ok(self.state.has_voted(id, voter))
    }

    /// Revealed tallies of a proposal
    pub fn vote_results(&self, id: ProposalId) -> Result<VoteResults> {
        let proposal = self.existing(id)?;
        match (proposal.revealed, proposal.results) {
            (true, Some(results)) => Ok(results),
            _ => Err(VotingError::invalid_state("results not available yet")),
        }
    }
}

async fn decrypt(oracle: &dyn DecryptionEffects, tally: &Ciphertext) -> Result<u32> {
    oracle.decrypt_tally(tally).await.map_err(|e| match e {
        VotingError::DecryptionUnavailable { .. } => e,
        other => VotingError::decryption_unavailable(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ballot_core::effects::VoteEncryptionEffects;
    use ballot_effects::TallyKeyPair;
    use ballot_testkit::FailingOracle;

    const T0: u64 = 1_700_000_000;

    fn admin() -> Address {
        Address([0xaa; 20])
    }

    fn voter() -> Address {
        Address([0xbb; 20])
    }

    fn as_admin() -> ExecutionContext {
        ExecutionContext::new(admin(), T0)
    }

    fn setup() -> (VotingLedger, TallyKeyPair) {
        let keys = TallyKeyPair::from_seed([1u8; 32]);
        let ledger = VotingLedger::new(admin(), Arc::new(keys.tally_handler())).unwrap();
        (ledger, keys)
    }

    #[test]
    fn admin_is_authorized_at_creation() {
        let (ledger, _) = setup();
        assert_eq!(ledger.admin(), admin());
        assert!(ledger.is_authorized_voter(&admin()));
        assert!(!ledger.is_authorized_voter(&voter()));
    }

    #[test]
    fn zero_admin_is_rejected() {
        let keys = TallyKeyPair::from_seed([1u8; 32]);
        assert_matches!(
            VotingLedger::new(Address::ZERO, Arc::new(keys.tally_handler())),
            Err(VotingError::InvalidArgument { .. })
        );
    }

    #[test]
    fn authorize_requires_admin_and_nonzero_address() {
        let (mut ledger, _) = setup();
        let outsider = ExecutionContext::new(voter(), T0);
        assert_matches!(
            ledger.authorize_voter(&outsider, voter()),
            Err(VotingError::Unauthorized { .. })
        );
        assert_matches!(
            ledger.authorize_voter(&as_admin(), Address::ZERO),
            Err(VotingError::InvalidArgument { .. })
        );
        assert!(ledger.take_events().is_empty());

        ledger.authorize_voter(&as_admin(), voter()).unwrap();
        ledger.authorize_voter(&as_admin(), voter()).unwrap();
        assert!(ledger.is_authorized_voter(&voter()));
        assert_eq!(
            ledger.take_events(),
            vec![
                LedgerEvent::VoterAuthorized { voter: voter() },
                LedgerEvent::VoterAuthorized { voter: voter() },
            ]
        );
    }

    #[test]
    fn revoke_clears_authorization_but_never_for_admin() {
        let (mut ledger, _) = setup();
        ledger.authorize_voter(&as_admin(), voter()).unwrap();
        ledger.revoke_voter(&as_admin(), voter()).unwrap();
        assert!(!ledger.is_authorized_voter(&voter()));

        assert_matches!(
            ledger.revoke_voter(&as_admin(), admin()),
            Err(VotingError::InvariantViolation { .. })
        );
        assert_matches!(
            ledger.revoke_voter(&ExecutionContext::new(voter(), T0), admin()),
            Err(VotingError::InvariantViolation { .. })
        );
        assert!(ledger.is_authorized_voter(&admin()));
    }

    #[test]
    fn create_proposal_assigns_ids_and_deadline() {
        let (mut ledger, _) = setup();
        let id = ledger.create_proposal(&as_admin(), "Fund the library").unwrap();
        assert_eq!(id, ProposalId(0));
        let info = ledger.proposal(id).unwrap();
        assert_eq!(info.end_time, T0 + VOTING_PERIOD_SECS);
        assert!(!info.ended && !info.revealed);
        assert_eq!(
            ledger.take_events(),
            vec![LedgerEvent::ProposalCreated {
                proposal_id: id,
                description: "Fund the library".to_string(),
                end_time: T0 + VOTING_PERIOD_SECS,
            }]
        );
    }

    #[test]
    fn description_length_counts_characters() {
        let (mut ledger, _) = setup();
        let wide = "é".repeat(MAX_DESCRIPTION_CHARS);
        assert!(wide.len() > MAX_DESCRIPTION_CHARS);
        assert!(ledger.create_proposal(&as_admin(), &wide).is_ok());
        assert_matches!(
            ledger.create_proposal(&as_admin(), &format!("{wide}é")),
            Err(VotingError::InvalidArgument { .. })
        );
    }

    #[test]
    fn vote_precondition_order() {
        let (mut ledger, keys) = setup();
        let ballot = keys.encryptor().encrypt_vote(true).unwrap();
        let stranger = ExecutionContext::new(voter(), T0);

        // Unauthorized wins over an unknown id.
        assert_matches!(
            ledger.vote(&stranger, ProposalId(5), &ballot),
            Err(VotingError::Unauthorized { .. })
        );
        assert_matches!(
            ledger.vote(&as_admin(), ProposalId(5), &ballot),
            Err(VotingError::NotFound { .. })
        );

        let id = ledger.create_proposal(&as_admin(), "p").unwrap();
        assert_matches!(
            ledger.vote(&as_admin(), id, &Ciphertext::from_bytes(vec![1, 2, 3])),
            Err(VotingError::InvalidArgument { .. })
        );
        assert!(!ledger.has_voted(id, &admin()).unwrap());

        let late = ExecutionContext::new(admin(), T0 + VOTING_PERIOD_SECS + 1);
        assert_matches!(
            ledger.vote(&late, id, &ballot),
            Err(VotingError::InvalidState { .. })
        );

        ledger.vote(&as_admin(), id, &ballot).unwrap();
        assert!(ledger.has_voted(id, &admin()).unwrap());
        assert_matches!(
            ledger.vote(&as_admin(), id, &ballot),
            Err(VotingError::AlreadyDone { .. })
        );
    }

    #[test]
    fn vote_on_the_deadline_is_accepted() {
        let (mut ledger, keys) = setup();
        let id = ledger.create_proposal(&as_admin(), "p").unwrap();
        let at_deadline = ExecutionContext::new(admin(), T0 + VOTING_PERIOD_SECS);
        let ballot = keys.encryptor().encrypt_vote(false).unwrap();
        assert!(ledger.vote(&at_deadline, id, &ballot).is_ok());
    }

    #[tokio::test]
    async fn multi_count_ballot_is_rejected_before_any_write() {
        let (mut ledger, keys) = setup();
        let tally = keys.tally_handler();
        let enc = keys.encryptor();
        let id = ledger.create_proposal(&as_admin(), "p").unwrap();
        ledger.take_events();
        let before = ledger.state().clone();

        let one = enc.encrypt_vote(true).unwrap();
        let one_ct = tally.validate(&one).unwrap();
        let two = tally.add(&one_ct, &one_ct).unwrap();
        let mut spliced = two.as_bytes().to_vec();
        spliced.extend_from_slice(&one.as_bytes()[two.len()..]);

        for stuffed in [two, Ciphertext::from_bytes(spliced)] {
            assert_matches!(
                ledger.vote(&as_admin(), id, &stuffed),
                Err(VotingError::InvalidArgument { .. })
            );
        }
        assert!(!ledger.has_voted(id, &admin()).unwrap());
        assert_eq!(ledger.state(), &before);
        assert!(ledger.take_events().is_empty());

        ledger.vote(&as_admin(), id, &one).unwrap();
        let results = ledger
            .end_voting(&as_admin(), id, &keys.oracle())
            .await
            .unwrap();
        assert_eq!(
            results,
            VoteResults {
                yes_votes: 1,
                no_votes: 0
            }
        );
    }

    #[tokio::test]
    async fn end_voting_reveals_tallies() {
        let (mut ledger, keys) = setup();
        let enc = keys.encryptor();
        let id = ledger.create_proposal(&as_admin(), "p").unwrap();
        ledger.authorize_voter(&as_admin(), voter()).unwrap();
        ledger
            .vote(&as_admin(), id, &enc.encrypt_vote(true).unwrap())
            .unwrap();
        ledger
            .vote(
                &ExecutionContext::new(voter(), T0 + 60),
                id,
                &enc.encrypt_vote(false).unwrap(),
            )
            .unwrap();
        assert_matches!(
            ledger.vote_results(id),
            Err(VotingError::InvalidState { .. })
        );
        ledger.take_events();

        let results = ledger
            .end_voting(&as_admin(), id, &keys.oracle())
            .await
            .unwrap();
        assert_eq!(
            results,
            VoteResults {
                yes_votes: 1,
                no_votes: 1
            }
        );
        assert_eq!(ledger.vote_results(id).unwrap(), results);
        let info = ledger.proposal(id).unwrap();
        assert!(info.ended && info.revealed);
        assert_eq!(
            ledger.take_events(),
            vec![LedgerEvent::ProposalEnded {
                proposal_id: id,
                yes_votes: 1,
                no_votes: 1
            }]
        );

        assert_matches!(
            ledger.end_voting(&as_admin(), id, &keys.oracle()).await,
            Err(VotingError::InvalidState { .. })
        );
        assert_matches!(
            ledger.vote(&as_admin(), id, &enc.encrypt_vote(true).unwrap()),
            Err(VotingError::InvalidState { .. })
        );
    }

    #[tokio::test]
    async fn oracle_failure_leaves_proposal_open() {
        let (mut ledger, keys) = setup();
        let id = ledger.create_proposal(&as_admin(), "p").unwrap();
        ledger.take_events();
        let before = ledger.state().clone();

        assert_matches!(
            ledger.end_voting(&as_admin(), id, &FailingOracle::new()).await,
            Err(VotingError::DecryptionUnavailable { .. })
        );
        assert_eq!(ledger.state(), &before);
        assert!(ledger.take_events().is_empty());

        // A later attempt with a working oracle still succeeds.
        assert!(ledger.end_voting(&as_admin(), id, &keys.oracle()).await.is_ok());
    }

    #[tokio::test]
    async fn end_voting_requires_admin_and_existing_proposal() {
        let (mut ledger, keys) = setup();
        assert_matches!(
            ledger.end_voting(&as_admin(), ProposalId(0), &keys.oracle()).await,
            Err(VotingError::NotFound { .. })
        );
        let id = ledger.create_proposal(&as_admin(), "p").unwrap();
        assert_matches!(
            ledger
                .end_voting(&ExecutionContext::new(voter(), T0), id, &keys.oracle())
                .await,
            Err(VotingError::Unauthorized { .. })
        );
    }

    #[test]
    fn reads_on_unknown_ids_are_not_found() {
        let (ledger, _) = setup();
        assert_matches!(ledger.proposal(ProposalId(0)), Err(VotingError::NotFound { .. }));
        assert_matches!(
            ledger.has_voted(ProposalId(0), &admin()),
            Err(VotingError::NotFound { .. })
        );
        assert_matches!(
            ledger.vote_results(ProposalId(0)),
            Err(VotingError::NotFound { .. })
        );
    }
}
