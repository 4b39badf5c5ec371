//! View model

use ballot_core::{Address, ProposalId, ProposalInfo, VoteResults};
use serde::{Deserialize, Serialize};

/// One proposal as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSummary {
    /// Identifier
    pub id: ProposalId,
    /// Proposal text
    pub description: String,
    /// Voting deadline, seconds since the Unix epoch
    pub end_time: u64,
    /// Voting closed
    pub ended: bool,
    /// Tallies published
    pub revealed: bool,
    /// Yes tally, present once revealed and readable
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub yes_votes: Option<u32>,
    /// No tally, present once revealed and readable
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub no_votes: Option<u32>,
}

impl ProposalSummary {
    /// Combine public fields with optional tallies
    pub fn new(id: ProposalId, info: ProposalInfo, results: Option<VoteResults>) -> Self {
        Self {
            id,
            description: info.description,
            end_time: info.end_time,
            ended: info.ended,
            revealed: info.revealed,
            yes_votes: results.map(|r| r.yes_votes),
            no_votes: results.map(|r| r.no_votes),
        }
    }
}

/// Ledger state as seen by the connected account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    /// Ledger address
    pub address: Address,
    /// Connected account
    pub account: Address,
    /// Admin account
    pub admin: Address,
    /// Whether the connected account is the admin
    pub is_admin: bool,
    /// Whether the connected account may vote
    pub is_authorized_voter: bool,
    /// Number of proposals
    pub total_proposals: u64,
    /// Every proposal in id order
    pub proposals: Vec<ProposalSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrevealed_summary_omits_tallies() {
        let info = ProposalInfo {
            description: "p".to_string(),
            end_time: 10,
            ended: false,
            revealed: false,
        };
        let summary = ProposalSummary::new(ProposalId(0), info, None);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("yesVotes").is_none());
        assert_eq!(json["endTime"], 10);
    }

    #[test]
    fn revealed_summary_carries_tallies() {
        let info = ProposalInfo {
            description: "p".to_string(),
            end_time: 10,
            ended: true,
            revealed: true,
        };
        let summary = ProposalSummary::new(
            ProposalId(3),
            info,
            Some(VoteResults {
                yes_votes: 4,
                no_votes: 2,
            }),
        );
        assert_eq!(summary.yes_votes, Some(4));
        assert_eq!(summary.no_votes, Some(2));
    }
}
