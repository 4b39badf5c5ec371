//! Ballot Client - wallet-bound client service
//!
//! [`VotingClientService`] binds a user's wallet to one deployed ledger,
//! submits transactions on the user's behalf, projects ledger state into a
//! view model, and delivers ledger events to registered callbacks.
//!
//! The service holds no state beyond the session bound by `connect` and the
//! set of live subscriptions.

#![forbid(unsafe_code)]

/// Network check, switch and registration
pub mod network;

/// The client service
pub mod service;

/// Event subscriptions
pub mod subscriptions;

/// View model
pub mod view;

pub use service::VotingClientService;
pub use subscriptions::{
    ProposalCreatedEvent, ProposalEndedEvent, SubscriptionHandle, VoteCastEvent,
};
pub use view::{ContractInfo, ProposalSummary};
