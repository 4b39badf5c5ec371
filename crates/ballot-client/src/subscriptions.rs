//! Event subscriptions
//!
//! Each subscription owns one broadcast receiver, taken when the subscription
//! is registered, and one spawned task draining it. Events of one kind are
//! therefore delivered in emission order. A subscriber that falls more than
//! the channel capacity behind skips the lost events and logs a warning.

use ballot_core::{Address, EventRecord, LedgerEvent, ProposalId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Payload of `ProposalCreated`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCreatedEvent {
    /// New proposal
    pub proposal_id: ProposalId,
    /// Proposal text
    pub description: String,
    /// Voting deadline, seconds since the Unix epoch
    pub end_time: u64,
}

/// Payload of `VoteCast`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCastEvent {
    /// Target proposal
    pub proposal_id: ProposalId,
    /// Voter account
    pub voter: Address,
}

/// Payload of `ProposalEnded`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalEndedEvent {
    /// Closed proposal
    pub proposal_id: ProposalId,
    /// Revealed yes tally
    pub yes_votes: u32,
    /// Revealed no tally
    pub no_votes: u32,
}

impl ProposalCreatedEvent {
    pub(crate) fn decode(record: &EventRecord) -> Option<Self> {
        match &record.event {
            LedgerEvent::ProposalCreated {
                proposal_id,
                description,
                end_time,
            } => Some(Self {
                proposal_id: *proposal_id,
                description: description.clone(),
                end_time: *end_time,
            }),
            _ => None,
        }
    }
}

impl VoteCastEvent {
    pub(crate) fn decode(record: &EventRecord) -> Option<Self> {
        match record.event {
            LedgerEvent::VoteCast { proposal_id, voter } => Some(Self { proposal_id, voter }),
            _ => None,
        }
    }
}

impl ProposalEndedEvent {
    pub(crate) fn decode(record: &EventRecord) -> Option<Self> {
        match record.event {
            LedgerEvent::ProposalEnded {
                proposal_id,
                yes_votes,
                no_votes,
            } => Some(Self {
                proposal_id,
                yes_votes,
                no_votes,
            }),
            _ => None,
        }
    }
}

/// Identifies one live subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

/// Live subscription tasks
///
/// Dropping the registry aborts every task it still owns.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionRegistry {
    next_id: AtomicU64,
    tasks: Mutex<HashMap<SubscriptionHandle, JoinHandle<()>>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn spawn<F>(&self, fut: F) -> SubscriptionHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = SubscriptionHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let task = tokio::spawn(fut);
        if let Ok(mut tasks) = self.tasks.lock() {
            prune_finished(&mut tasks);
            tasks.insert(handle, task);
        }
        handle
    }

    /// Drain `rx`, decode with `decode`, deliver to `handler`
    pub(crate) fn listen<T, D, H>(
        &self,
        kind: &'static str,
        mut rx: broadcast::Receiver<EventRecord>,
        decode: D,
        handler: H,
    ) -> SubscriptionHandle
    where
        T: Send + 'static,
        D: Fn(&EventRecord) -> Option<T> + Send + 'static,
        H: Fn(T) + Send + 'static,
    {
        self.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(record) => {
                        if let Some(event) = decode(&record) {
                            handler(event);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(kind, skipped, "event subscriber lagged; events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        debug!(kind, "event stream closed");
                        break;
                    }
                }
            }
        })
    }

    /// Stop one subscription; false if it was already gone
    pub(crate) fn cancel(&self, handle: SubscriptionHandle) -> bool {
        let task = self
            .tasks
            .lock()
            .ok()
            .and_then(|mut tasks| tasks.remove(&handle));
        match task {
            Some(task) => {
                let live = !task.is_finished();
                task.abort();
                live
            }
            None => false,
        }
    }

    /// Stop every subscription; returns how many were live
    pub(crate) fn cancel_all(&self) -> usize {
        let Ok(mut tasks) = self.tasks.lock() else {
            return 0;
        };
        prune_finished(&mut tasks);
        let count = tasks.len();
        for (_, task) in tasks.drain() {
            task.abort();
        }
        count
    }

    /// Number of live subscriptions
    pub(crate) fn len(&self) -> usize {
        self.tasks
            .lock()
            .map(|mut tasks| {
                prune_finished(&mut tasks);
                tasks.len()
            })
            .unwrap_or(0)
    }
}

/// Forget tasks that ended on their own, e.g. after the event stream closed
fn prune_finished(tasks: &mut HashMap<SubscriptionHandle, JoinHandle<()>>) {
    tasks.retain(|_, task| !task.is_finished());
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
