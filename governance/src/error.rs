use containers::{Phase, StateError};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    /// The participation target ran out before the final round concluded.
    VoteBudgetExhausted,
    /// A group produced no candidate with enough votes.
    NoConsensus { round: u32, group: u32 },
    NoParticipants,
}

impl fmt::Display for IncompleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncompleteReason::VoteBudgetExhausted => f.write_str("participation target exhausted"),
            IncompleteReason::NoConsensus { round, group } => {
                write!(f, "group {group} of round {round} reached no consensus")
            }
            IncompleteReason::NoParticipants => f.write_str("no participating members"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("genesis rejected: {0}")]
    Initialization(String),

    #[error("{0} requires genesis first")]
    NotInitialized(Phase),

    #[error("election incomplete after {votes_processed} of {target} votes: {reason}")]
    ElectionIncomplete {
        reason: IncompleteReason,
        votes_processed: u64,
        target: u64,
    },

    #[error("no member has induction capacity left ({inducted} of {requested} inducted, capacity {capacity})")]
    InductionCapacity {
        requested: u32,
        inducted: u32,
        capacity: u32,
    },

    #[error(transparent)]
    State(#[from] StateError),
}
