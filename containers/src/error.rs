use crate::{MemberId, Sequence};
use thiserror::Error;

/// Invariant violations detected on a chain state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("member {0} is already registered")]
    DuplicateMember(MemberId),

    #[error("inductor {inductor} of {inductee} is not a member")]
    UnknownInductor { inductee: MemberId, inductor: MemberId },

    #[error("inductor {inductor} joined after inductee {inductee}")]
    ForwardInductor { inductee: MemberId, inductor: MemberId },

    #[error("inducted member {0} has no inductor")]
    MissingInductor(MemberId),

    #[error("founder {0} must not have an inductor")]
    FounderWithInductor(MemberId),

    #[error("trust graph references unknown member {0}")]
    UnknownInductee(MemberId),

    #[error("member {id} records {recorded} inductions but the trust graph holds {actual}")]
    InductionCountMismatch { id: MemberId, recorded: u32, actual: u32 },

    #[error("registry index {found} at position {expected}")]
    RegistryOrder { expected: u64, found: u64 },

    #[error("sequence {next} does not advance past {current}")]
    SequenceRegression { current: Sequence, next: Sequence },

    #[error("{what} at sequence {at} is ahead of chain sequence {current}")]
    FutureSequence { what: String, at: Sequence, current: Sequence },

    #[error("election {index} reuses or precedes sequence {sequence}")]
    ElectionSequence { index: u32, sequence: Sequence },

    #[error("election at position {position} carries index {index}")]
    ElectionIndex { position: usize, index: u32 },

    #[error("state has members but no genesis")]
    MissingGenesis,
}
