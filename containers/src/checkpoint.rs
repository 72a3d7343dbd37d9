use crate::{ChainState, Digest, Sequence, StateError};
use serde::{Deserialize, Serialize};

/// A named, immutable capture of a chain state.
///
/// The captured state is a deep copy: later phases applied to the source state
/// never reach it, and every `restore` hands out a fresh, independently
/// mutable copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    name: String,
    sequence: Sequence,
    state_root: Digest,
    state: ChainState,
}

impl Checkpoint {
    pub fn capture(name: impl Into<String>, state: &ChainState) -> Self {
        Self {
            name: name.into(),
            sequence: state.sequence(),
            state_root: state.state_root(),
            state: state.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn state_root(&self) -> Digest {
        self.state_root
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    /// Fresh copy of the captured state.
    pub fn restore(&self) -> ChainState {
        self.state.clone()
    }

    /// Re-derives the root and runs the state invariants. Used after loading a
    /// checkpoint from outside the process.
    pub fn verify(&self) -> Result<(), CheckpointIntegrity> {
        self.state.verify()?;
        let actual = self.state.state_root();
        if actual != self.state_root || self.state.sequence() != self.sequence {
            return Err(CheckpointIntegrity::RootMismatch {
                expected: self.state_root,
                actual,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CheckpointIntegrity {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("checkpoint root {expected} does not match state root {actual}")]
    RootMismatch { expected: Digest, actual: Digest },
}
