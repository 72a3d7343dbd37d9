use containers::{CheckpointIntegrity, Digest, Phase};
use governance::GovernanceError;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint {0:?} already exists")]
    Duplicate(String),

    #[error("checkpoint {0:?} not found")]
    NotFound(String),

    #[error("invalid checkpoint name {0:?}")]
    InvalidName(String),

    #[error("checkpoint {name:?} failed verification: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: CheckpointIntegrity,
    },

    #[error("checkpoint io at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("checkpoint encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NodeStartupError {
    #[error("live node already running with pid {0}")]
    AlreadyRunning(u32),

    #[error("failed to launch {program:?}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("node exited before reporting ready: {0}")]
    Exited(ExitStatus),

    #[error("node did not report ready within {0:?}")]
    Timeout(Duration),

    #[error("node reported state root {reported}, expected {expected}")]
    StateMismatch { expected: Digest, reported: Digest },

    #[error("startup state rejected: {0}")]
    InvalidState(#[from] CheckpointIntegrity),

    #[error("node io at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("node startup encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Failure of one harness step. Phase failures carry the phase they hit.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{phase} phase failed: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: GovernanceError,
    },

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    NodeStartup(#[from] NodeStartupError),
}

impl RunnerError {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            RunnerError::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    pub fn governance(&self) -> Option<&GovernanceError> {
        match self {
            RunnerError::Phase { source, .. } => Some(source),
            _ => None,
        }
    }
}
