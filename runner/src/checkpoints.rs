use crate::error::CheckpointError;
use containers::{ChainState, Checkpoint};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CHECKPOINT_EXTENSION: &str = "json";

/// Named, write-once snapshots of chain state.
///
/// An in-memory store lives as long as the harness session. A persistent
/// store also writes every checkpoint to `<dir>/<name>.json` and can be
/// reloaded from that directory later.
#[derive(Debug, Default)]
pub struct CheckpointStore {
    checkpoints: BTreeMap<String, Checkpoint>,
    directory: Option<PathBuf>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store backed by `dir`, which is created if missing.
    pub fn persistent(dir: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| CheckpointError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            checkpoints: BTreeMap::new(),
            directory: Some(dir),
        })
    }

    /// Loads every checkpoint file in `dir`. Each one must verify against its
    /// recorded root, and its file name must match the name inside it.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let dir = dir.as_ref().to_path_buf();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CheckpointError::Io { path, source }
        };

        info!(path = ?dir, "Loading checkpoints");

        let mut store = Self::persistent(&dir)?;
        for entry in fs::read_dir(&dir).map_err(io_err(&dir))? {
            let path = entry.map_err(io_err(&dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CHECKPOINT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let bytes = fs::read(&path).map_err(io_err(&path))?;
            let checkpoint: Checkpoint = serde_json::from_slice(&bytes)?;
            validate_name(checkpoint.name())?;
            if checkpoint.name() != stem {
                return Err(CheckpointError::InvalidName(checkpoint.name().to_string()));
            }
            checkpoint.verify().map_err(|source| CheckpointError::Corrupt {
                name: checkpoint.name().to_string(),
                source,
            })?;

            debug!(
                name = checkpoint.name(),
                sequence = checkpoint.sequence().0,
                "Loaded checkpoint"
            );
            store
                .checkpoints
                .insert(checkpoint.name().to_string(), checkpoint);
        }

        info!(count = store.len(), "Checkpoints loaded");
        Ok(store)
    }

    /// Captures `state` under `name`. Names are write-once, both in memory
    /// and in the backing directory.
    pub fn insert(&mut self, name: &str, state: &ChainState) -> Result<&Checkpoint, CheckpointError> {
        validate_name(name)?;
        let on_disk = self
            .directory
            .as_deref()
            .is_some_and(|dir| checkpoint_path(dir, name).exists());
        if on_disk || self.checkpoints.contains_key(name) {
            return Err(CheckpointError::Duplicate(name.to_string()));
        }

        let checkpoint = Checkpoint::capture(name, state);
        if let Some(dir) = &self.directory {
            write_checkpoint(dir, &checkpoint)?;
        }

        info!(
            name,
            sequence = checkpoint.sequence().0,
            root = %checkpoint.state_root(),
            "Checkpoint saved"
        );
        Ok(self.checkpoints.entry(name.to_string()).or_insert(checkpoint))
    }

    pub fn get(&self, name: &str) -> Option<&Checkpoint> {
        self.checkpoints.get(name)
    }

    /// Fresh copy of the state saved under `name`.
    pub fn restore(&self, name: &str) -> Result<ChainState, CheckpointError> {
        self.get(name)
            .map(Checkpoint::restore)
            .ok_or_else(|| CheckpointError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checkpoints.contains_key(name)
    }

    /// Checkpoint names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.checkpoints.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

fn checkpoint_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{CHECKPOINT_EXTENSION}"))
}

fn validate_name(name: &str) -> Result<(), CheckpointError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(CheckpointError::InvalidName(name.to_string()))
    }
}

// Written to a temp file, then renamed into place
fn write_checkpoint(dir: &Path, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
    let path = checkpoint_path(dir, checkpoint.name());
    let tmp = dir.join(format!(".{}.tmp", checkpoint.name()));
    let bytes = serde_json::to_vec_pretty(checkpoint)?;

    fs::write(&tmp, bytes).map_err(|source| CheckpointError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, &path).map_err(|source| CheckpointError::Io { path, source })
}
