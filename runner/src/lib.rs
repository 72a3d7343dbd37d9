// Governance simulation harness: drives phases, keeps checkpoints, promotes nodes
use containers::Checkpoint;
use governance::{EdenDriver, PhaseDriver};
use std::fs;
use std::io::ErrorKind;
use tracing::{info, warn};

pub mod checkpoints;
pub mod error;
pub mod promoter;
pub mod tester;

pub use checkpoints::CheckpointStore;
pub use error::{CheckpointError, NodeStartupError, RunnerError};
pub use promoter::{LiveNode, NodeConfig, NodePromoter, NodeStartup, ReadyReport, NODE_BIN_ENV};
pub use tester::Tester;

/// One harness session: a chain under test, its checkpoints and at most one
/// live node started from it.
///
/// ```no_run
/// use runner::NodeRunner;
///
/// let mut runner = NodeRunner::new("eden");
/// runner.tester.genesis()?;
/// runner.tester.run_election(true, 10_000, true)?;
/// runner.checkpoint("small_election")?;
/// runner.tester.induct_n(100)?;
/// runner.restore("small_election")?;
/// # Ok::<(), runner::RunnerError>(())
/// ```
pub struct NodeRunner<D = EdenDriver> {
    name: String,
    pub tester: Tester<D>,
    checkpoints: CheckpointStore,
    promoter: NodePromoter,
    live_node: Option<LiveNode>,
}

impl NodeRunner {
    /// Default Eden driver, in-memory checkpoints, node binary from the
    /// environment.
    pub fn new(name: &str) -> Self {
        Self::with_config(name, NodeConfig::from_env(name))
    }

    pub fn with_config(name: &str, config: NodeConfig) -> Self {
        Self::with_driver(name, EdenDriver::new(), config)
    }
}

impl<D: PhaseDriver> NodeRunner<D> {
    pub fn with_driver(name: &str, driver: D, config: NodeConfig) -> Self {
        info!(
            name,
            program = ?config.program,
            data_dir = ?config.data_dir,
            "Harness initialized"
        );
        Self {
            name: name.to_string(),
            tester: Tester::new(driver),
            checkpoints: CheckpointStore::new(),
            promoter: NodePromoter::new(config),
            live_node: None,
        }
    }

    /// Replaces the checkpoint store, e.g. with one loaded from disk.
    pub fn with_checkpoints(mut self, checkpoints: CheckpointStore) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Saves the current state under `name`. Names are write-once.
    pub fn checkpoint(&mut self, name: &str) -> Result<&Checkpoint, RunnerError> {
        Ok(self.checkpoints.insert(name, self.tester.state())?)
    }

    /// Makes the state saved under `name` current. Later phases act on a
    /// copy, so the checkpoint itself never changes.
    pub fn restore(&mut self, name: &str) -> Result<(), RunnerError> {
        let state = self.checkpoints.restore(name)?;
        let previous = self.tester.replace_state(state);
        info!(
            name,
            from = previous.sequence().0,
            to = self.tester.state().sequence().0,
            "Checkpoint restored"
        );
        Ok(())
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn promoter(&self) -> &NodePromoter {
        &self.promoter
    }

    /// Launches a live node on the current state and waits for it to report
    /// ready. Only one node runs per session.
    pub fn start_node(&mut self) -> Result<&LiveNode, RunnerError> {
        if let Some(node) = self.live_node.as_mut() {
            if node.is_running() {
                return Err(NodeStartupError::AlreadyRunning(node.pid()).into());
            }
        }
        self.live_node = None;

        let node = self.promoter.promote(&self.name, self.tester.state())?;
        Ok(self.live_node.insert(node))
    }

    pub fn live_node(&self) -> Option<&LiveNode> {
        self.live_node.as_ref()
    }

    pub fn live_node_mut(&mut self) -> Option<&mut LiveNode> {
        self.live_node.as_mut()
    }

    /// Stops the live node, if any. Also happens when the runner is dropped.
    pub fn stop_node(&mut self) -> Option<std::process::ExitStatus> {
        self.live_node.take().and_then(LiveNode::stop)
    }
}

impl<D> Drop for NodeRunner<D> {
    fn drop(&mut self) {
        self.live_node = None;

        let config = self.promoter.config();
        if !config.remove_data_dir {
            return;
        }
        match fs::remove_dir_all(&config.data_dir) {
            Ok(()) => info!(data_dir = ?config.data_dir, "Removed node data directory"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(data_dir = ?config.data_dir, error = %err, "Failed to remove node data directory"),
        }
    }
}
