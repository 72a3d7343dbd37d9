use crate::error::NodeStartupError;
use chain::EDEN_CONFIG;
use containers::{ChainState, CheckpointIntegrity, Digest, Sequence};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Environment variable naming the node binary when no program is configured.
pub const NODE_BIN_ENV: &str = "EDEN_NODE_BIN";
const DEFAULT_NODE_BIN: &str = "eden_node";

const STARTUP_FILE: &str = "startup.json";
const READY_FILE: &str = "ready.json";

/// How to launch and wait for a live node.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub program: PathBuf,
    /// Passed before the startup flags the promoter appends.
    pub args: Vec<String>,
    /// Holds the startup state and the ready report.
    pub data_dir: PathBuf,
    pub address: IpAddr,
    /// 0 lets the node pick a free port.
    pub metrics_port: u16,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    /// Delete `data_dir` when the owning runner is dropped.
    pub remove_data_dir: bool,
}

impl NodeConfig {
    pub fn new(program: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            data_dir: data_dir.into(),
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            metrics_port: 0,
            ready_timeout: Duration::from_millis(EDEN_CONFIG.ready_timeout_ms),
            poll_interval: Duration::from_millis(EDEN_CONFIG.ready_poll_interval_ms),
            remove_data_dir: false,
        }
    }

    /// Node binary from `EDEN_NODE_BIN` (or `eden_node` on the PATH), with a
    /// scratch data directory under the system temp dir that is removed with
    /// the runner.
    pub fn from_env(name: &str) -> Self {
        let program = std::env::var_os(NODE_BIN_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NODE_BIN));
        let data_dir = std::env::temp_dir().join(format!("eden-{name}-{}", std::process::id()));
        Self::new(program, data_dir).with_remove_data_dir(true)
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_remove_data_dir(mut self, remove: bool) -> Self {
        self.remove_data_dir = remove;
        self
    }

    pub fn with_metrics_port(mut self, port: u16) -> Self {
        self.metrics_port = port;
        self
    }

    pub fn startup_path(&self) -> PathBuf {
        self.data_dir.join(STARTUP_FILE)
    }

    pub fn ready_path(&self) -> PathBuf {
        self.data_dir.join(READY_FILE)
    }
}

/// Everything a node needs to come up on a harness-built state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStartup {
    pub name: String,
    pub chain: ChainState,
    pub state_root: Digest,
    pub address: IpAddr,
    pub metrics_port: u16,
}

impl NodeStartup {
    pub fn new(name: &str, chain: &ChainState, address: IpAddr, metrics_port: u16) -> Self {
        Self {
            name: name.to_string(),
            chain: chain.clone(),
            state_root: chain.state_root(),
            address,
            metrics_port,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NodeStartupError> {
        let bytes = read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NodeStartupError> {
        write_atomic(path.as_ref(), &serde_json::to_vec_pretty(self)?)
    }

    /// Checks the chain invariants and that the recorded root matches.
    pub fn verify(&self) -> Result<(), NodeStartupError> {
        self.chain.verify().map_err(CheckpointIntegrity::from)?;
        let actual = self.chain.state_root();
        if actual != self.state_root {
            return Err(NodeStartupError::StateMismatch {
                expected: self.state_root,
                reported: actual,
            });
        }
        Ok(())
    }
}

/// Written by a node once it serves the state it was started with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyReport {
    pub pid: u32,
    pub name: String,
    pub sequence: Sequence,
    pub members: u64,
    pub elections: u64,
    pub state_root: Digest,
    pub metrics_address: SocketAddr,
}

impl ReadyReport {
    pub fn new(pid: u32, startup: &NodeStartup, metrics_address: SocketAddr) -> Self {
        Self {
            pid,
            name: startup.name.clone(),
            sequence: startup.chain.sequence(),
            members: startup.chain.member_count() as u64,
            elections: startup.chain.elections().len() as u64,
            state_root: startup.state_root,
            metrics_address,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NodeStartupError> {
        let bytes = read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Readers never observe a partially written report.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NodeStartupError> {
        write_atomic(path.as_ref(), &serde_json::to_vec_pretty(self)?)
    }
}

/// Launches node processes and waits for them to report ready.
#[derive(Clone, Debug)]
pub struct NodePromoter {
    config: NodeConfig,
}

impl NodePromoter {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Starts a node on `state` and blocks until it reports ready.
    ///
    /// On any failure the child, if one was spawned, is killed before the
    /// error is returned.
    pub fn promote(&self, name: &str, state: &ChainState) -> Result<LiveNode, NodeStartupError> {
        let config = &self.config;
        fs::create_dir_all(&config.data_dir).map_err(|source| NodeStartupError::Io {
            path: config.data_dir.clone(),
            source,
        })?;

        let ready_path = config.ready_path();
        if ready_path.exists() {
            fs::remove_file(&ready_path).map_err(|source| NodeStartupError::Io {
                path: ready_path.clone(),
                source,
            })?;
        }

        let startup = NodeStartup::new(name, state, config.address, config.metrics_port);
        let startup_path = config.startup_path();
        startup.save(&startup_path)?;

        info!(
            program = ?config.program,
            name,
            sequence = state.sequence().0,
            root = %startup.state_root,
            "Starting node"
        );

        let started = Instant::now();
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .arg("--state")
            .arg(&startup_path)
            .arg("--ready-file")
            .arg(&ready_path)
            .arg("--address")
            .arg(config.address.to_string())
            .arg("--metrics-port")
            .arg(config.metrics_port.to_string())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| NodeStartupError::Launch {
                program: config.program.clone(),
                source,
            })?;

        match self.wait_ready(&mut child, &ready_path, startup.state_root) {
            Ok(report) => {
                info!(
                    pid = report.pid,
                    metrics = %report.metrics_address,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Node ready"
                );
                Ok(LiveNode {
                    child: Some(child),
                    report,
                })
            }
            Err(err) => {
                warn!(error = %err, "Node failed to start");
                terminate(&mut child);
                Err(err)
            }
        }
    }

    fn wait_ready(
        &self,
        child: &mut Child,
        ready_path: &Path,
        expected: Digest,
    ) -> Result<ReadyReport, NodeStartupError> {
        let deadline = Instant::now() + self.config.ready_timeout;
        loop {
            if let Some(status) = child.try_wait().map_err(|source| NodeStartupError::Io {
                path: self.config.program.clone(),
                source,
            })? {
                return Err(NodeStartupError::Exited(status));
            }

            if ready_path.exists() {
                let report = ReadyReport::load(ready_path)?;
                if report.state_root != expected {
                    return Err(NodeStartupError::StateMismatch {
                        expected,
                        reported: report.state_root,
                    });
                }
                return Ok(report);
            }

            if Instant::now() >= deadline {
                return Err(NodeStartupError::Timeout(self.config.ready_timeout));
            }
            debug!(path = ?ready_path, "Waiting for ready report");
            thread::sleep(self.config.poll_interval);
        }
    }
}

/// A running node process. Dropping it kills the process.
#[derive(Debug)]
pub struct LiveNode {
    child: Option<Child>,
    report: ReadyReport,
}

impl LiveNode {
    pub fn pid(&self) -> u32 {
        self.report.pid
    }

    pub fn report(&self) -> &ReadyReport {
        &self.report
    }

    pub fn metrics_address(&self) -> SocketAddr {
        self.report.metrics_address
    }

    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Kills the process and reaps it.
    pub fn stop(mut self) -> Option<ExitStatus> {
        self.child.take().and_then(|mut child| terminate(&mut child))
    }
}

impl Drop for LiveNode {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!(pid = self.report.pid, "Killing live node on teardown");
            terminate(&mut child);
        }
    }
}

fn terminate(child: &mut Child) -> Option<ExitStatus> {
    if let Ok(Some(status)) = child.try_wait() {
        return Some(status);
    }
    if let Err(err) = child.kill() {
        warn!(error = %err, "Failed to kill node process");
    }
    child.wait().ok()
}

fn read(path: &Path) -> Result<Vec<u8>, NodeStartupError> {
    fs::read(path).map_err(|source| NodeStartupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), NodeStartupError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| NodeStartupError::Io { path, source }
    };
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(io_err(path))
}
