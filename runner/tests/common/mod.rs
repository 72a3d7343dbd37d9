//! Common helpers for harness tests

use runner::{NodeConfig, NodeRunner};
use std::path::Path;
use std::time::Duration;

/// Runner whose node program is `sh -c <script> sh`, so the script sees the
/// startup flags as `$1..$8`: `$2` is the startup file, `$4` the ready file.
pub fn shell_runner(data_dir: &Path, script: &str, timeout: Duration) -> NodeRunner {
    let config = NodeConfig::new("sh", data_dir)
        .with_args(["-c", script, "sh"])
        .with_ready_timeout(timeout)
        .with_poll_interval(Duration::from_millis(10));
    NodeRunner::with_config("harness-test", config)
}

/// Runner with a node program that is never started.
pub fn offline_runner(data_dir: &Path) -> NodeRunner {
    NodeRunner::with_config("harness-test", NodeConfig::new("/nonexistent/eden_node", data_dir))
}

/// Offline runner that has gone through genesis and one full election.
pub fn elected_runner(data_dir: &Path) -> NodeRunner {
    let mut runner = offline_runner(data_dir);
    runner.tester.genesis().expect("genesis");
    runner.tester.run_election(true, 10_000, true).expect("election");
    runner
}
