pub mod server;

use containers::ChainState;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    // Chain
    chain_sequence: IntGauge,
    members_total: IntGauge,
    founders_total: IntGauge,
    inductions_total: IntGauge,
    // Elections
    elections_total: IntGauge,
    elections_incomplete: IntGauge,
    last_election_participants: IntGauge,
    last_election_rounds: IntGauge,
    // Node
    node_ready: IntGauge,
    startup_time: HistogramVec,
}

fn gauge(registry: &Registry, name: &str, help: &str) -> IntGauge {
    let gauge = IntGauge::with_opts(Opts::new(name, help)).expect("valid gauge options");
    registry.register(Box::new(gauge.clone())).expect("gauge registered once");
    gauge
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let chain_sequence = gauge(&registry, "eden_chain_sequence", "Sequence number of the served chain state");
        let members_total = gauge(&registry, "eden_members_total", "Number of members in the registry");
        let founders_total = gauge(&registry, "eden_founders_total", "Number of founding members");
        let inductions_total = gauge(&registry, "eden_inductions_total", "Number of edges in the induction trust graph");

        let elections_total = gauge(&registry, "eden_elections_total", "Number of recorded elections");
        let elections_incomplete = gauge(&registry, "eden_elections_incomplete_total", "Number of elections recorded incomplete");
        let last_election_participants = gauge(&registry, "eden_last_election_participants", "Participants in the latest election");
        let last_election_rounds = gauge(&registry, "eden_last_election_rounds", "Rounds in the latest election");

        let node_ready = gauge(&registry, "eden_node_ready", "1 once the node has reported readiness");

        let startup_time = HistogramVec::new(
            HistogramOpts::new("eden_node_startup_seconds", "Time taken to load and verify the startup state")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 1.0]),
            &[],
        ).expect("valid histogram options");
        registry.register(Box::new(startup_time.clone())).expect("histogram registered once");

        Self {
            registry,
            chain_sequence,
            members_total,
            founders_total,
            inductions_total,
            elections_total,
            elections_incomplete,
            last_election_participants,
            last_election_rounds,
            node_ready,
            startup_time,
        }
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::<u8>::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer).expect("failed to encode metrics");
        String::from_utf8(buffer).expect("metrics not utf8")
    }

    /// Publishes the chain gauges for `state`.
    pub fn observe_chain(&self, state: &ChainState) {
        self.chain_sequence.set(state.sequence().0 as i64);
        self.members_total.set(state.member_count() as i64);
        self.founders_total.set(state.founders().count() as i64);
        self.inductions_total.set(state.induction_count() as i64);

        let elections = state.elections();
        self.elections_total.set(elections.len() as i64);
        self.elections_incomplete.set(elections.iter().filter(|e| !e.complete).count() as i64);
        if let Some(last) = state.last_election() {
            self.last_election_participants.set(last.participants as i64);
            self.last_election_rounds.set(last.rounds.len() as i64);
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.node_ready.set(ready as i64);
    }

    pub fn observe_startup_time(&self, duration: f64) {
        self.startup_time.with_label_values::<&str>(&[]).observe(duration);
    }

    pub fn members_total(&self) -> i64 {
        self.members_total.get()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
