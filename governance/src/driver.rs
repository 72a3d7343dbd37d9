use crate::election::{conduct, select_participants, ElectionParams};
use crate::error::GovernanceError;
use crate::induction::{InductorPolicy, RoundRobin};
use crate::policy::{FollowTheLeader, VotePolicy};
use crate::rng::{election_rng, election_seed};
use chain::{ChainConfig, EDEN_CONFIG};
use containers::{ChainState, ElectionRecord, GenesisConfig, MemberId, Phase};
use tracing::{info, warn};

/// Governance phases that can be applied to a chain state.
///
/// Implementations mutate `state` in place and may leave it half-applied when
/// they fail; callers that need all-or-nothing semantics hand in a working
/// copy and discard it on error.
pub trait PhaseDriver {
    fn genesis(&mut self, state: &mut ChainState) -> Result<(), GovernanceError>;

    fn run_election(
        &mut self,
        state: &mut ChainState,
        params: ElectionParams,
    ) -> Result<ElectionRecord, GovernanceError>;

    fn induct_n(&mut self, state: &mut ChainState, count: u32) -> Result<Vec<MemberId>, GovernanceError>;
}

/// Eden governance rules: group elections decided by a two-thirds majority,
/// inductions vouched for by an existing member with spare capacity.
#[derive(Clone, Debug)]
pub struct EdenDriver<V = FollowTheLeader, I = RoundRobin> {
    pub config: ChainConfig,
    pub genesis: GenesisConfig,
    votes: V,
    inductors: I,
}

impl EdenDriver {
    pub fn new() -> Self {
        Self::with_policies(EDEN_CONFIG, GenesisConfig::default(), FollowTheLeader, RoundRobin)
    }
}

impl Default for EdenDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VotePolicy, I: InductorPolicy> EdenDriver<V, I> {
    pub fn with_policies(config: ChainConfig, genesis: GenesisConfig, votes: V, inductors: I) -> Self {
        Self {
            config,
            genesis,
            votes,
            inductors,
        }
    }

    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_genesis(mut self, genesis: GenesisConfig) -> Self {
        self.genesis = genesis;
        self
    }

    pub fn votes(&self) -> &V {
        &self.votes
    }

    fn require_genesis(state: &ChainState, phase: Phase) -> Result<(), GovernanceError> {
        if state.is_empty() {
            return Err(GovernanceError::NotInitialized(phase));
        }
        Ok(())
    }
}

impl<V: VotePolicy, I: InductorPolicy> PhaseDriver for EdenDriver<V, I> {
    fn genesis(&mut self, state: &mut ChainState) -> Result<(), GovernanceError> {
        if !state.is_empty() {
            return Err(GovernanceError::Initialization(format!(
                "chain already at sequence {} ({})",
                state.sequence(),
                state.phase()
            )));
        }
        if self.genesis.founders.is_empty() {
            return Err(GovernanceError::Initialization(
                "no founding members configured".to_string(),
            ));
        }

        let sequence = state.begin(Phase::Genesis);
        for founder in &self.genesis.founders {
            state.add_founder(founder.clone())?;
        }

        info!(
            community = %self.genesis.community,
            founders = self.genesis.founders.len(),
            sequence = sequence.0,
            "Genesis complete"
        );
        Ok(())
    }

    fn run_election(
        &mut self,
        state: &mut ChainState,
        params: ElectionParams,
    ) -> Result<ElectionRecord, GovernanceError> {
        Self::require_genesis(state, Phase::Election)?;

        let index = state.elections().len() as u32;
        let seed = election_seed(&state.state_root(), index);
        let mut rng = election_rng(&seed);

        let seats = select_participants(
            state,
            params.use_full_member_set,
            self.config.partial_participation_bps,
            &mut rng,
        );
        let tally = conduct(
            seats,
            &self.config,
            params.target_participation,
            params.strict,
            &mut self.votes,
            &mut rng,
        );

        let complete = tally.is_complete();
        if params.strict && !complete {
            let reason = tally
                .shortfall
                .unwrap_or(crate::error::IncompleteReason::NoParticipants);
            return Err(GovernanceError::ElectionIncomplete {
                reason,
                votes_processed: tally.votes_processed,
                target: params.target_participation,
            });
        }

        let sequence = state.begin(Phase::Election);
        let record = ElectionRecord {
            index,
            sequence,
            seed,
            participants: tally.participants,
            rounds: tally.rounds,
            chief_delegates: tally.chief_delegates,
            head_chief: tally.head_chief,
            votes_processed: tally.votes_processed,
            complete,
        };
        state.push_election(record.clone())?;

        if complete {
            info!(
                election = index,
                sequence = sequence.0,
                participants = record.participants,
                rounds = record.rounds.len(),
                head_chief = ?record.head_chief,
                "Election complete"
            );
        } else {
            warn!(
                election = index,
                sequence = sequence.0,
                votes_processed = record.votes_processed,
                reason = ?tally.shortfall,
                "Election recorded incomplete"
            );
        }
        Ok(record)
    }

    fn induct_n(&mut self, state: &mut ChainState, count: u32) -> Result<Vec<MemberId>, GovernanceError> {
        Self::require_genesis(state, Phase::Induction)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let capacity = self.config.induction_capacity;
        let sequence = state.begin(Phase::Induction);
        let mut inducted = Vec::new();

        for _ in 0..count {
            let inductor = self
                .inductors
                .select(state, capacity)
                .cloned()
                .ok_or(GovernanceError::InductionCapacity {
                    requested: count,
                    inducted: inducted.len() as u32,
                    capacity,
                })?;
            let inductee = MemberId::inductee(state.member_count() as u64);
            state.add_inductee(inductee.clone(), &inductor)?;
            inducted.push(inductee);
        }

        info!(
            inducted = inducted.len(),
            members = state.member_count(),
            sequence = sequence.0,
            "Induction batch complete"
        );
        Ok(inducted)
    }
}
