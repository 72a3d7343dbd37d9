use crate::error::RunnerError;
use containers::{ChainState, ElectionRecord, MemberId, Phase, StateError};
use governance::{EdenDriver, ElectionParams, GovernanceError, PhaseDriver};
use tracing::debug;

/// Applies governance phases to the harness state, one at a time.
///
/// Every phase runs against a working copy. The copy replaces the current
/// state only once the driver succeeded and the result still verifies, so a
/// failed phase leaves the state exactly as it was.
#[derive(Debug)]
pub struct Tester<D = EdenDriver> {
    driver: D,
    state: ChainState,
}

impl<D: PhaseDriver> Tester<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: ChainState::new(),
        }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn genesis(&mut self) -> Result<(), RunnerError> {
        self.apply(Phase::Genesis, |driver, state| driver.genesis(state))
    }

    pub fn run_election(
        &mut self,
        use_full_member_set: bool,
        target_participation: u64,
        strict: bool,
    ) -> Result<ElectionRecord, RunnerError> {
        let params = ElectionParams::new(use_full_member_set, target_participation, strict);
        self.apply(Phase::Election, |driver, state| driver.run_election(state, params))
    }

    pub fn induct_n(&mut self, count: u32) -> Result<Vec<MemberId>, RunnerError> {
        self.apply(Phase::Induction, |driver, state| driver.induct_n(state, count))
    }

    /// Swaps in `state` wholesale and returns the one it replaced.
    pub(crate) fn replace_state(&mut self, state: ChainState) -> ChainState {
        std::mem::replace(&mut self.state, state)
    }

    fn apply<T>(
        &mut self,
        phase: Phase,
        op: impl FnOnce(&mut D, &mut ChainState) -> Result<T, GovernanceError>,
    ) -> Result<T, RunnerError> {
        let mut working = self.state.clone();
        let output = op(&mut self.driver, &mut working)
            .and_then(|output| {
                check_transition(&self.state, &working)?;
                Ok(output)
            })
            .map_err(|source| RunnerError::Phase { phase, source })?;

        debug!(
            %phase,
            from = self.state.sequence().0,
            to = working.sequence().0,
            "Phase committed"
        );
        self.state = working;
        Ok(output)
    }
}

impl Default for Tester {
    fn default() -> Self {
        Self::new(EdenDriver::new())
    }
}

/// A committed phase must leave a verifiable state and never move the
/// sequence backwards. A phase that changes nothing may keep the sequence.
fn check_transition(before: &ChainState, after: &ChainState) -> Result<(), GovernanceError> {
    after.verify()?;
    let regressed = after.sequence() < before.sequence()
        || (after.sequence() == before.sequence() && after != before);
    if regressed {
        return Err(StateError::SequenceRegression {
            current: before.sequence(),
            next: after.sequence(),
        }
        .into());
    }
    Ok(())
}
