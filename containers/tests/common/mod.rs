//! Shared builders for chain-state tests

use containers::{ChainState, MemberId, Phase};

pub fn id(name: &str) -> MemberId {
    MemberId::from(name)
}

/// Genesis state with the given founders.
pub fn founded(founders: &[&str]) -> ChainState {
    let mut state = ChainState::new();
    state.begin(Phase::Genesis);
    for founder in founders {
        state.add_founder(id(founder)).expect("founder");
    }
    state
}

/// Inducts each `(inductee, inductor)` pair in its own induction phase.
pub fn with_inductions(mut state: ChainState, pairs: &[(&str, &str)]) -> ChainState {
    for (inductee, inductor) in pairs {
        state.begin(Phase::Induction);
        state.add_inductee(id(inductee), &id(inductor)).expect("induction");
    }
    state
}
