//! Common helpers for phase driver tests

use containers::ChainState;
use governance::{EdenDriver, PhaseDriver};

/// Fresh driver and a state that has been through genesis.
pub fn genesis() -> (EdenDriver, ChainState) {
    let mut driver = EdenDriver::new();
    let mut state = ChainState::new();
    driver.genesis(&mut state).expect("genesis");
    (driver, state)
}

/// Genesis followed by a batch of `count` inductions.
pub fn with_members(count: u32) -> (EdenDriver, ChainState) {
    let (mut driver, mut state) = genesis();
    driver.induct_n(&mut state, count).expect("inductions");
    (driver, state)
}
