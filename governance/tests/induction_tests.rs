use chain::{ChainConfig, EDEN_CONFIG};
use containers::{ChainState, GenesisConfig, MemberId, Phase, Sequence};
use governance::{EdenDriver, GovernanceError, LeastLoaded, PhaseDriver};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[test]
fn test_induct_batch() {
    let (mut driver, mut state) = common::genesis();
    let inducted = driver.induct_n(&mut state, 100).unwrap();

    assert_eq!(inducted.len(), 100);
    assert_eq!(state.member_count(), 103);
    assert_eq!(state.induction_count(), 100);
    assert_eq!(state.phase(), Phase::Induction);
    assert_eq!(state.sequence(), Sequence(2));
    assert_eq!(state.verify(), Ok(()));
}

#[test]
fn test_every_inductor_precedes_inductee() {
    let (_, state) = common::with_members(60);
    for member in state.members().iter().filter(|m| !m.is_founder()) {
        let inductor = state.inductor_of(&member.id).expect("inductor");
        let inductor = state.member(inductor).expect("registered");
        assert!(inductor.index < member.index);
    }
}

#[test]
fn test_induct_zero_is_noop() {
    let (mut driver, mut state) = common::genesis();
    let before = state.clone();
    assert!(driver.induct_n(&mut state, 0).unwrap().is_empty());
    assert_eq!(state, before);
}

fn run_batch<V: governance::VotePolicy, I: governance::InductorPolicy>(
    mut driver: EdenDriver<V, I>,
    count: u32,
) -> ChainState {
    let mut state = ChainState::new();
    driver.genesis(&mut state).unwrap();
    driver.induct_n(&mut state, count).unwrap();
    state
}

#[rstest]
#[case::round_robin(false)]
#[case::least_loaded(true)]
fn test_capacity_respected(#[case] least_loaded: bool) {
    let config = ChainConfig {
        induction_capacity: 2,
        ..EDEN_CONFIG
    };
    let state = if least_loaded {
        run_batch(
            EdenDriver::with_policies(
                config,
                GenesisConfig::default(),
                governance::FollowTheLeader,
                LeastLoaded,
            ),
            30,
        )
    } else {
        run_batch(EdenDriver::new().with_config(config), 30)
    };

    assert_eq!(state.member_count(), 33);
    assert!(state.members().iter().all(|m| m.inductions <= 2));
    assert_eq!(state.verify(), Ok(()));
}

#[test]
fn test_capacity_exhaustion_fails() {
    let config = ChainConfig {
        induction_capacity: 0,
        ..EDEN_CONFIG
    };
    let mut driver = EdenDriver::new().with_config(config);
    let mut state = ChainState::new();
    driver.genesis(&mut state).unwrap();

    let err = driver.induct_n(&mut state, 1).unwrap_err();
    assert_eq!(
        err,
        GovernanceError::InductionCapacity {
            requested: 1,
            inducted: 0,
            capacity: 0,
        }
    );
}

#[test]
fn test_least_loaded_spreads_inductions() {
    let mut driver = EdenDriver::with_policies(
        EDEN_CONFIG,
        GenesisConfig {
            community: "Eden".to_string(),
            founders: vec![MemberId::from("egeon"), MemberId::from("alice")],
        },
        governance::FollowTheLeader,
        LeastLoaded,
    );
    let mut state = ChainState::new();
    driver.genesis(&mut state).unwrap();
    driver.induct_n(&mut state, 2).unwrap();

    assert_eq!(state.inductor_of(&MemberId::inductee(2)), Some(&MemberId::from("egeon")));
    assert_eq!(state.inductor_of(&MemberId::inductee(3)), Some(&MemberId::from("alice")));
}
