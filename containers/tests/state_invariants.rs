use containers::{
    ChainState, Digest, ElectionRecord, MemberId, Origin, Phase, Sequence, StateError,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;
use common::{founded, id, with_inductions};

fn election(index: u32, sequence: u64) -> ElectionRecord {
    ElectionRecord {
        index,
        sequence: Sequence(sequence),
        seed: Digest::zero(),
        participants: 3,
        rounds: Vec::new(),
        chief_delegates: vec![id("alice")],
        head_chief: Some(id("alice")),
        votes_processed: 3,
        complete: true,
    }
}

#[test]
fn test_genesis_registry() {
    let state = founded(&["egeon", "alice", "pip"]);

    assert_eq!(state.sequence(), Sequence(1));
    assert_eq!(state.phase(), Phase::Genesis);
    assert_eq!(state.member_count(), 3);
    assert_eq!(state.founders().count(), 3);
    assert!(state.elections().is_empty());
    assert!(state.trust_graph().is_empty());
    assert_eq!(state.verify(), Ok(()));
}

#[test]
fn test_inductee_links_to_inductor() {
    let state = with_inductions(
        founded(&["egeon"]),
        &[("alice", "egeon"), ("pip", "alice")],
    );

    assert_eq!(state.inductor_of(&id("alice")), Some(&id("egeon")));
    assert_eq!(state.inductor_of(&id("pip")), Some(&id("alice")));
    assert_eq!(state.member(&id("egeon")).unwrap().inductions, 1);
    assert_eq!(state.member(&id("pip")).unwrap().origin, Origin::Inducted);
    assert_eq!(state.sequence(), Sequence(3));
    assert_eq!(state.verify(), Ok(()));
}

#[test]
fn test_inductor_must_already_be_member() {
    let mut state = founded(&["egeon"]);
    state.begin(Phase::Induction);

    let err = state.add_inductee(id("alice"), &id("pip")).unwrap_err();
    assert_eq!(
        err,
        StateError::UnknownInductor {
            inductee: id("alice"),
            inductor: id("pip"),
        }
    );
    assert!(!state.is_member(&id("alice")));
}

#[rstest]
#[case::founder("egeon")]
#[case::inductee("alice")]
fn test_duplicate_member_rejected(#[case] name: &str) {
    let mut state = with_inductions(founded(&["egeon"]), &[("alice", "egeon")]);
    let before = state.clone();

    state.begin(Phase::Induction);
    let err = state.add_inductee(id(name), &id("egeon")).unwrap_err();

    assert_eq!(err, StateError::DuplicateMember(id(name)));
    assert_eq!(state.members(), before.members());
    assert_eq!(state.trust_graph(), before.trust_graph());
}

#[test]
fn test_election_history_is_ordered() {
    let mut state = founded(&["alice"]);
    state.begin(Phase::Election);
    state.push_election(election(0, 2)).unwrap();

    // Same sequence again is rejected
    let err = state.push_election(election(1, 2)).unwrap_err();
    assert_eq!(
        err,
        StateError::ElectionSequence {
            index: 1,
            sequence: Sequence(2)
        }
    );

    // Index must follow history length
    state.begin(Phase::Election);
    let err = state.push_election(election(5, 3)).unwrap_err();
    assert!(matches!(err, StateError::ElectionIndex { position: 1, index: 5 }));

    state.push_election(election(1, 3)).unwrap();
    assert_eq!(state.elections().len(), 2);
    assert_eq!(state.verify(), Ok(()));
}

#[test]
fn test_election_cannot_be_ahead_of_chain() {
    let mut state = founded(&["alice"]);
    let err = state.push_election(election(0, 9)).unwrap_err();
    assert!(matches!(err, StateError::FutureSequence { .. }));
}

#[test]
fn test_verify_rejects_forward_inductor() {
    // Hand-built state where the inductor joined after the inductee
    let value = serde_json::json!({
        "sequence": 2,
        "phase": "induction",
        "members": [
            { "id": "egeon", "index": 0, "joined_at": 1, "origin": "founder", "inductions": 1 },
            { "id": "alice", "index": 1, "joined_at": 2, "origin": "inducted", "inductions": 0 },
            { "id": "pip", "index": 2, "joined_at": 2, "origin": "inducted", "inductions": 1 },
        ],
        "elections": [],
        "trustGraph": { "alice": "pip", "pip": "egeon" }
    });
    let state: ChainState = serde_json::from_value(value).unwrap();

    assert_eq!(
        state.verify(),
        Err(StateError::ForwardInductor {
            inductee: id("alice"),
            inductor: id("pip"),
        })
    );
}

#[test]
fn test_verify_rejects_uninitialized_with_members() {
    let value = serde_json::json!({
        "sequence": 0,
        "phase": "uninitialized",
        "members": [
            { "id": "egeon", "index": 0, "joined_at": 0, "origin": "founder" },
        ],
        "elections": [],
        "trustGraph": {}
    });
    let state: ChainState = serde_json::from_value(value).unwrap();
    assert_eq!(state.verify(), Err(StateError::MissingGenesis));
}

#[test]
fn test_state_survives_json() {
    let state = with_inductions(founded(&["egeon", "alice"]), &[("pip", "alice")]);
    let encoded = serde_json::to_string(&state).unwrap();
    let decoded: ChainState = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, state);
    assert_eq!(decoded.state_root(), state.state_root());
}

#[test]
fn test_inductee_names() {
    assert_eq!(MemberId::inductee(0).as_str(), "edenmember00000");
    assert_ne!(MemberId::inductee(1), MemberId::inductee(10));
}
