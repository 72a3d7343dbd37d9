mod common;

use common::elected_runner;
use pretty_assertions::assert_eq;
use rstest::rstest;
use runner::{CheckpointError, CheckpointStore, RunnerError};
use containers::Checkpoint;
use std::fs;

#[test]
fn test_restore_returns_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = elected_runner(dir.path());
    let saved = runner.tester.state().clone();
    runner.checkpoint("small_election").unwrap();

    runner.tester.induct_n(10).unwrap();
    assert_ne!(runner.tester.state(), &saved);

    runner.restore("small_election").unwrap();
    assert_eq!(runner.tester.state(), &saved);
    assert_eq!(runner.tester.state().state_root(), saved.state_root());
}

#[test]
fn test_checkpoint_is_unaffected_by_later_phases() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = elected_runner(dir.path());
    let root = runner.checkpoint("small_election").unwrap().state_root();

    runner.tester.induct_n(20).unwrap();
    runner.tester.run_election(true, 10_000, true).unwrap();

    let checkpoint = runner.checkpoints().get("small_election").unwrap();
    assert_eq!(checkpoint.state_root(), root);
    assert_eq!(checkpoint.state().state_root(), root);
    assert_eq!(checkpoint.state().member_count(), 3);
}

#[test]
fn test_restores_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = elected_runner(dir.path());
    runner.checkpoint("base").unwrap();

    runner.restore("base").unwrap();
    let first = runner.tester.induct_n(4).unwrap();
    runner.restore("base").unwrap();
    assert_eq!(runner.tester.state().member_count(), 3);

    // Same starting state, same deterministic rules
    let second = runner.tester.induct_n(4).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_duplicate_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = elected_runner(dir.path());
    let root = runner.checkpoint("inductions").unwrap().state_root();

    runner.tester.induct_n(2).unwrap();
    let err = runner.checkpoint("inductions").unwrap_err();

    assert!(matches!(
        err,
        RunnerError::Checkpoint(CheckpointError::Duplicate(ref name)) if name == "inductions"
    ));
    assert_eq!(runner.checkpoints().len(), 1);
    assert_eq!(runner.checkpoints().get("inductions").unwrap().state_root(), root);
}

#[test]
fn test_unknown_name_leaves_state_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = elected_runner(dir.path());
    let before = runner.tester.state().clone();

    let err = runner.restore("missing").unwrap_err();

    assert!(matches!(
        err,
        RunnerError::Checkpoint(CheckpointError::NotFound(ref name)) if name == "missing"
    ));
    assert_eq!(runner.tester.state(), &before);
}

#[rstest]
#[case("")]
#[case("../escape")]
#[case("has space")]
fn test_invalid_names_are_rejected(#[case] name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = elected_runner(dir.path());

    let err = runner.checkpoint(name).unwrap_err();

    assert!(matches!(err, RunnerError::Checkpoint(CheckpointError::InvalidName(_))));
    assert!(runner.checkpoints().is_empty());
}

#[test]
fn test_names_are_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = elected_runner(dir.path());
    runner.checkpoint("small_election").unwrap();
    runner.checkpoint("inductions").unwrap();

    assert_eq!(runner.checkpoints().names(), vec!["inductions", "small_election"]);
    assert!(runner.checkpoints().contains("inductions"));
    assert!(!runner.checkpoints().contains("full_election"));
}

#[test]
fn test_persistent_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("checkpoints");
    let runner = elected_runner(dir.path());

    let mut store = CheckpointStore::persistent(&store_dir).unwrap();
    let saved = store.insert("small_election", runner.tester.state()).unwrap().clone();
    assert!(store_dir.join("small_election.json").exists());

    let loaded = CheckpointStore::load_dir(&store_dir).unwrap();
    assert_eq!(loaded.names(), vec!["small_election"]);
    assert_eq!(loaded.get("small_election"), Some(&saved));
    assert_eq!(loaded.restore("small_election").unwrap(), *runner.tester.state());
}

#[test]
fn test_loaded_store_keeps_write_once_names() {
    let dir = tempfile::tempdir().unwrap();
    let runner = elected_runner(dir.path());
    let mut store = CheckpointStore::persistent(dir.path().join("checkpoints")).unwrap();
    store.insert("base", runner.tester.state()).unwrap();

    let mut loaded = CheckpointStore::load_dir(dir.path().join("checkpoints")).unwrap();
    let err = loaded.insert("base", runner.tester.state()).unwrap_err();

    assert!(matches!(err, CheckpointError::Duplicate(_)));
}

#[test]
fn test_tampered_checkpoint_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("checkpoints");
    let runner = elected_runner(dir.path());
    let mut store = CheckpointStore::persistent(&store_dir).unwrap();
    store.insert("base", runner.tester.state()).unwrap();

    let path = store_dir.join("base.json");
    let tampered = fs::read_to_string(&path).unwrap().replacen("alice", "mallory", 1);
    fs::write(&path, tampered).unwrap();

    let err = CheckpointStore::load_dir(&store_dir).unwrap_err();
    assert!(matches!(err, CheckpointError::Corrupt { ref name, .. } if name == "base"));
}

#[test]
fn test_persistent_store_keeps_names_already_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("checkpoints");
    let mut runner = elected_runner(dir.path());

    let mut first = CheckpointStore::persistent(&store_dir).unwrap();
    let root = first.insert("base", runner.tester.state()).unwrap().state_root();

    runner.tester.induct_n(5).unwrap();
    let mut second = CheckpointStore::persistent(&store_dir).unwrap();
    let err = second.insert("base", runner.tester.state()).unwrap_err();

    assert!(matches!(err, CheckpointError::Duplicate(ref name) if name == "base"));
    assert!(second.is_empty());
    let reloaded = CheckpointStore::load_dir(&store_dir).unwrap();
    assert_eq!(reloaded.get("base").unwrap().state_root(), root);
}

#[test]
fn test_invalid_name_on_disk_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("checkpoints");
    fs::create_dir_all(&store_dir).unwrap();
    let runner = elected_runner(dir.path());

    let checkpoint = Checkpoint::capture("has space", runner.tester.state());
    fs::write(
        store_dir.join("has space.json"),
        serde_json::to_vec(&checkpoint).unwrap(),
    )
    .unwrap();

    let err = CheckpointStore::load_dir(&store_dir).unwrap_err();
    assert!(matches!(err, CheckpointError::InvalidName(ref name) if name == "has space"));
}
