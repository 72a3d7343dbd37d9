use containers::{GenesisConfig, MemberId};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn test_default_founders() {
    let config = GenesisConfig::default();
    assert_eq!(config.community, "Eden");
    assert_eq!(
        config.founders,
        vec![MemberId::from("egeon"), MemberId::from("alice"), MemberId::from("pip")]
    );
}

#[test]
fn test_load_from_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "COMMUNITY: Test Eden").unwrap();
    writeln!(file, "FOUNDERS:").unwrap();
    writeln!(file, "  - dan").unwrap();
    writeln!(file, "  - todd").unwrap();

    let config = GenesisConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.community, "Test Eden");
    assert_eq!(config.founders, vec![MemberId::from("dan"), MemberId::from("todd")]);
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(GenesisConfig::load_from_file("/nonexistent/genesis.yaml").is_err());
}
