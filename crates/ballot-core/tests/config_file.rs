//! Configuration loading from disk

use assert_matches::assert_matches;
use ballot_core::config::ENV_CHAIN_ID;
use ballot_core::{Address, ChainId, ClientConfig, ConfigValidation, VotingError};
use std::io::Write;

#[test]
fn load_full_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
log_filter = "debug"

[network]
chain_id = 8009
name = "Local"
rpc_url = "http://localhost:8545"
explorer_url = "http://localhost:4000"

[network.native_currency]
name = "Zama"
symbol = "ZAMA"
decimals = 18

[ledger]
address = "0x{}"
"#,
        "AB".repeat(20)
    )
    .unwrap();

    let config = ClientConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.network.chain_id, ChainId(8009));
    assert_eq!(config.network.native_currency.symbol, "ZAMA");
    assert_eq!(config.ledger.address, Address([0xab; 20]));
    assert_eq!(config.log_filter, "debug");
    config.validate().unwrap();
}

#[test]
fn missing_file_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClientConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert_matches!(err, VotingError::Configuration { .. });
}

#[test]
fn explicit_missing_path_does_not_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_matches!(
        ClientConfig::resolve(Some(&dir.path().join("absent.toml"))),
        Err(VotingError::Configuration { .. })
    );
}

#[test]
fn malformed_toml_is_configuration_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[network\nchain_id = ").unwrap();
    let err = ClientConfig::load_from_file(file.path()).unwrap_err();
    assert_matches!(err, VotingError::Configuration { .. });
}

#[test]
fn env_overrides_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[network]\nchain_id = 1").unwrap();
    let mut config = ClientConfig::load_from_file(file.path()).unwrap();
    config.merge_env_from([(ENV_CHAIN_ID, "9000")]).unwrap();
    assert_eq!(config.network.chain_id, ChainId(9000));
}

#[test]
fn rendered_config_reloads() {
    let original = ClientConfig::default();
    let rendered = original.to_toml_string().unwrap();
    assert_eq!(ClientConfig::from_toml_str(&rendered).unwrap(), original);
}

#[test]
fn errors_serialize_as_json() {
    let err = VotingError::not_connected("connect a wallet first");
    let json = serde_json::to_string(&err).unwrap();
    let back: VotingError = serde_json::from_str(&json).unwrap();
    assert_eq!(back, err);
}
