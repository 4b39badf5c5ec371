//! End-to-end runs of the `ballot` binary

use std::io::Write;
use std::process::Command;

fn ballot() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ballot"));
    cmd.env_remove("RUST_LOG")
        .env_remove("BALLOT_CHAIN_ID")
        .env_remove("BALLOT_RPC_URL")
        .env_remove("BALLOT_EXPLORER_URL")
        .env_remove("BALLOT_LEDGER_ADDRESS");
    cmd
}

#[test]
fn config_merges_file_and_environment() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[network]\nchain_id = 31337\nname = \"Local\"").unwrap();

    let output = ballot()
        .arg("--config")
        .arg(file.path())
        .arg("config")
        .env("BALLOT_RPC_URL", "http://127.0.0.1:8545")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("chain_id = 31337"));
    assert!(stdout.contains("http://127.0.0.1:8545"));
    assert!(stdout.contains("https://explorer.zama.ai"));
}

#[test]
fn invalid_config_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[network]\nrpc_url = \"devnet\"").unwrap();
    let output = ballot()
        .arg("--config")
        .arg(file.path())
        .arg("config")
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn explicit_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = ballot()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("config")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.toml"));
}

#[test]
fn demo_prints_revealed_tallies() {
    let dir = tempfile::tempdir().unwrap();
    let output = ballot()
        .current_dir(dir.path())
        .args(["demo", "--yes", "2", "--no", "1", "--proposal", "Plant more trees?"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["totalProposals"], 1);
    assert_eq!(info["isAdmin"], true);
    let proposal = &info["proposals"][0];
    assert_eq!(proposal["description"], "Plant more trees?");
    assert_eq!(proposal["revealed"], true);
    assert_eq!(proposal["yesVotes"], 2);
    assert_eq!(proposal["noVotes"], 1);
}

#[test]
fn demo_rejects_overflowing_voter_counts() {
    let dir = tempfile::tempdir().unwrap();
    let output = ballot()
        .current_dir(dir.path())
        .args(["demo", "--yes", "4294967295", "--no", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("voters are supported"));
}
