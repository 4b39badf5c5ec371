//! Tracing subscriber setup

use ballot_core::{Result, VotingError};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber writing to stderr
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies (for example
/// `"info"` or `"ballot_ledger=debug,info"`). Fails if a global subscriber is
/// already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| {
            VotingError::configuration(format!("invalid log filter {default_filter:?}: {e}"))
        })?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| VotingError::internal(format!("tracing already initialised: {e}")))
}
