//! `ballot config`

use anyhow::Result;
use ballot_core::ClientConfig;

/// Print `config` as TOML
pub fn show(config: &ClientConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
