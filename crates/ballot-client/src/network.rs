//! Network check, switch and registration
//!
//! ```text
//! chain_id == required? ── yes ──▶ done
//!        │ no
//!        ▼
//! switch_chain ── UnrecognizedChain ──▶ add_chain ─▶ switch_chain
//!        │
//!        ▼
//! chain_id == required? ── no ──▶ NetworkMismatch
//! ```

use ballot_core::effects::{WalletEffects, WalletError};
use ballot_core::{ChainId, NetworkConfig, Result, VotingError};
use tracing::{debug, info};

fn mismatch(step: &str, network: &NetworkConfig, err: WalletError) -> VotingError {
    VotingError::network_mismatch(format!(
        "{step} {} ({}) failed: {err}",
        network.name,
        network.chain_id.to_hex_quantity()
    ))
}

/// Make the wallet's active chain `network.chain_id`
///
/// Rejected switches or registrations are `NetworkMismatch`; a failed chain
/// query is a `Wallet` error.
pub async fn ensure_network(
    wallet: &dyn WalletEffects,
    network: &NetworkConfig,
) -> Result<ChainId> {
    let current = wallet.chain_id().await?;
    if current == network.chain_id {
        return Ok(current);
    }

    debug!(from = %current, to = %network.chain_id, "switching wallet network");
    match wallet.switch_chain(network.chain_id).await {
        Ok(()) => {}
        Err(WalletError::UnrecognizedChain { .. }) => {
            info!(
                chain = %network.chain_id,
                name = %network.name,
                rpc = %network.rpc_url,
                "registering network with wallet"
            );
            wallet
                .add_chain(network)
                .await
                .map_err(|e| mismatch("adding", network, e))?;
            wallet
                .switch_chain(network.chain_id)
                .await
                .map_err(|e| mismatch("switching to", network, e))?;
        }
        Err(e) => return Err(mismatch("switching to", network, e)),
    }

    let confirmed = wallet.chain_id().await?;
    if confirmed != network.chain_id {
        return Err(VotingError::network_mismatch(format!(
            "wallet is on chain {confirmed}, expected {}",
            network.chain_id
        )));
    }
    Ok(confirmed)
}
