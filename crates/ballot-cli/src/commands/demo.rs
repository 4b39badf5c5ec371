//! `ballot demo`

use anyhow::{bail, Context, Result};
use ballot_client::VotingClientService;
use ballot_core::effects::LedgerEffects;
use ballot_core::{ClientConfig, ProposalId};
use ballot_effects::{LocalSigner, LocalWallet, RealTimeHandler, TallyKeyPair};
use ballot_ledger::LocalLedgerNode;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Options for `ballot demo`
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Proposal text
    #[arg(long, default_value = "Adopt the community charter?")]
    pub proposal: String,

    /// Number of voters voting yes
    #[arg(long, default_value_t = 3)]
    pub yes: u32,

    /// Number of voters voting no
    #[arg(long, default_value_t = 2)]
    pub no: u32,
}

/// Upper bound on voters in one demo round
const MAX_VOTERS: u32 = 1_000;

fn voter_count(args: &DemoArgs) -> Result<u32> {
    match args.yes.checked_add(args.no) {
        Some(0) => bail!("at least one voter is required"),
        Some(n) if n <= MAX_VOTERS => Ok(n),
        _ => bail!("at most {MAX_VOTERS} voters are supported"),
    }
}

/// Deploy, vote, reveal, print
pub async fn run(mut config: ClientConfig, args: DemoArgs) -> Result<()> {
    voter_count(&args)?;

    let keys = TallyKeyPair::generate();
    let admin_signer = LocalSigner::generate();
    let admin_wallet = LocalWallet::new(admin_signer, config.network.chain_id);

    let node = Arc::new(LocalLedgerNode::deploy(
        &config.network,
        admin_wallet.address(),
        Arc::new(keys.tally_handler()),
        Arc::new(keys.oracle()),
        Arc::new(RealTimeHandler::new()),
    )?);
    config.ledger.address = node.address();
    let encryptor = Arc::new(keys.encryptor());

    let admin = VotingClientService::new(node.clone(), config.clone(), encryptor.clone());
    admin
        .connect(&admin_wallet)
        .await
        .context("connecting admin wallet")?;
    admin
        .on_proposal_ended(|e| {
            info!(
                proposal = %e.proposal_id,
                yes = e.yes_votes,
                no = e.no_votes,
                "proposal ended"
            );
        })
        .await?;

    admin.create_proposal(&args.proposal).await?;
    let proposal_id = ProposalId(node.total_proposals().await? - 1);

    let choices = std::iter::repeat(true)
        .take(args.yes as usize)
        .chain(std::iter::repeat(false).take(args.no as usize));
    for (n, support) in choices.enumerate() {
        // Voters start elsewhere so connect exercises network registration.
        let wallet = LocalWallet::new(LocalSigner::generate(), ballot_core::ChainId(1));
        let voter = VotingClientService::new(node.clone(), config.clone(), encryptor.clone());
        let account = voter
            .connect(&wallet)
            .await
            .with_context(|| format!("connecting voter {n}"))?;
        admin.authorize_voter(account).await?;
        voter.vote(proposal_id, support).await?;
        info!(voter = %account, "ballot cast");
    }

    admin.end_voting(proposal_id).await?;
    // Let the ProposalEnded listener log before the runtime shuts down.
    tokio::time::sleep(Duration::from_millis(10)).await;
    admin.remove_all_listeners();

    let info = admin.get_contract_info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
