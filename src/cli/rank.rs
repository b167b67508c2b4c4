//! Rank command handler
//!
//! Shows how the contacts in a file would be ranked, without sending.

use crate::cli::AlertInput;
use crate::config::Config;
use crate::engine::ConfiguredEngine;
use crate::error::Result;
use crate::format;
use clap::Args;

/// Rank command arguments
#[derive(Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub input: AlertInput,
}

/// Run the rank command
pub async fn run(args: RankArgs) -> Result<()> {
    let formatter = format::formatter(&args.input.format)?;

    let config = Config::load()?;
    let contacts = args.input.load_contacts()?;
    let user = args.input.coordinate()?;

    let engine = ConfiguredEngine::dry_run(&config)?;
    let ranking = engine.rank(&contacts, user).await?;

    print!("{}", formatter.format_ranking(&ranking)?);
    Ok(())
}
