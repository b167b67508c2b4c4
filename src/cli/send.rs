//! Send command handler
//!
//! Ranks the contacts in a file and alerts the best one.

use crate::cli::AlertInput;
use crate::config::Config;
use crate::dispatch::{AncillaryRecipient, SubjectInfo};
use crate::engine::ConfiguredEngine;
use crate::error::{Error, Result};
use crate::format;
use clap::Args;

/// Send command arguments
#[derive(Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub input: AlertInput,

    /// Name of the person in distress
    #[arg(long, short = 'n')]
    pub name: String,

    /// Their phone number, included in the alert
    #[arg(long)]
    pub phone: Option<String>,

    /// Extra email recipient (repeatable), e.g. an insurance provider
    #[arg(long = "notify", value_name = "EMAIL")]
    pub notify: Vec<String>,

    /// Log messages instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the send command
pub async fn run(args: SendArgs) -> Result<()> {
    let formatter = format::formatter(&args.input.format)?;

    let config = Config::load()?;
    let contacts = args.input.load_contacts()?;
    let user = args.input.coordinate()?;

    let engine = if args.dry_run {
        ConfiguredEngine::dry_run(&config)?
    } else {
        ConfiguredEngine::from_config(&config)?
    };

    let subject = SubjectInfo {
        name: args.name,
        phone: args.phone,
    };
    let ancillary = args
        .notify
        .into_iter()
        .map(|email| AncillaryRecipient {
            label: None,
            email: Some(email),
        })
        .collect();

    match engine.select_and_notify(&contacts, user, subject, ancillary).await {
        Ok(outcome) => {
            print!("{}", formatter.format_outcome(&outcome)?);
            Ok(())
        }
        Err(Error::TotalDeliveryFailure(report)) => {
            print!("{}", formatter.format_report(&report)?);
            Err(Error::TotalDeliveryFailure(report))
        }
        Err(e) => Err(e),
    }
}
