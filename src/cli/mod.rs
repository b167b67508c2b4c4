//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod rank;
pub mod send;
pub mod serve;
pub mod status;

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::ranking::EmergencyContact;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Emergency contact ranking and SOS alert dispatch
#[derive(Parser)]
#[command(name = "sos-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank contacts and send an SOS alert
    Send(send::SendArgs),

    /// Rank contacts without sending anything
    Rank(rank::RankArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show configured providers and server status
    Status(status::StatusArgs),
}

/// Contacts file and user location, shared by `send` and `rank`
#[derive(Args)]
pub struct AlertInput {
    /// JSON file with an array of emergency contacts
    #[arg(long, short = 'c')]
    pub contacts: PathBuf,

    /// User latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// User longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Output format (json, text)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

impl AlertInput {
    pub fn coordinate(&self) -> Result<Option<Coordinate>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinate::try_new(lat, lng).map(Some),
            _ => Ok(None),
        }
    }

    pub fn load_contacts(&self) -> Result<Vec<EmergencyContact>> {
        load_contacts(&self.contacts)
    }
}

/// Read a JSON array of contacts
pub fn load_contacts(path: &Path) -> Result<Vec<EmergencyContact>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read contacts file {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Log to stderr so stdout stays clean for command output
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Send(args) => send::run(args).await,
        Commands::Rank(args) => rank::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "sos-relay", "send", "-c", "contacts.json", "--lat", "19.07", "--lng", "-72.8",
            "--name", "Ravi", "--notify", "claims@example.com", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.input.coordinate().unwrap(), Some(Coordinate::new(19.07, -72.8)));
                assert_eq!(args.notify, vec!["claims@example.com"]);
                assert!(args.dry_run);
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_lat_requires_lng() {
        assert!(Cli::try_parse_from(["sos-relay", "rank", "-c", "c.json", "--lat", "19.0"]).is_err());
    }

    #[test]
    fn test_load_contacts() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Asha", "phone": "98765", "city": "Mumbai"}}, {{"name": "Vikram", "priority": 2}}]"#
        )
        .unwrap();

        let contacts = load_contacts(file.path()).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].place.as_deref(), Some("Mumbai"));
        assert_eq!(contacts[0].priority, 1);
        assert_eq!(contacts[1].priority, 2);
    }

    #[test]
    fn test_load_contacts_missing_file() {
        let err = load_contacts(Path::new("/nonexistent/contacts.json")).unwrap_err();
        assert!(err.to_string().contains("contacts file"));
    }
}
