//! Status command handler
//!
//! Shows the configured providers and whether the server is up.

use crate::config::Config;
use crate::error::Result;
use crate::server::routes::StatusResponse;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (tries to connect)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;

    println!("sos-relay v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let places = if config.geocoding.backend == "static" {
        format!(" ({} known places)", config.geocoding.places.len())
    } else {
        String::new()
    };
    println!("Geocoding: {}{}", config.geocoding.backend, places);
    let messaging = &config.messaging;
    println!(
        "Messaging: {}",
        provider_line(&messaging.provider, messaging.account_sid.is_empty())
    );
    println!(
        "Email:     {}",
        provider_line(&config.email.provider, config.email.api_key.is_empty())
    );
    println!(
        "Ranking:   priority x{} / fallback {} km / same place -{}",
        config.ranking.priority_weight,
        config.ranking.fallback_distance_km,
        config.ranking.exact_place_bonus
    );
    println!();

    if args.server {
        check_server_status(&config).await;
    }

    Ok(())
}

fn provider_line(provider: &str, missing_credentials: bool) -> String {
    match provider {
        "console" => "console (messages are logged, not sent)".to_string(),
        _ if missing_credentials => format!("{} (credentials missing)", provider),
        _ => provider.to_string(),
    }
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) if response.status().is_success() => {
            println!("Server: RUNNING on {}", config.server_addr());
            if let Ok(status) = response.json::<StatusResponse>().await {
                println!("  Version: {}", status.version);
                println!("  Cached places: {}", status.cached_places);
                println!("  Uptime: {}s", status.uptime_secs);
            }
        }
        Ok(response) => {
            println!("Server: ERROR (status {})", response.status());
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
}
