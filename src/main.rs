//! sos-relay CLI entry point
//!
//! Emergency contact ranking and SOS alert dispatch - CLI + HTTP API

use sos_relay::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
