//! # Resilo - Maturity Assessment Server
//!
//! The main binary for the Resilo assessment service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for sessions, ratings, and archives
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      apps/resilo (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │  │   CLI       │    │   HTTP API  │    │  TOML Config     │   │
//! │  │  (clap)     │    │   (axum)    │    │  (scale/policy)  │   │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘   │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │  resilo-core  │                           │
//! │                    │ (THE LOGIC)   │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! resilo server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! resilo new-session --name "Q3 review" --assessor "Jordan"
//! resilo rate -s 1 -t 42 -k 3 -k shift+5
//! resilo progress -s 1
//! ```

use clap::Parser;
use resilo::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — RESILO_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("RESILO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "resilo=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Resilo startup banner.
fn print_banner() {
    println!(
        r#"
  ██████╗ ███████╗███████╗██╗██╗      ██████╗
  ██╔══██╗██╔════╝██╔════╝██║██║     ██╔═══██╗
  ██████╔╝█████╗  ███████╗██║██║     ██║   ██║
  ██╔══██╗██╔══╝  ╚════██║██║██║     ██║   ██║
  ██║  ██║███████╗███████║██║███████╗╚██████╔╝
  ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚══════╝ ╚═════╝

  Maturity Assessment Server v{}

  Current • Desired • Progress
"#,
        env!("CARGO_PKG_VERSION")
    );
}
