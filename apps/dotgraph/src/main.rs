//! # dotgraph
//!
//! Build, explore and render ranked Graphviz graphs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/dotgraph (THE BINARY)               │
//! │                                                          │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   │
//! │  │    CLI      │   │ TOML config  │   │   Renderer   │   │
//! │  │   (clap)    │   │   (toml)     │   │ (dot process)│   │
//! │  └──────┬──────┘   └──────┬───────┘   └──────┬───────┘   │
//! │         └─────────────────┼──────────────────┘           │
//! │                           ▼                              │
//! │                   ┌───────────────┐                      │
//! │                   │ dotgraph-core │                      │
//! │                   │  (THE LOGIC)  │                      │
//! │                   └───────────────┘                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Print DOT for a description
//! dotgraph build layers.toml
//!
//! # Render a JSON document's object graph to out.png and open it
//! dotgraph explore data.json --all-keys -o out -T png --show
//! ```

use clap::Parser;
use dotgraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // DOTGRAPH_LOG_FORMAT=json enables machine-parseable output. Logs go to
    // stderr; stdout carries DOT.
    let log_format = std::env::var("DOTGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "dotgraph=debug"
    } else if cli.quiet {
        "dotgraph=warn"
    } else {
        "dotgraph=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
