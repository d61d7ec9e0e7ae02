//! # bagmind
//!
//! The main binary for the bagmind reasoning memory.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/bagmind (THE BINARY)             │
//! │                                                      │
//! │  ┌───────────┐   ┌─────────────┐   ┌──────────────┐  │
//! │  │   CLI     │   │ SexprParser │   │ Syllogistic  │  │
//! │  │  (clap)   │   │  (Parser)   │   │  (Deriver)   │  │
//! │  └─────┬─────┘   └──────┬──────┘   └──────┬───────┘  │
//! │        └────────────────┼─────────────────┘          │
//! │                         ▼                            │
//! │                 ┌───────────────┐                    │
//! │                 │ bagmind-core  │                    │
//! │                 │ (THE MEMORY)  │                    │
//! │                 └───────────────┘                    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! bagmind check -i tasks.txt
//! bagmind run -i tasks.txt -n 500 --seed 7
//! bagmind config --micro > micro.toml
//! bagmind --config micro.toml run -i tasks.txt
//! ```

use bagmind::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // BAGMIND_LOG_FORMAT=json enables machine-parseable logs. Logs go to
    // stderr so stdout stays clean for --json-mode.
    let log_format = std::env::var("BAGMIND_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_env("BAGMIND_LOG")
        .unwrap_or_else(|_| "bagmind=info,bagmind_core=info".into());

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

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    eprintln!(
        r#"
  bagmind v{}
  bounded attention, seeded forgetting
"#,
        env!("CARGO_PKG_VERSION")
    );
}
