// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batsignal - a Batman persona chat service.
//!
//! This is the binary entry point: it loads configuration, installs the
//! tracing subscriber, and dispatches to a subcommand.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod logs;
mod serve;
mod train;

use std::path::PathBuf;

use batsignal_config::BatsignalConfig;
use batsignal_core::BatsignalError;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Batsignal - a Batman persona chat service.
#[derive(Parser, Debug)]
#[command(name = "batsignal", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP chat server.
    Serve,
    /// Export recorded conversations as a fine-tuning dataset and run the trainer.
    Train,
    /// Print one day's conversation records as JSON lines.
    Logs {
        /// Day to print (YYYY-MM-DD, UTC). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the resolved configuration (API key redacted).
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => batsignal_config::load_and_validate_path(path),
        None => batsignal_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            batsignal_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: BatsignalConfig) -> Result<(), BatsignalError> {
    match command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Train) => {
            let summary = train::run_train(&config).await?;
            println!(
                "{} wrote {} examples to {}",
                "train:".green().bold(),
                summary.examples,
                summary.dataset_path.display()
            );
            if summary.trainer_ran {
                println!(
                    "{} model saved to {}",
                    "train:".green().bold(),
                    config.training.output_dir
                );
            }
            Ok(())
        }
        Some(Commands::Logs { date }) => {
            let stdout = std::io::stdout();
            logs::run_logs(&config, date.as_deref(), &mut stdout.lock())
        }
        Some(Commands::Config) => {
            let rendered = config
                .to_redacted_toml()
                .map_err(|e| BatsignalError::Internal(format!("failed to render config: {e}")))?;
            print!("{rendered}");
            Ok(())
        }
        None => {
            println!("batsignal: use --help for available commands");
            Ok(())
        }
    }
}

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise batsignal crates log at `log_level`
/// and everything else at `warn`. Output goes to stderr so `logs` and
/// `config` keep stdout clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("batsignal={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
