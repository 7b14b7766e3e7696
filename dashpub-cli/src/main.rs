//! Dashpub: publish local dashboard folders to hosted visualization stacks.
//!
//! # Usage
//!
//! ```text
//! dashpub publish [--all] [--config <path>]
//! dashpub stacks [--all] [--config <path>] [--json]
//! dashpub check [--config <path>]
//! dashpub uid --title <title> [--uid <uid>] [--suffix <suffix>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, publish::PublishArgs, stacks::StacksArgs, uid::UidArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dashpub",
    version,
    about = "Publish dashboard definitions to hosted visualization stacks",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload and delete dashboards on the selected stacks.
    Publish(PublishArgs),

    /// List stacks and show which ones a publish run would target.
    Stacks(StacksArgs),

    /// Validate the publisher configuration and list its bindings.
    Check(CheckArgs),

    /// Print the uid a dashboard would be published under.
    Uid(UidArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Publish(args) => args.run(),
        Commands::Stacks(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Uid(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
