//! `packdoc`: turns an invoice or packing CSV into the documents a shipment needs.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, process, tracking};

/// Packing lists, MS-DOS import files and UPS tracking numbers from invoice CSVs
#[derive(Parser)]
#[command(name = "packdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more; repeat for debug (-vv) and trace (-vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to read instead of the per-user one
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the shipment archive for one CSV
    Process(process::ProcessArgs),

    /// Build one archive per CSV matched by a glob
    Batch(batch::BatchArgs),

    /// Print the tracking number found in a label or typed value
    Tracking(tracking::TrackingArgs),

    /// Show, create or edit the config file
    Config(config::ConfigArgs),
}

/// Stdout carries command output, so logs go to stderr.
fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Tracking(args) => tracking::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
