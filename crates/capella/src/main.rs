mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::id::IdCommand;
use commands::wait::TargetArg;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "capella")]
#[command(version, about = "Watch Capella resources until they settle", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current state of a resource
    Status {
        /// Resource kind (cluster, app-service, backup)
        kind: String,
        /// Composite ID, e.g. id=...,project_id=...,organization_id=...
        id: String,
    },
    /// Poll a resource until it is ready or gone
    Wait {
        /// Resource kind (cluster, app-service, backup)
        kind: String,
        /// Composite ID, e.g. id=...,project_id=...,organization_id=...
        id: String,
        /// State to wait for
        #[arg(long = "for", value_enum, default_value_t = TargetArg::Ready)]
        target: TargetArg,
        /// Give up after this many seconds (default from config)
        #[arg(long)]
        timeout: Option<u64>,
        /// Seconds between polls (default from config)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Encode or decode composite IDs
    Id {
        #[command(subcommand)]
        command: IdCommand,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Ctrl-C aborts in-flight requests and waits
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted, cancelling...".yellow());
            trigger.cancel();
        }
    });

    match cli.command {
        Commands::Status { kind, id } => commands::status::handle(&cancel, &kind, &id).await,
        Commands::Wait {
            kind,
            id,
            target,
            timeout,
            interval,
        } => commands::wait::handle(&cancel, &kind, &id, target, timeout, interval).await,
        Commands::Id { command } => commands::id::handle(command),
    }
}
