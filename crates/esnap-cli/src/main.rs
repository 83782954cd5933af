//! esnap CLI
//!
//! Command-line interface for managing snapshot repository folders

use clap::{Parser, Subcommand, ValueEnum};
use esnap_core::logging_facility::{init, Profile};
use std::path::PathBuf;

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "esnap")]
#[command(about = "esnap - copy, sync and verify snapshot repositories", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Service configuration file (defaults to ./esnap.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List snapshots in a folder with their recorded sizes
    List(commands::location::ListArgs),
    /// Copy one snapshot between folders
    Copy(commands::location::CopyArgs),
    /// Copy every snapshot missing at the destination
    Sync(commands::location::SyncArgs),
    /// Show snapshots missing at the destination
    ShowMissing(commands::location::ShowMissingArgs),
    /// Report the space recorded for one snapshot
    DiskUsage(commands::location::SnapshotArgs),
    /// Re-hash every file recorded for one snapshot
    Verify(commands::location::SnapshotArgs),
    /// List the snapshots that include an index
    FindIndex(commands::location::FindIndexArgs),
    /// List the indices one snapshot covers
    ShowIndices(commands::location::SnapshotArgs),
    /// Ask the backup service to take a snapshot
    TakeSnapshot(commands::service::TakeSnapshotArgs),
    /// Report live indices that no snapshot in a folder covers
    VerifyIndices(commands::service::VerifyIndicesArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let config_path = cli.config;
    let result = match cli.command {
        Commands::List(args) => commands::location::list(args),
        Commands::Copy(args) => commands::location::copy(args),
        Commands::Sync(args) => commands::location::sync(args),
        Commands::ShowMissing(args) => commands::location::show_missing(args),
        Commands::DiskUsage(args) => commands::location::disk_usage(args),
        Commands::Verify(args) => commands::location::verify(args),
        Commands::FindIndex(args) => commands::location::find_index(args),
        Commands::ShowIndices(args) => commands::location::show_indices(args),
        Commands::TakeSnapshot(args) => {
            commands::service::take_snapshot(args, config_path.as_deref())
        }
        Commands::VerifyIndices(args) => {
            commands::service::verify_indices(args, config_path.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
