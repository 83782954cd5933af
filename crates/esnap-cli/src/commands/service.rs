//! Commands that talk to the backup service

use clap::Args;
use esnap_engine::commands::remote::{self, TakeSnapshotOutcome};
use esnap_engine::service::HttpBackupService;
use esnap_store::Location;
use std::path::{Path, PathBuf};

use crate::config::load_service_config;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct TakeSnapshotArgs {
    /// Snapshot repository registered with the service
    #[arg(long)]
    pub repo: String,

    #[arg(long)]
    pub name: String,

    /// Comma-separated index names
    #[arg(long, value_delimiter = ',', required = true)]
    pub indices: Vec<String>,
}

#[derive(Debug, Args)]
pub struct VerifyIndicesArgs {
    #[arg(long)]
    pub folder: PathBuf,
}

fn connect(config_path: Option<&Path>) -> Result<HttpBackupService, Box<dyn std::error::Error>> {
    let config = load_service_config(config_path)?;
    Ok(HttpBackupService::new(config)?)
}

pub fn take_snapshot(args: TakeSnapshotArgs, config_path: Option<&Path>) -> CmdResult {
    let service = connect(config_path)?;

    match remote::take_snapshot(&service, &args.repo, &args.name, &args.indices)? {
        TakeSnapshotOutcome::AlreadyExists => {
            println!("A snapshot with the same name already exists");
            println!("SnapShotName : {}", args.name);
        }
        TakeSnapshotOutcome::Created(body) => {
            println!("SnapShotName : {}", args.name);
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}

pub fn verify_indices(args: VerifyIndicesArgs, config_path: Option<&Path>) -> CmdResult {
    let service = connect(config_path)?;
    let report = remote::uncovered_indices(&service, &Location::new(args.folder))?;

    println!(
        "There are {} missing indices that have not been backed up!",
        report.missing.len()
    );
    println!("{} of these indices are system indices", report.system_indices);
    println!(
        "There are {} indices that have a single point of failure",
        report.without_replicas.len()
    );
    for index in &report.without_replicas {
        println!(
            "Index not backed up and no replica : {} : {}",
            index.uuid.as_deref().unwrap_or("-"),
            index.index
        );
    }
    Ok(())
}
