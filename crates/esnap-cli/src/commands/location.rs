//! Commands that work on snapshot folders only

use clap::Args;
use esnap_core::render::{
    format_gib, render_missing_summary, render_snapshot_table, SnapshotRow,
};
use esnap_engine::commands::copy::{copy_snapshot, copy_snapshot_by_name, CopyReport};
use esnap_engine::commands::query;
use esnap_engine::commands::sync::sync as sync_locations;
use esnap_store::Location;
use std::path::PathBuf;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub folder: PathBuf,
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    #[arg(long)]
    pub src: PathBuf,

    #[arg(long)]
    pub dst: PathBuf,

    #[arg(long, conflicts_with = "name", required_unless_present = "name")]
    pub uuid: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// Re-hash files already at the destination against their manifest
    #[arg(long)]
    pub verify: bool,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[arg(long)]
    pub src: PathBuf,

    #[arg(long)]
    pub dst: PathBuf,

    /// Print both listings and the missing set before copying
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ShowMissingArgs {
    #[arg(long)]
    pub src: PathBuf,

    #[arg(long)]
    pub dst: PathBuf,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[arg(long)]
    pub folder: PathBuf,

    #[arg(long)]
    pub uuid: String,
}

#[derive(Debug, Args)]
pub struct FindIndexArgs {
    #[arg(long)]
    pub folder: PathBuf,

    #[arg(long)]
    pub index: String,
}

pub fn list(args: ListArgs) -> CmdResult {
    let listing = query::list_snapshots(&Location::new(args.folder))?;
    print!("{}", render_snapshot_table(&listing.rows, true));
    Ok(())
}

pub fn copy(args: CopyArgs) -> CmdResult {
    let src = Location::new(args.src);
    let dst = Location::new(args.dst);

    let report = match (args.uuid, args.name) {
        (Some(uuid), _) => copy_snapshot(&src, &dst, &uuid, args.verify)?,
        (None, Some(name)) => copy_snapshot_by_name(&src, &dst, &name, args.verify)?,
        (None, None) => return Err("Must specify either --uuid or --name".into()),
    };
    print_copy_report(&report);
    Ok(())
}

pub fn sync(args: SyncArgs) -> CmdResult {
    let src = Location::new(args.src);
    let dst = Location::new(args.dst);

    if args.verbose {
        println!("Source Snapshots");
        print!("{}", render_snapshot_table(&query::list_snapshots(&src)?.rows, false));
        println!();
        println!("Destination Snapshots");
        print!("{}", render_snapshot_table(&query::list_snapshots(&dst)?.rows, false));
        println!();
        print!("{}", render_missing_summary(&missing_rows(&src, &dst)?));
    }

    let report = sync_locations(&src, &dst, false)?;
    for copied in &report.copied {
        print_copy_report(copied);
    }
    let totals = report.totals();
    println!(
        "Synced {} snapshots ({} files, {} GB copied)",
        report.copied.len(),
        totals.files_copied,
        format_gib(totals.bytes_copied)
    );
    Ok(())
}

pub fn show_missing(args: ShowMissingArgs) -> CmdResult {
    let src = Location::new(args.src);
    let dst = Location::new(args.dst);
    print!("{}", render_missing_summary(&missing_rows(&src, &dst)?));
    Ok(())
}

pub fn disk_usage(args: SnapshotArgs) -> CmdResult {
    let usage = query::disk_usage(&Location::new(args.folder), &args.uuid)?;
    println!(
        "Snapshot {} uses {} GB ({} bytes)",
        args.uuid, usage.gigabytes, usage.total_bytes
    );
    Ok(())
}

pub fn verify(args: SnapshotArgs) -> CmdResult {
    let report = query::verify_snapshot(&Location::new(args.folder), &args.uuid)?;
    println!(
        "Verified snapshot {}: {} files, {} bytes",
        args.uuid, report.files_verified, report.bytes_verified
    );
    Ok(())
}

pub fn find_index(args: FindIndexArgs) -> CmdResult {
    let records = query::find_index(&Location::new(args.folder), &args.index)?;
    let rows: Vec<SnapshotRow> = records.iter().map(SnapshotRow::from).collect();
    println!("Index {} is in {} snapshots", args.index, rows.len());
    print!("{}", render_snapshot_table(&rows, false));
    Ok(())
}

pub fn show_indices(args: SnapshotArgs) -> CmdResult {
    let indices = query::snapshot_indices(&Location::new(args.folder), &args.uuid)?;
    println!("Snapshot {} covers {} indices", args.uuid, indices.len());
    for name in indices {
        println!("{}", name);
    }
    Ok(())
}

fn missing_rows(src: &Location, dst: &Location) -> Result<Vec<SnapshotRow>, Box<dyn std::error::Error>> {
    Ok(query::show_missing(src, dst)?
        .iter()
        .map(SnapshotRow::from)
        .collect())
}

fn print_copy_report(report: &CopyReport) {
    let stats = &report.stats;
    match (report.already_present, report.generation) {
        (true, _) if stats.files_seen() == 0 => println!(
            "Snapshot already exists in destination : {:>22} {:>20}",
            report.uuid, report.name
        ),
        (true, _) => println!(
            "Verified snapshot  : {:>22} {:>20} ({} files verified)",
            report.uuid, report.name, stats.files_verified
        ),
        (false, generation) => println!(
            "Copied snapshot    : {:>22} {:>20} ({} files, {} bytes, generation {})",
            report.uuid,
            report.name,
            stats.files_copied,
            stats.bytes_copied,
            generation.map(|g| g.to_string()).unwrap_or_default()
        ),
    }
}
