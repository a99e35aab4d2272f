use atlas_snapshot::{attach_cid, diff, FileSnapshotStore, SnapshotStore};

use crate::cli::{Cli, DiffArgs, ListArgs, ProofArgs, PublishArgs, ShowArgs};
use crate::error::CliError;

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?);
    Ok(())
}

pub fn list(cli: &Cli, args: &ListArgs) -> Result<(), CliError> {
    let store = FileSnapshotStore::open(&cli.store)?;
    let snapshots = store.list(args.limit, args.offset)?;
    print_json(&snapshots)
}

pub fn show(cli: &Cli, args: &ShowArgs) -> Result<(), CliError> {
    let store = FileSnapshotStore::open(&cli.store)?;
    let snapshot = match args.version {
        Some(version) => store.get_by_version(version)?,
        None => store.get_latest()?,
    };
    print_json(&snapshot)
}

pub fn diff_cmd(cli: &Cli, args: &DiffArgs) -> Result<(), CliError> {
    let store = FileSnapshotStore::open(&cli.store)?;
    let from = store.get_by_version(args.from)?;
    let to = store.get_by_version(args.to)?;
    print_json(&diff(&from, &to))
}

pub fn publish(cli: &Cli, args: &PublishArgs) -> Result<(), CliError> {
    let store = FileSnapshotStore::open(&cli.store)?;
    let published = attach_cid(&store, &args.id)?;
    print_json(&published)
}

pub fn proof(cli: &Cli, args: &ProofArgs) -> Result<(), CliError> {
    let store = FileSnapshotStore::open(&cli.store)?;
    let key = format!("{}|{}|{}", args.layer, args.state_fips, args.geoid);
    let proof = store.get_proof(&args.snapshot_id, &key)?;
    print_json(&proof)
}
