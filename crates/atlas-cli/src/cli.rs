use std::path::PathBuf;

/// Catalog build and snapshot inspection CLI (argument schema only).
#[derive(clap::Parser, Debug)]
#[command(name = "atlas", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Snapshot store directory.
    #[arg(long, global = true, default_value = "./atlas-store", value_hint = clap::ValueHint::DirPath)]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run acquisition through commitment and seal a new snapshot.
    Run(RunArgs),

    /// Inspect, list, diff, and publish sealed snapshots.
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Pipeline configuration TOML; defaults are used if omitted.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Source registry TOML (an array of `[[source]]` tables); an empty
    /// registry is used if omitted.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub sources: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
pub enum SnapshotCommand {
    /// List sealed/published snapshots, newest first.
    List(ListArgs),

    /// Show one snapshot's metadata.
    Show(ShowArgs),

    /// Diff two snapshot versions.
    Diff(DiffArgs),

    /// Derive and attach a content-addressed identifier to a sealed snapshot.
    Publish(PublishArgs),

    /// Look up a boundary's Merkle inclusion proof template.
    Proof(ProofArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Version number; the latest snapshot is shown if omitted.
    pub version: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct DiffArgs {
    pub from: u64,
    pub to: u64,
}

#[derive(clap::Args, Debug)]
pub struct PublishArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ProofArgs {
    /// Sealed snapshot id.
    pub snapshot_id: String,

    /// Layer tag, e.g. `congressional_district` (see `Layer::as_str`).
    pub layer: String,

    /// Two-digit state FIPS code.
    pub state_fips: String,

    /// Boundary GEOID.
    pub geoid: String,
}
