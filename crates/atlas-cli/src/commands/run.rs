use atlas_registry::PipelineConfig;
use atlas_resilience::CancellationToken;
use atlas_snapshot::FileSnapshotStore;

use crate::cli::{Cli, RunArgs};
use crate::error::CliError;
use crate::sources::load_registry;

pub fn run(cli: &Cli, args: &RunArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    config.validate()?;

    let registry = load_registry(args.sources.as_deref())?;
    let store = FileSnapshotStore::open(&cli.store)?;
    let token = CancellationToken::new();

    let (snapshot, report) = atlas_pipeline::run_pipeline(&registry, &config, &store, &token)?;

    tracing::info!(
        version = snapshot.version,
        leaves = report.leaf_count,
        rejected = report.rejected_sources.len(),
        failed = report.failed_units.len(),
        dropped = report.dropped_batches.len(),
        overlaps = report.overlap_errors.len(),
        "run complete"
    );

    let output = serde_json::json!({
        "snapshot": snapshot,
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output).map_err(anyhow::Error::from)?);
    Ok(())
}
