use atlas_merkle::MerkleError;
use atlas_registry::ConfigError;
use atlas_resilience::Cancelled;
use atlas_snapshot::SnapshotError;
use atlas_validate::HaltError;

/// Composes every typed error a full pipeline run can surface (spec §7:
/// "errors propagate as typed values through every layer"). A `Halt` here
/// means exactly what the validation gate's name promises: nothing from this
/// run reaches the commitment engine.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("validation halted the run: {0}")]
    Halt(#[from] HaltError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("pipeline cancelled")]
    Cancelled,
}

impl From<Cancelled> for PipelineError {
    fn from(_: Cancelled) -> Self {
        PipelineError::Cancelled
    }
}
