/// Classifies every command failure into the wrapper's exit code (spec §6:
/// "0 success, 2 validation halt, 3 configuration error, 4 unexpected error").
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] atlas_registry::ConfigError),
    #[error(transparent)]
    Pipeline(#[from] atlas_pipeline::PipelineError),
    #[error(transparent)]
    Snapshot(#[from] atlas_snapshot::SnapshotError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) => 3,
            CliError::Pipeline(atlas_pipeline::PipelineError::Halt(_)) => 2,
            CliError::Pipeline(atlas_pipeline::PipelineError::Config(_)) => 3,
            _ => 4,
        }
    }
}
