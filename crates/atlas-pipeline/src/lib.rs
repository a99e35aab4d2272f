//! End-to-end orchestration (spec §2): source registry -> scheduler ->
//! extractor pool -> validation gate -> normalizer -> cross-validator ->
//! commitment engine -> snapshot store. Every stage is a separate crate;
//! this one only wires them together and owns the run-level error and
//! reporting types.

mod error;
mod report;
mod run;

pub use error::PipelineError;
pub use report::{CrossValidationRecord, DroppedBatch, PipelineReport, SourceFailureRecord};
pub use run::run_pipeline;
