//! Source registry: the typed, read-only-after-init table of known sources
//! (spec §4's "Source registry" row), the canonical GEOID tables backing
//! the completeness validator, the state FIPS/bbox table, and the typed
//! pipeline configuration record (spec §6).

mod canonical;
mod config;
mod layer;
mod registry;
mod source;
pub mod states;

pub use canonical::CanonicalGeoidTable;
pub use config::{
    BreakerSettings, ConfigError, CrossSettings, HaltSettings, MerkleSettings, PipelineConfig,
    RetrySettings, ValidationSettings,
};
pub use layer::Layer;
pub use registry::{SourceRegistry, SourceRegistryBuilder};
pub use source::{AuthorityTier, ExpectedCount, PortalKind, SourceDescriptor};
