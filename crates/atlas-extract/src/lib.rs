//! Extractor pool: portal-specific download + parse logic that turns a
//! [`atlas_registry::SourceDescriptor`] into a stream of provider-neutral
//! [`feature::RawFeature`]s (spec §3, §5).

mod artifact;
mod error;
mod feature;
mod geojson;
mod extractor;
mod portal;
mod rate_limit;
mod shapefile_io;

pub use artifact::{build_client, download_artifact, Artifact};
pub use error::ExtractError;
pub use extractor::{extractor_for, Extractor};
pub use feature::{PropertyBag, PropertyValue, ProvenanceStub, RawFeature};
pub use rate_limit::{host_of, HostRateLimiter};
