//! Versioned snapshot store: seals commitment-engine output into an
//! immutable, monotonically-versioned catalog release, diffs releases
//! against each other, and attaches a content-addressed identifier once a
//! snapshot is published (spec §4.10-§4.12).

mod cid;
mod diff;
mod snapshot;
mod store;

pub use cid::{attach_cid, derive_cid};
pub use diff::{diff, Diff, LayerDelta};
pub use snapshot::{BuildResult, Snapshot, SnapshotState};
pub use store::{FileSnapshotStore, SnapshotError, SnapshotStore};
