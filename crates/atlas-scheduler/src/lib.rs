//! Scheduler: parallel fan-out over work units, concurrency control,
//! cancellation, and progress aggregation (spec §2, §5). Cooperative
//! thread-per-worker parallelism, not an async runtime — workers block on
//! the extractor pool's synchronous HTTP/disk I/O.

mod events;
mod pool;
mod work_unit;

pub use events::ProgressEvent;
pub use pool::{UnitFailure, UnitOutcome, WorkerPool};
pub use work_unit::{work_units_for, WorkUnit};
