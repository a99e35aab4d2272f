//! Validation gate: semantic scoring and edge-case classification of
//! candidate layers pre-download, plus geographic/topology/coordinate/
//! completeness checks on downloaded geometry (spec §4.3-§4.6).

mod completeness;
mod coordinate;
mod edge_case;
mod gate;
mod geographic;
mod semantic;
mod topology;

pub use completeness::{check_completeness, detect_dual_system_overlaps, overlap_is_sanctioned, CompletenessReport, OverlapError};
pub use coordinate::{check_coordinates, CoordinateIssue, CoordinateReport};
pub use edge_case::{classify, current_year, EdgeCaseAction, EdgeCaseClass, EdgeCaseInput, EdgeCaseVerdict};
pub use gate::{GateInput, GateResult, HaltError, HaltStage, ValidationGate};
pub use geographic::{check_within_state, GeographicVerdict};
pub use semantic::{score_layer, SemanticScore, SemanticVerdict};
pub use topology::{check_topology, TopologyIssue, TopologyReport};
