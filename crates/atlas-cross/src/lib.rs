//! Cross-validator: matches boundary sets from two sources for the same
//! (layer, state) by GEOID then centroid proximity, scores agreement by
//! IoU, and rolls the result into an aggregate quality number (spec §4.7).

mod centroid;
mod geoid;
mod iou;
mod report;

pub use centroid::{haversine_m, match_by_centroid};
pub use geoid::normalize_geoid;
pub use iou::{intersection_over_union, severity_for, Severity};
pub use report::{cross_validate, CrossCandidate, CrossReport, MatchedPair};
