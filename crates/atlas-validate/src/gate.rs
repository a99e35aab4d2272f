use std::collections::BTreeSet;

use atlas_registry::{CanonicalGeoidTable, HaltSettings, Layer};
use geo::MultiPolygon;

use crate::completeness::{check_completeness, CompletenessReport};
use crate::coordinate::check_coordinates;
use crate::geographic::{check_within_state, GeographicVerdict};
use crate::topology::check_topology;

/// Which halt gate fired (spec §4.6: "halt error including {stage, layer,
/// state_fips, details}").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltStage {
    Completeness,
    Topology,
    Coordinate,
}

#[derive(Debug, Clone)]
pub struct HaltError {
    pub stage: HaltStage,
    pub layer: Layer,
    pub state_fips: String,
    pub details: String,
}

impl std::fmt::Display for HaltError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "halt[{:?}] layer={} state={}: {}", self.stage, self.layer, self.state_fips, self.details)
    }
}
impl std::error::Error for HaltError {}

pub struct GateInput<'a> {
    pub layer: Layer,
    pub state_fips: &'a str,
    pub is_territory: bool,
    /// (geoid, geometry) pairs for every boundary observed for this layer/state.
    pub features: &'a [(String, MultiPolygon<f64>)],
}

#[derive(Debug, Clone)]
pub struct GateResult {
    pub completeness: CompletenessReport,
    pub topology_valid: bool,
    pub coordinates_valid: bool,
    pub quality_score: f64,
}

/// Runs the validation stages in spec order for a (layer, state) batch:
/// geographic -> topology -> coordinate -> completeness. Semantic scoring
/// and edge-case classification happen earlier, pre-download, against
/// candidate metadata rather than downloaded geometry, so they aren't part
/// of this per-batch gate.
pub struct ValidationGate {
    pub halt: HaltSettings,
    pub max_invalid_ratio: f64,
}

impl ValidationGate {
    pub fn new(halt: HaltSettings, max_invalid_ratio: f64) -> Self {
        Self { halt, max_invalid_ratio }
    }

    pub fn run(&self, table: &CanonicalGeoidTable, input: &GateInput) -> Result<GateResult, HaltError> {
        let mut wrong_state_count = 0usize;
        let mut topology_bad_count = 0usize;
        let mut coordinate_bad_count = 0usize;

        for (_, geometry) in input.features {
            if check_within_state(geometry, input.state_fips) == GeographicVerdict::LikelyWrongState {
                wrong_state_count += 1;
            }
            if !check_topology(geometry).is_valid() {
                topology_bad_count += 1;
            }
            if !check_coordinates(geometry, input.is_territory).is_valid() {
                coordinate_bad_count += 1;
            }
        }

        let total = input.features.len().max(1);
        let topology_valid = (topology_bad_count as f64 / total as f64) <= self.max_invalid_ratio;
        let coordinates_valid = (coordinate_bad_count as f64 / total as f64) <= self.max_invalid_ratio;

        if self.halt.on_topology && !topology_valid {
            return Err(HaltError {
                stage: HaltStage::Topology,
                layer: input.layer,
                state_fips: input.state_fips.to_string(),
                details: format!("{topology_bad_count}/{total} features failed topology checks"),
            });
        }
        if self.halt.on_coordinate && !coordinates_valid {
            return Err(HaltError {
                stage: HaltStage::Coordinate,
                layer: input.layer,
                state_fips: input.state_fips.to_string(),
                details: format!("{coordinate_bad_count}/{total} features failed coordinate checks"),
            });
        }

        let actual_geoids: BTreeSet<String> = input.features.iter().map(|(id, _)| id.clone()).collect();
        let completeness = check_completeness(table, input.layer, input.state_fips, &actual_geoids, self.max_invalid_ratio);

        if self.halt.on_completeness && !completeness.valid {
            return Err(HaltError {
                stage: HaltStage::Completeness,
                layer: input.layer,
                state_fips: input.state_fips.to_string(),
                details: format!("{} missing, {} extra", completeness.missing.len(), completeness.extra.len()),
            });
        }

        if wrong_state_count > 0 {
            tracing::warn!(wrong_state_count, layer = %input.layer, state = input.state_fips, "features with centroid outside declared state bbox");
        }

        let quality_score = 0.4 * completeness.percentage + 0.35 * if topology_valid { 100.0 } else { 0.0 } + 0.25 * if coordinates_valid { 100.0 } else { 0.0 };

        Ok(GateResult { completeness, topology_valid, coordinates_valid, quality_score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn wyoming_polygon() -> MultiPolygon<f64> {
        let poly = polygon![(x: -108.0, y: 42.0), (x: -107.0, y: 42.0), (x: -107.0, y: 43.0), (x: -108.0, y: 43.0)];
        MultiPolygon(vec![poly])
    }

    #[test]
    fn clean_single_district_state_scores_100() {
        let table = CanonicalGeoidTable::new();
        let features = vec![("5601".to_string(), wyoming_polygon())];
        let gate = ValidationGate::new(HaltSettings::default(), 0.0);
        let input = GateInput { layer: Layer::CongressionalDistrict, state_fips: "56", is_territory: false, features: &features };
        let result = gate.run(&table, &input).unwrap();
        assert_eq!(result.quality_score, 100.0);
    }

    #[test]
    fn missing_geoid_halts_on_completeness() {
        let table = CanonicalGeoidTable::new();
        let features: Vec<(String, MultiPolygon<f64>)> = vec![];
        let gate = ValidationGate::new(HaltSettings::default(), 0.0);
        let input = GateInput { layer: Layer::CongressionalDistrict, state_fips: "56", is_territory: false, features: &features };
        let err = gate.run(&table, &input).unwrap_err();
        assert_eq!(err.stage, HaltStage::Completeness);
    }

    #[test]
    fn halt_disabled_lets_incomplete_batch_through() {
        let table = CanonicalGeoidTable::new();
        let features: Vec<(String, MultiPolygon<f64>)> = vec![];
        let gate = ValidationGate::new(HaltSettings { on_completeness: false, ..HaltSettings::default() }, 0.0);
        let input = GateInput { layer: Layer::CongressionalDistrict, state_fips: "56", is_territory: false, features: &features };
        let result = gate.run(&table, &input).unwrap();
        assert!(!result.completeness.valid);
    }
}
