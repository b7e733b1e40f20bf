#![allow(dead_code)]

use std::sync::Arc;

use aircraft_sizing::core::state::IterationState;
use aircraft_sizing::mission::{
    EvaluationError, MissionEvaluator, MissionProfile, MissionResults, ReferenceMissionBuilder,
    SegmentConditions, SegmentKind, SegmentResult, VehicleBuilder, VehicleDescription,
};
use aircraft_sizing::propulsion::{SurrogateTables, TurbofanSurrogate};
use aircraft_sizing::solver::Collaborators;

pub const MAC: f64 = 7.0;
pub const NEUTRAL_WING_X: f64 = 21.5;
pub const CLIMB_DISTANCE: f64 = 60_000.0;
pub const STEP_CLIMB_DISTANCE: f64 = 20_000.0;
pub const DESCENT_DISTANCE: f64 = 60_000.0;
pub const CLIMB_FUEL: f64 = 1_500.0;
pub const DESCENT_FUEL: f64 = 300.0;
pub const CRUISE_FUEL_PER_M: f64 = 0.006;
pub const HOLD_FUEL: f64 = 2_000.0;

/// Operating-empty mass linear in takeoff mass; fixed planform.
pub struct LinearVehicle {
    pub fixed: f64,
    pub per_takeoff: f64,
    pub tables: Arc<SurrogateTables>,
}

impl LinearVehicle {
    pub fn new(fixed: f64, per_takeoff: f64) -> Self {
        Self {
            fixed,
            per_takeoff,
            tables: SurrogateTables::bundled().expect("bundled tables"),
        }
    }
}

impl VehicleBuilder for LinearVehicle {
    fn build_vehicle(&self, state: &IterationState) -> Result<VehicleDescription, EvaluationError> {
        let weights = &state.weights;
        Ok(VehicleDescription {
            name: "linear".to_string(),
            takeoff_mass: weights.takeoff,
            operating_empty_mass: self.fixed + self.per_takeoff * weights.takeoff,
            design_payload: weights.design_payload,
            fuel_mass: weights.fuel,
            reference_area: 400.0,
            span: 72.0,
            mean_aerodynamic_chord: MAC,
            aspect_ratio: 13.0,
            sweep_quarter_chord: 0.5,
            taper_ratio: 0.3,
            wing_origin: state.sizing.wing_origin,
            sea_level_static_thrust: 600_000.0,
            engine_count: 2,
            engine: TurbofanSurrogate::new(Arc::clone(&self.tables)),
        })
    }
}

/// Fixed distance and fuel per climb or descent, fuel proportional to cruise distance,
/// and a percent-MAC band that is centred on 24 % when the wing sits at `NEUTRAL_WING_X`.
pub struct TableEvaluator;

impl TableEvaluator {
    fn segment(tag: &str, kind: &SegmentKind) -> (f64, f64) {
        match kind {
            SegmentKind::Climb { .. } if tag.starts_with("step") => (STEP_CLIMB_DISTANCE, CLIMB_FUEL),
            SegmentKind::Climb { .. } => (CLIMB_DISTANCE, CLIMB_FUEL),
            SegmentKind::Descent { .. } => (DESCENT_DISTANCE, DESCENT_FUEL),
            SegmentKind::Cruise { distance, .. } => (*distance, CRUISE_FUEL_PER_M * distance),
            SegmentKind::Hold { speed, duration, .. } => (speed * duration, HOLD_FUEL),
        }
    }
}

impl MissionEvaluator for TableEvaluator {
    fn evaluate(
        &self,
        vehicle: &VehicleDescription,
        mission: &MissionProfile,
    ) -> Result<MissionResults, EvaluationError> {
        let centre = 24.0 + 100.0 * (NEUTRAL_WING_X - vehicle.wing_origin[0]) / MAC;
        let mut mass = vehicle.takeoff_mass;
        let mut position = 0.0;
        let mut segments = Vec::new();
        for spec in &mission.segments {
            let (distance, fuel) = Self::segment(&spec.tag, &spec.kind);
            let conditions = SegmentConditions {
                mass: vec![mass, mass - 0.5 * fuel, mass - fuel],
                position: vec![position, position + 0.5 * distance, position + distance],
                throttle: vec![0.8; 3],
                percent_mac: Some(vec![centre - 3.0, centre, centre + 3.0]),
            };
            segments.push(SegmentResult::new(spec.tag.clone(), conditions));
            mass -= fuel;
            position += distance;
        }
        Ok(MissionResults::new(segments))
    }
}

pub type Stub = Collaborators<LinearVehicle, ReferenceMissionBuilder, TableEvaluator>;

pub fn collaborators(fixed: f64, per_takeoff: f64) -> Stub {
    Collaborators::new(
        LinearVehicle::new(fixed, per_takeoff),
        ReferenceMissionBuilder::default(),
        TableEvaluator,
    )
}
