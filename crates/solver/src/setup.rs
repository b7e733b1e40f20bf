//! Initial guesses, design parameters, and conversion from run configuration.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sizing_config::{EngineConfig, MacPolicyConfig, SizingConfig};
use sizing_core::state::{IterationState, MissionState, SizingState, WeightState};
use sizing_core::time::minutes_to_seconds;
use sizing_core::units::{deg_to_rad, ft_to_m, kts_to_ms, nmi_to_m};
use sizing_mission::{
    AnalyticEvaluator, MissionBuilder, MissionEvaluator, OperatingEmptyCorrelation,
    ReferenceMissionBuilder, ReferenceVehicleBuilder, VehicleBuilder,
};
use sizing_propulsion::{ReferenceData, SurrogateTables};

use crate::cg::{MacReferencePolicy, MacTargeting};
use crate::controls::SolverControls;
use crate::criteria::Tolerances;
use crate::error::{ConfigurationError, SizingError};
use crate::sizing::{Collaborators, SizingOutcome, size};
use crate::weight::RelaxationGains;

/// Free design variables of a sizing run (SI: kg/m², rad, m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DesignParameters {
    pub wing_loading: f64,
    pub aspect_ratio: f64,
    pub sweep_quarter_chord: f64,
    pub thickness_to_chord: f64,
    pub thrust_loading: f64,
    pub design_cruise_altitude: f64,
    pub design_cruise_mach: f64,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self::from_config(&SizingConfig::default())
    }
}

impl DesignParameters {
    pub fn from_config(config: &SizingConfig) -> Self {
        let design = &config.design;
        Self {
            wing_loading: design.wing_loading_kg_m2,
            aspect_ratio: design.aspect_ratio,
            sweep_quarter_chord: deg_to_rad(design.sweep_deg),
            thickness_to_chord: design.thickness_to_chord,
            thrust_loading: design.thrust_loading,
            design_cruise_altitude: ft_to_m(design.cruise_altitude_ft),
            design_cruise_mach: design.cruise_mach,
        }
    }
}

/// Initial guesses and fixed mission requirements (SI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationSetup {
    pub takeoff_mass: f64,
    pub operating_empty_mass: f64,
    pub design_payload: f64,
    pub mission_distance: f64,
    pub cruise_distance: f64,
    pub reserve_distance: f64,
    pub reserve_cruise_distance: f64,
    pub throttle_mid_cruise: f64,
    pub reserve_hold_time: f64,
    pub reserve_hold_altitude: f64,
    pub reserve_hold_speed: f64,
    pub reserve_trip_pct: f64,
    pub wing_origin: [f64; 3],
}

impl IterationSetup {
    /// Long-range twin: 279 t MTOW, 10 500 nmi with 24.5 t payload.
    pub fn baseline() -> Self {
        Self::from_config(&SizingConfig::default())
    }

    pub fn from_config(config: &SizingConfig) -> Self {
        let mission = &config.mission;
        Self {
            takeoff_mass: config.weights.takeoff_kg,
            operating_empty_mass: config.weights.operating_empty_kg,
            design_payload: config.weights.payload_kg,
            mission_distance: nmi_to_m(mission.range_nmi),
            cruise_distance: nmi_to_m(mission.cruise_distance_nmi),
            reserve_distance: nmi_to_m(mission.reserve_distance_nmi),
            reserve_cruise_distance: nmi_to_m(mission.reserve_cruise_distance_nmi),
            throttle_mid_cruise: mission.throttle_mid_cruise,
            reserve_hold_time: minutes_to_seconds(mission.hold_time_min),
            reserve_hold_altitude: ft_to_m(mission.hold_altitude_ft),
            reserve_hold_speed: kts_to_ms(mission.hold_speed_kt),
            reserve_trip_pct: mission.trip_reserve_fraction,
            wing_origin: config.wing_origin_m,
        }
    }

    /// Initial fuel guess: takeoff mass minus operating empty and payload.
    pub fn initial_fuel(&self) -> f64 {
        self.takeoff_mass - self.operating_empty_mass - self.design_payload
    }

    pub fn initial_state(&self, parameters: &DesignParameters) -> IterationState {
        IterationState {
            iteration: 0,
            weights: WeightState::new(
                self.operating_empty_mass,
                self.design_payload,
                self.initial_fuel(),
            ),
            mission: MissionState {
                mission_distance: self.mission_distance,
                cruise_distance: self.cruise_distance,
                reserve_cruise_distance: self.reserve_cruise_distance,
                throttle_mid_cruise: self.throttle_mid_cruise,
                reserve_hold_time: self.reserve_hold_time,
                reserve_hold_altitude: self.reserve_hold_altitude,
                reserve_hold_speed: self.reserve_hold_speed,
                reserve_trip_pct: self.reserve_trip_pct,
                reserve_distance: self.reserve_distance,
                design_cruise_altitude: parameters.design_cruise_altitude,
                design_cruise_mach: parameters.design_cruise_mach,
            },
            sizing: SizingState {
                wing_loading: parameters.wing_loading,
                thrust_loading: parameters.thrust_loading,
                aspect_ratio: parameters.aspect_ratio,
                sweep_quarter_chord: parameters.sweep_quarter_chord,
                thickness_to_chord: parameters.thickness_to_chord,
                wing_origin: self.wing_origin,
            },
        }
    }
}

impl SolverControls {
    pub fn from_config(config: &SizingConfig) -> Result<Self, ConfigurationError> {
        let controls = &config.controls;
        let gains = &controls.gains;
        let solver = Self {
            max_iterations: controls.max_iterations,
            max_wall_time: controls.max_wall_time_s.map(Duration::from_secs_f64),
            divergence_window: controls.divergence_window,
            tolerances: Tolerances {
                distance_nmi: controls.tolerances.distance_nmi,
                reserve_nmi: controls.tolerances.reserve_nmi,
                weight_kg: controls.tolerances.weight_kg,
                mac: controls.tolerances.mac,
            },
            gains: RelaxationGains::new(
                gains.far,
                gains.mid,
                gains.near,
                gains.far_threshold_kg,
                gains.near_threshold_kg,
            )?,
            mac: MacTargeting {
                target_percent_mac: controls.target_percent_mac,
                error_scale: controls.mac_error_scale,
                policy: match controls.mac_policy {
                    MacPolicyConfig::Midpoint => MacReferencePolicy::Midpoint,
                    MacPolicyConfig::Minimum => MacReferencePolicy::Minimum,
                },
            },
        };
        solver.validate()?;
        Ok(solver)
    }
}

/// Engine tables named by the configuration, or the bundled deck.
pub fn load_engine_tables(engine: &EngineConfig) -> Result<Arc<SurrogateTables>, ConfigurationError> {
    match (&engine.max_thrust_table, &engine.tsfc_table) {
        (Some(thrust), Some(tsfc)) => {
            let data = ReferenceData::from_paths(thrust, tsfc)?;
            Ok(Arc::new(SurrogateTables::build(&data)?))
        }
        (None, None) => Ok(SurrogateTables::bundled()?),
        _ => Err(ConfigurationError::Invalid(
            "engine.max_thrust_table and engine.tsfc_table must be given together".to_string(),
        )),
    }
}

pub type ReferenceCollaborators =
    Collaborators<ReferenceVehicleBuilder, ReferenceMissionBuilder, AnalyticEvaluator>;

/// Reference vehicle, mission and evaluator configured from `config`, sharing `tables`.
pub fn reference_collaborators(
    config: &SizingConfig,
    tables: Arc<SurrogateTables>,
) -> ReferenceCollaborators {
    let airframe = &config.airframe;
    let mut vehicle = ReferenceVehicleBuilder::new(tables);
    vehicle.name = config.name.clone();
    vehicle.engine_count = config.engine.count;
    vehicle.bucket_sfc = config.engine.bucket_sfc;
    vehicle.taper_ratio = airframe.taper_ratio;
    vehicle.operating_empty = OperatingEmptyCorrelation {
        fixed: airframe.oew_fixed_kg,
        per_takeoff: airframe.oew_per_takeoff,
        per_wing_area: airframe.oew_per_wing_area,
        per_static_thrust: airframe.oew_per_static_thrust,
    };
    let evaluator = AnalyticEvaluator {
        cg_zero_fuel_x: airframe.cg_zero_fuel_m,
        cg_fuel_shift: airframe.cg_fuel_shift_m,
        ..AnalyticEvaluator::default()
    };
    Collaborators::new(vehicle, ReferenceMissionBuilder::default(), evaluator)
}

/// Size one aircraft for `parameters`, starting from `setup`.
pub fn size_aircraft<V, M, E>(
    parameters: &DesignParameters,
    setup: &IterationSetup,
    controls: &SolverControls,
    collaborators: &Collaborators<V, M, E>,
) -> Result<SizingOutcome, SizingError>
where
    V: VehicleBuilder,
    M: MissionBuilder,
    E: MissionEvaluator,
{
    size(setup.initial_state(parameters), collaborators, controls)
}
