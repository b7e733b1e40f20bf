//! Vehicle description handed to the mission evaluator, and a reference builder.

use std::f64::consts::PI;
use std::sync::Arc;

use sizing_core::constants::G0;
use sizing_core::state::IterationState;
use sizing_propulsion::{Calibration, SurrogateTables, TurbofanSurrogate};
use tracing::debug;

use crate::{EvaluationError, VehicleBuilder};

/// Fully specified vehicle for one iteration. Rebuilt from scratch every iteration.
#[derive(Debug, Clone)]
pub struct VehicleDescription {
    pub name: String,
    pub takeoff_mass: f64,
    pub operating_empty_mass: f64,
    pub design_payload: f64,
    pub fuel_mass: f64,
    /// Wing reference area (m²).
    pub reference_area: f64,
    pub span: f64,
    pub mean_aerodynamic_chord: f64,
    pub aspect_ratio: f64,
    pub sweep_quarter_chord: f64,
    pub taper_ratio: f64,
    pub wing_origin: [f64; 3],
    /// Total sea-level static thrust of all engines (N).
    pub sea_level_static_thrust: f64,
    pub engine_count: u32,
    /// Calibrated per-engine surrogate.
    pub engine: TurbofanSurrogate,
}

impl VehicleDescription {
    /// Spanwise station of the mean aerodynamic chord (m from the root).
    pub fn mac_spanwise_station(&self) -> f64 {
        let taper = self.taper_ratio;
        self.span / 6.0 * (1.0 + 2.0 * taper) / (1.0 + taper)
    }

    /// Longitudinal station of the mean aerodynamic chord's leading edge (m).
    pub fn mac_leading_edge_x(&self) -> f64 {
        let root_chord = self.root_chord();
        let quarter_chord_shift = self.mac_spanwise_station() * self.sweep_quarter_chord.tan();
        // leading-edge sweep follows from the quarter-chord sweep and the chord taper
        let chord_shift = 0.25 * (root_chord - self.mean_aerodynamic_chord);
        self.wing_origin[0] + quarter_chord_shift + chord_shift
    }

    pub fn root_chord(&self) -> f64 {
        2.0 * self.reference_area / (self.span * (1.0 + self.taper_ratio))
    }

    /// Induced-drag factor `1 / (π · AR · e)`.
    pub fn induced_drag_factor(&self, oswald_efficiency: f64) -> f64 {
        1.0 / (PI * self.aspect_ratio * oswald_efficiency)
    }
}

/// Chord of a trapezoidal planform averaged by area.
pub fn mean_aerodynamic_chord(root_chord: f64, taper_ratio: f64) -> f64 {
    2.0 / 3.0 * root_chord * (1.0 + taper_ratio + taper_ratio * taper_ratio) / (1.0 + taper_ratio)
}

/// Linear operating-empty mass correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingEmptyCorrelation {
    pub fixed: f64,
    pub per_takeoff: f64,
    pub per_wing_area: f64,
    pub per_static_thrust: f64,
}

impl Default for OperatingEmptyCorrelation {
    fn default() -> Self {
        Self {
            fixed: 30_000.0,
            per_takeoff: 0.25,
            per_wing_area: 45.0,
            per_static_thrust: 0.02,
        }
    }
}

impl OperatingEmptyCorrelation {
    pub fn estimate(&self, takeoff_mass: f64, wing_area: f64, static_thrust: f64) -> f64 {
        self.fixed
            + self.per_takeoff * takeoff_mass
            + self.per_wing_area * wing_area
            + self.per_static_thrust * static_thrust
    }
}

/// Parametric vehicle builder: tapered wing, calibrated twin (or more) turbofan,
/// operating-empty mass from [`OperatingEmptyCorrelation`].
#[derive(Debug, Clone)]
pub struct ReferenceVehicleBuilder {
    pub name: String,
    pub tables: Arc<SurrogateTables>,
    pub engine_count: u32,
    pub bucket_sfc: f64,
    pub taper_ratio: f64,
    pub operating_empty: OperatingEmptyCorrelation,
    /// Top-of-climb mass fraction used for the thrust-loading floor.
    pub toc_mass_fraction: f64,
    pub toc_lift_to_drag: f64,
}

impl ReferenceVehicleBuilder {
    pub fn new(tables: Arc<SurrogateTables>) -> Self {
        Self {
            name: "reference".to_string(),
            tables,
            engine_count: 2,
            bucket_sfc: 0.475,
            taper_ratio: 0.3,
            operating_empty: OperatingEmptyCorrelation::default(),
            toc_mass_fraction: 0.99,
            toc_lift_to_drag: 26.0,
        }
    }

    /// Calibration the builder would apply for `state`, without building the rest.
    pub fn calibrate(
        &self,
        state: &IterationState,
        per_engine_static_thrust: f64,
    ) -> Result<(TurbofanSurrogate, Calibration), EvaluationError> {
        let mut engine = TurbofanSurrogate::new(Arc::clone(&self.tables));
        let calibration = engine.scale_factors(
            state.mission.design_cruise_altitude,
            state.mission.design_cruise_mach,
            per_engine_static_thrust,
            state.mission.throttle_mid_cruise,
            self.bucket_sfc,
        )?;
        Ok((engine, calibration))
    }
}

impl VehicleBuilder for ReferenceVehicleBuilder {
    fn build_vehicle(&self, state: &IterationState) -> Result<VehicleDescription, EvaluationError> {
        let weights = &state.weights;
        let sizing = &state.sizing;
        if !(weights.takeoff > 0.0 && sizing.wing_loading > 0.0 && sizing.aspect_ratio > 0.0) {
            return Err(EvaluationError::InvalidVehicle(format!(
                "takeoff mass {}, wing loading {} and aspect ratio {} must be positive",
                weights.takeoff, sizing.wing_loading, sizing.aspect_ratio
            )));
        }
        if self.engine_count == 0 {
            return Err(EvaluationError::InvalidVehicle(
                "vehicle needs at least one engine".to_string(),
            ));
        }

        let reference_area = weights.takeoff / sizing.wing_loading;
        let span = (sizing.aspect_ratio * reference_area).sqrt();
        let root_chord = 2.0 * reference_area / (span * (1.0 + self.taper_ratio));
        let mac = mean_aerodynamic_chord(root_chord, self.taper_ratio);

        let uncalibrated = TurbofanSurrogate::new(Arc::clone(&self.tables));
        let toc_requirement = uncalibrated.thrust_loading_requirement_toc(
            state.mission.design_cruise_altitude,
            state.mission.design_cruise_mach,
            self.toc_mass_fraction,
            self.toc_lift_to_drag,
        );
        let thrust_loading = sizing.thrust_loading.max(toc_requirement);
        let sea_level_static_thrust = thrust_loading * weights.takeoff * G0;
        let (engine, calibration) =
            self.calibrate(state, sea_level_static_thrust / f64::from(self.engine_count))?;

        let operating_empty_mass =
            self.operating_empty
                .estimate(weights.takeoff, reference_area, sea_level_static_thrust);

        debug!(
            reference_area,
            span,
            thrust_loading,
            operating_empty_mass,
            thrust_factor = calibration.thrust_factor,
            sfc_factor = calibration.sfc_factor,
            "vehicle built"
        );

        Ok(VehicleDescription {
            name: self.name.clone(),
            takeoff_mass: weights.takeoff,
            operating_empty_mass,
            design_payload: weights.design_payload,
            fuel_mass: weights.fuel,
            reference_area,
            span,
            mean_aerodynamic_chord: mac,
            aspect_ratio: sizing.aspect_ratio,
            sweep_quarter_chord: sizing.sweep_quarter_chord,
            taper_ratio: self.taper_ratio,
            wing_origin: sizing.wing_origin,
            sea_level_static_thrust,
            engine_count: self.engine_count,
            engine,
        })
    }
}
