//! State threaded through the sizing iterations.
//!
//! Every iteration consumes an [`IterationState`] and produces a new one; balancers
//! never mutate a shared value in place.

use serde::Serialize;

/// Mass bookkeeping for the current iteration (kilograms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightState {
    pub takeoff: f64,
    /// Operating-empty (BOW) target tracked by the weight balancer.
    pub operating_empty: f64,
    pub design_payload: f64,
    pub fuel: f64,
}

impl WeightState {
    /// Build a weight state whose takeoff mass closes the mass budget.
    pub fn new(operating_empty: f64, design_payload: f64, fuel: f64) -> Self {
        Self {
            takeoff: operating_empty + design_payload + fuel,
            operating_empty,
            design_payload,
            fuel,
        }
    }

    /// Copy with `takeoff = operating_empty + design_payload + fuel`.
    pub fn with_takeoff_closed(self) -> Self {
        Self::new(self.operating_empty, self.design_payload, self.fuel)
    }

    /// Zero-fuel mass implied by the current targets.
    pub fn zero_fuel(&self) -> f64 {
        self.operating_empty + self.design_payload
    }
}

/// Mission targets and the mission-dependent guesses that iterate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionState {
    /// Required block distance (m). Fixed input.
    pub mission_distance: f64,
    /// Cruise distance requested from the mission profile (m).
    pub cruise_distance: f64,
    /// Reserve cruise distance requested from the mission profile (m).
    pub reserve_cruise_distance: f64,
    pub throttle_mid_cruise: f64,
    /// Hold duration (s).
    pub reserve_hold_time: f64,
    /// Hold altitude (m).
    pub reserve_hold_altitude: f64,
    /// Hold true air speed (m/s).
    pub reserve_hold_speed: f64,
    /// Trip-fuel fraction kept as contingency.
    pub reserve_trip_pct: f64,
    /// Required reserve (alternate) distance (m). Fixed input.
    pub reserve_distance: f64,
    /// Design cruise altitude (m).
    pub design_cruise_altitude: f64,
    pub design_cruise_mach: f64,
}

/// Geometric and loading parameters of the vehicle being sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingState {
    /// Takeoff mass per wing reference area (kg/m²).
    pub wing_loading: f64,
    /// Sea-level static thrust over takeoff weight.
    pub thrust_loading: f64,
    pub aspect_ratio: f64,
    /// Quarter-chord sweep (rad).
    pub sweep_quarter_chord: f64,
    pub thickness_to_chord: f64,
    /// Wing root leading-edge origin `[x, y, z]` (m); `x` moves with CG targeting.
    pub wing_origin: [f64; 3],
}

impl SizingState {
    /// Copy with the wing moved longitudinally to `x`.
    pub fn with_wing_x(self, x: f64) -> Self {
        let [_, y, z] = self.wing_origin;
        Self {
            wing_origin: [x, y, z],
            ..self
        }
    }
}

/// Complete state of one outer-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationState {
    /// Number of completed iterations that produced this state.
    pub iteration: usize,
    pub weights: WeightState,
    pub mission: MissionState,
    pub sizing: SizingState,
}

impl IterationState {
    /// State at the start of an iteration: mass budget closed, counters untouched.
    pub fn prepared(self) -> Self {
        Self {
            weights: self.weights.with_takeoff_closed(),
            ..self
        }
    }
}
