//! Fuel load and operating-empty target relaxation.

use sizing_core::state::WeightState;
use sizing_mission::MissionMeasurements;
use tracing::debug;

use crate::error::ConfigurationError;

/// Piecewise relaxation gain on the operating-empty mismatch.
///
/// `|Δ| > far_threshold` uses `far`, `near_threshold < |Δ| ≤ far_threshold` uses `mid`,
/// and anything smaller uses `near`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationGains {
    far: f64,
    mid: f64,
    near: f64,
    far_threshold: f64,
    near_threshold: f64,
}

impl Default for RelaxationGains {
    fn default() -> Self {
        Self {
            far: 2.0,
            mid: 1.2,
            near: 0.8,
            far_threshold: 500.0,
            near_threshold: 50.0,
        }
    }
}

impl RelaxationGains {
    pub fn new(
        far: f64,
        mid: f64,
        near: f64,
        far_threshold: f64,
        near_threshold: f64,
    ) -> Result<Self, ConfigurationError> {
        for (name, value) in [("far", far), ("mid", mid), ("near", near)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::InvalidGain { name, value });
            }
        }
        if !(near_threshold.is_finite()
            && far_threshold.is_finite()
            && near_threshold > 0.0
            && far_threshold > near_threshold)
        {
            return Err(ConfigurationError::InvalidGainBands {
                near: near_threshold,
                far: far_threshold,
            });
        }
        Ok(Self {
            far,
            mid,
            near,
            far_threshold,
            near_threshold,
        })
    }

    pub fn gain_for(&self, delta: f64) -> f64 {
        let magnitude = delta.abs();
        if magnitude > self.far_threshold {
            self.far
        } else if magnitude > self.near_threshold {
            self.mid
        } else {
            self.near
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightUpdate {
    pub operating_empty: f64,
    pub fuel: f64,
    pub reserve_fuel: f64,
    pub landing_weight: f64,
    /// Simulated minus targeted operating-empty mass.
    pub delta: f64,
    pub gain: f64,
    pub weight_error_kg: f64,
}

/// Fuel becomes block plus reserve fuel; the operating-empty target moves toward the
/// simulated value with a band-dependent gain.
pub fn balance_weights(
    measured: &MissionMeasurements,
    simulated_operating_empty: f64,
    weights: &WeightState,
    trip_reserve_fraction: f64,
    gains: &RelaxationGains,
) -> WeightUpdate {
    let contingency = measured.block_fuel * trip_reserve_fraction;
    let reserve_fuel = contingency + measured.alternate_fuel + measured.hold_fuel;
    let fuel = measured.block_fuel + reserve_fuel;
    let landing_weight = measured.hold_end_mass - contingency;

    let delta = simulated_operating_empty - weights.operating_empty;
    let gain = gains.gain_for(delta);
    let operating_empty = weights.operating_empty + gain * delta;
    let weight_error_kg = (landing_weight - operating_empty - weights.design_payload).abs();

    debug!(delta, gain, operating_empty, fuel, "weights balanced");
    WeightUpdate {
        operating_empty,
        fuel,
        reserve_fuel,
        landing_weight,
        delta,
        gain,
        weight_error_kg,
    }
}
