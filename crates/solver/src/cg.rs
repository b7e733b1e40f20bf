//! Wing placement toward a target percent-MAC.

use serde::Serialize;
use sizing_mission::MissionMeasurements;
use tracing::debug;

/// How the percent-MAC samples of a mission collapse to one representative figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MacReferencePolicy {
    /// Mean of the smallest and largest sample.
    #[default]
    Midpoint,
    Minimum,
}

impl MacReferencePolicy {
    pub fn representative(self, measured: &MissionMeasurements) -> f64 {
        match self {
            Self::Midpoint => 0.5 * (measured.percent_mac_min + measured.percent_mac_max),
            Self::Minimum => measured.percent_mac_min,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacTargeting {
    pub target_percent_mac: f64,
    /// Multiplier turning the percent-MAC miss into the reported error.
    pub error_scale: f64,
    pub policy: MacReferencePolicy,
}

impl Default for MacTargeting {
    fn default() -> Self {
        Self {
            target_percent_mac: 24.0,
            error_scale: 5.0,
            policy: MacReferencePolicy::Midpoint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CgUpdate {
    pub representative_percent_mac: f64,
    /// Wing origin x for the next iteration (m).
    pub wing_x: f64,
    pub mac_error: f64,
}

/// Shift the wing so the representative percent-MAC lands on the target.
pub fn target_wing_position(
    measured: &MissionMeasurements,
    mean_aerodynamic_chord: f64,
    wing_x: f64,
    targeting: &MacTargeting,
) -> CgUpdate {
    let representative = targeting.policy.representative(measured);
    let miss = targeting.target_percent_mac - representative;
    let shift = miss / 100.0 * mean_aerodynamic_chord;
    let update = CgUpdate {
        representative_percent_mac: representative,
        wing_x: wing_x - shift,
        mac_error: miss * targeting.error_scale,
    };
    debug!(
        representative,
        shift,
        wing_x = update.wing_x,
        "wing repositioned"
    );
    update
}
