//! Mission profiles: an ordered list of tagged flight segments.

use serde::Serialize;
use sizing_core::state::IterationState;
use sizing_core::units::ft_to_m;

use crate::vehicle::VehicleDescription;
use crate::{EvaluationError, MissionBuilder};

/// Flight condition prescribed for a segment. Altitudes in m, distances in m, time in s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SegmentKind {
    Climb {
        altitude_start: f64,
        altitude_end: f64,
        mach: f64,
    },
    Cruise {
        altitude: f64,
        mach: f64,
        distance: f64,
    },
    Descent {
        altitude_start: f64,
        altitude_end: f64,
        mach: f64,
    },
    Hold {
        altitude: f64,
        /// True air speed (m/s).
        speed: f64,
        duration: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSpec {
    pub tag: String,
    pub kind: SegmentKind,
}

impl SegmentSpec {
    pub fn new(tag: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            tag: tag.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissionProfile {
    pub segments: Vec<SegmentSpec>,
}

impl MissionProfile {
    pub fn push(&mut self, tag: &str, kind: SegmentKind) {
        self.segments.push(SegmentSpec::new(tag, kind));
    }
}

/// Climb and descent break points (ft) and the Mach numbers flown between them.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMissionBuilder {
    pub terminal_altitude_ft: f64,
    pub low_altitude_ft: f64,
    pub mid_altitude_ft: f64,
    pub low_mach: f64,
    pub mid_mach: f64,
    /// Offset (ft) of the first and last cruise legs from the design altitude.
    pub step_ft: f64,
    pub reserve_cruise_mach: f64,
}

impl Default for ReferenceMissionBuilder {
    fn default() -> Self {
        Self {
            terminal_altitude_ft: 0.0,
            low_altitude_ft: 10_000.0,
            mid_altitude_ft: 25_000.0,
            low_mach: 0.45,
            mid_mach: 0.65,
            step_ft: 2_000.0,
            reserve_cruise_mach: 0.65,
        }
    }
}

impl MissionBuilder for ReferenceMissionBuilder {
    fn build_mission(
        &self,
        _vehicle: &VehicleDescription,
        state: &IterationState,
    ) -> Result<MissionProfile, EvaluationError> {
        let mission = &state.mission;
        if !(mission.cruise_distance > 0.0 && mission.reserve_cruise_distance > 0.0) {
            return Err(EvaluationError::InvalidMission(format!(
                "cruise distance {} m and reserve cruise distance {} m must be positive",
                mission.cruise_distance, mission.reserve_cruise_distance
            )));
        }

        let ground = ft_to_m(self.terminal_altitude_ft);
        let low = ft_to_m(self.low_altitude_ft);
        let mid = ft_to_m(self.mid_altitude_ft);
        let step = ft_to_m(self.step_ft);
        let design = mission.design_cruise_altitude;
        let mach = mission.design_cruise_mach;
        let leg = mission.cruise_distance / 3.0;
        let hold_altitude = mission.reserve_hold_altitude;

        let climb = |altitude_start, altitude_end, mach| SegmentKind::Climb {
            altitude_start,
            altitude_end,
            mach,
        };
        let descent = |altitude_start, altitude_end, mach| SegmentKind::Descent {
            altitude_start,
            altitude_end,
            mach,
        };
        let cruise = |altitude, mach, distance| SegmentKind::Cruise {
            altitude,
            mach,
            distance,
        };

        let mut profile = MissionProfile::default();
        profile.push("climb_1", climb(ground, low, self.low_mach));
        profile.push("climb_2", climb(low, mid, self.mid_mach));
        profile.push("climb_3", climb(mid, design - step, mach));
        profile.push("cruise_1", cruise(design - step, mach, leg));
        profile.push("step_climb_1", climb(design - step, design, mach));
        profile.push("cruise_2", cruise(design, mach, leg));
        profile.push("step_climb_2", climb(design, design + step, mach));
        profile.push("cruise_3", cruise(design + step, mach, leg));
        profile.push("descent_1", descent(design + step, mid, mach));
        profile.push("descent_2", descent(mid, low, self.mid_mach));
        profile.push("descent_3", descent(low, ground, self.low_mach));

        profile.push("reserve_climb_1", climb(ground, low, self.low_mach));
        profile.push("reserve_climb_2", climb(low, mid, self.mid_mach));
        profile.push(
            "reserve_cruise",
            cruise(mid, self.reserve_cruise_mach, mission.reserve_cruise_distance),
        );
        profile.push("reserve_descent_1", descent(mid, low, self.mid_mach));
        profile.push("reserve_descent_2", descent(low, hold_altitude, self.low_mach));
        profile.push(
            "hold",
            SegmentKind::Hold {
                altitude: hold_altitude,
                speed: mission.reserve_hold_speed,
                duration: mission.reserve_hold_time,
            },
        );
        Ok(profile)
    }
}
