//! Point-mass mission evaluator with a parabolic drag polar.
//!
//! Each segment is sampled at a fixed number of control points and integrated with
//! explicit Euler steps in along-track distance. Climbs and descents fly a constant
//! flight-path angle; cruise and hold fly level at thrust equal to drag.

use sizing_core::atmosphere::standard_atmosphere;
use sizing_core::constants::G0;
use tracing::{debug, warn};

use crate::profile::{MissionProfile, SegmentKind};
use crate::segments::{MissionResults, SegmentConditions, SegmentResult};
use crate::vehicle::VehicleDescription;
use crate::{EvaluationError, MissionEvaluator};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticEvaluator {
    pub control_points: usize,
    /// Climb flight-path angle (deg).
    pub climb_angle_deg: f64,
    /// Descent flight-path angle (deg, positive down).
    pub descent_angle_deg: f64,
    pub zero_lift_drag: f64,
    pub oswald_efficiency: f64,
    pub idle_throttle: f64,
    /// Centre-of-gravity station with empty tanks (m).
    pub cg_zero_fuel_x: f64,
    /// CG travel from empty to full tanks (m).
    pub cg_fuel_shift: f64,
}

impl Default for AnalyticEvaluator {
    fn default() -> Self {
        Self {
            control_points: 8,
            climb_angle_deg: 3.0,
            descent_angle_deg: 3.0,
            zero_lift_drag: 0.018,
            oswald_efficiency: 0.84,
            idle_throttle: 0.08,
            cg_zero_fuel_x: 32.0,
            cg_fuel_shift: -0.6,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Regime {
    Level,
    Climb(f64),
    Idle(f64),
}

struct Leg {
    altitude_start: f64,
    altitude_end: f64,
    mach: Option<f64>,
    speed: Option<f64>,
    length: f64,
    regime: Regime,
}

impl AnalyticEvaluator {
    fn leg(&self, kind: &SegmentKind) -> Leg {
        match *kind {
            SegmentKind::Climb {
                altitude_start,
                altitude_end,
                mach,
            } => {
                let gamma = self.climb_angle_deg.to_radians();
                Leg {
                    altitude_start,
                    altitude_end,
                    mach: Some(mach),
                    speed: None,
                    length: (altitude_end - altitude_start).abs() / gamma.tan(),
                    regime: Regime::Climb(gamma),
                }
            }
            SegmentKind::Descent {
                altitude_start,
                altitude_end,
                mach,
            } => {
                let gamma = self.descent_angle_deg.to_radians();
                Leg {
                    altitude_start,
                    altitude_end,
                    mach: Some(mach),
                    speed: None,
                    length: (altitude_start - altitude_end).abs() / gamma.tan(),
                    regime: Regime::Idle(gamma),
                }
            }
            SegmentKind::Cruise {
                altitude,
                mach,
                distance,
            } => Leg {
                altitude_start: altitude,
                altitude_end: altitude,
                mach: Some(mach),
                speed: None,
                length: distance,
                regime: Regime::Level,
            },
            SegmentKind::Hold {
                altitude,
                speed,
                duration,
            } => Leg {
                altitude_start: altitude,
                altitude_end: altitude,
                mach: None,
                speed: Some(speed),
                length: speed * duration,
                regime: Regime::Level,
            },
        }
    }

    fn percent_mac(&self, vehicle: &VehicleDescription, mass: f64) -> f64 {
        let zero_fuel_mass = vehicle.takeoff_mass - vehicle.fuel_mass;
        let fuel_fraction = if vehicle.fuel_mass > 0.0 {
            (mass - zero_fuel_mass) / vehicle.fuel_mass
        } else {
            0.0
        };
        let cg_x = self.cg_zero_fuel_x + self.cg_fuel_shift * fuel_fraction;
        (cg_x - vehicle.mac_leading_edge_x()) / vehicle.mean_aerodynamic_chord * 100.0
    }

    fn fly(
        &self,
        vehicle: &VehicleDescription,
        leg: &Leg,
        mut mass: f64,
        mut position: f64,
    ) -> SegmentConditions {
        let n = self.control_points;
        let step = leg.length / (n - 1) as f64;
        let engines = f64::from(vehicle.engine_count);
        let induced = vehicle.induced_drag_factor(self.oswald_efficiency);

        let mut conditions = SegmentConditions {
            mass: Vec::with_capacity(n),
            position: Vec::with_capacity(n),
            throttle: Vec::with_capacity(n),
            percent_mac: Some(Vec::with_capacity(n)),
        };

        for i in 0..n {
            let fraction = i as f64 / (n - 1) as f64;
            let altitude = leg.altitude_start + (leg.altitude_end - leg.altitude_start) * fraction;
            let atmosphere = standard_atmosphere(altitude);
            let (mach, speed) = match (leg.mach, leg.speed) {
                (Some(mach), _) => (mach, mach * atmosphere.speed_of_sound_m_s),
                (None, Some(speed)) => (speed / atmosphere.speed_of_sound_m_s, speed),
                (None, None) => (0.0, 0.0),
            };

            let dynamic_pressure = 0.5 * atmosphere.density_kg_m3 * speed * speed;
            let gamma = match leg.regime {
                Regime::Level => 0.0,
                Regime::Climb(gamma) | Regime::Idle(gamma) => gamma,
            };
            let lift_coefficient =
                mass * G0 * gamma.cos() / (dynamic_pressure * vehicle.reference_area);
            let drag = dynamic_pressure
                * vehicle.reference_area
                * (self.zero_lift_drag + induced * lift_coefficient * lift_coefficient);
            let available = engines * vehicle.engine.max_thrust(altitude, mach);

            let throttle = match leg.regime {
                Regime::Level => drag / available,
                Regime::Climb(gamma) => (drag + mass * G0 * gamma.sin()) / available,
                Regime::Idle(_) => self.idle_throttle,
            };
            let throttle = throttle.clamp(0.0, 1.0);

            conditions.mass.push(mass);
            conditions.position.push(position);
            conditions.throttle.push(throttle);
            if let Some(samples) = conditions.percent_mac.as_mut() {
                samples.push(self.percent_mac(vehicle, mass));
            }

            if i + 1 < n && step > 0.0 && speed > 0.0 {
                let fuel_flow = engines * vehicle.engine.fuel_flow(altitude, mach, throttle);
                mass -= fuel_flow * step / speed;
                position += step;
            }
        }
        conditions
    }
}

impl MissionEvaluator for AnalyticEvaluator {
    fn evaluate(
        &self,
        vehicle: &VehicleDescription,
        mission: &MissionProfile,
    ) -> Result<MissionResults, EvaluationError> {
        if self.control_points < 2 {
            return Err(EvaluationError::Failed(format!(
                "need at least two control points per segment (got {})",
                self.control_points
            )));
        }
        if !(vehicle.reference_area > 0.0 && vehicle.mean_aerodynamic_chord > 0.0) {
            return Err(EvaluationError::InvalidVehicle(
                "wing area and mean aerodynamic chord must be positive".to_string(),
            ));
        }

        let clamped_before = vehicle.engine.out_of_range_queries();
        let mut mass = vehicle.takeoff_mass;
        let mut position = 0.0;
        let mut segments = Vec::with_capacity(mission.segments.len());

        for spec in &mission.segments {
            let leg = self.leg(&spec.kind);
            if !(leg.length.is_finite() && leg.length >= 0.0) {
                return Err(EvaluationError::InvalidMission(format!(
                    "segment '{}' has length {} m",
                    spec.tag, leg.length
                )));
            }
            let conditions = self.fly(vehicle, &leg, mass, position);
            mass = conditions.mass.last().copied().unwrap_or(mass);
            position = conditions.position.last().copied().unwrap_or(position);
            if !(mass.is_finite() && mass > 0.0) {
                return Err(EvaluationError::Failed(format!(
                    "vehicle mass became {mass} kg during segment '{}'",
                    spec.tag
                )));
            }
            segments.push(SegmentResult::new(spec.tag.clone(), conditions));
        }

        let clamped = vehicle.engine.out_of_range_queries() - clamped_before;
        if clamped > 0 {
            warn!(
                clamped,
                "engine surrogate queried outside its tables; boundary values used"
            );
        }
        debug!(
            segments = segments.len(),
            fuel_burned = vehicle.takeoff_mass - mass,
            "mission evaluated"
        );
        Ok(MissionResults::new(segments))
    }
}
