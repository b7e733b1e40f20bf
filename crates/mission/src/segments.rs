//! Per-segment mission outcomes and the naming convention used to tag them.

use serde::Serialize;

/// Role of a flight segment, derived from its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentRole {
    Climb,
    StepClimb,
    Cruise,
    Descent,
    ReserveClimb,
    ReserveCruise,
    ReserveDescent,
    Hold,
}

impl SegmentRole {
    /// Classify a segment tag such as `climb_2`, `step_climb_1`, `reserve_cruise`, or `hold`.
    ///
    /// Tags belonging to a second leg, and reserve step climbs, have no role.
    /// Matching is case-sensitive.
    pub fn classify(tag: &str) -> Option<Self> {
        if tag.contains("second_leg") {
            return None;
        }
        let reserve = tag.contains("reserve");
        let step = tag.contains("step");

        if tag.contains("climb") {
            return match (reserve, step) {
                (false, false) => Some(Self::Climb),
                (false, true) => Some(Self::StepClimb),
                (true, false) => Some(Self::ReserveClimb),
                (true, true) => None,
            };
        }
        if tag.contains("cruise") {
            return Some(if reserve {
                Self::ReserveCruise
            } else {
                Self::Cruise
            });
        }
        if tag.contains("descent") {
            return Some(if reserve {
                Self::ReserveDescent
            } else {
                Self::Descent
            });
        }
        if tag.contains("hold") {
            return Some(Self::Hold);
        }
        None
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Climb => "climb",
            Self::StepClimb => "step climb",
            Self::Cruise => "cruise",
            Self::Descent => "descent",
            Self::ReserveClimb => "reserve climb",
            Self::ReserveCruise => "reserve cruise",
            Self::ReserveDescent => "reserve descent",
            Self::Hold => "hold",
        }
    }
}

/// Time series sampled at the segment's control points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentConditions {
    /// Total vehicle mass (kg).
    pub mass: Vec<f64>,
    /// Along-track inertial position (m).
    pub position: Vec<f64>,
    pub throttle: Vec<f64>,
    /// Lift centroid location in percent of the mean aerodynamic chord.
    pub percent_mac: Option<Vec<f64>>,
}

/// Outcome of one flight segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentResult {
    pub tag: String,
    pub conditions: SegmentConditions,
}

impl SegmentResult {
    pub fn new(tag: impl Into<String>, conditions: SegmentConditions) -> Self {
        Self {
            tag: tag.into(),
            conditions,
        }
    }

    pub fn role(&self) -> Option<SegmentRole> {
        SegmentRole::classify(&self.tag)
    }

    pub fn start_mass(&self) -> Option<f64> {
        self.conditions.mass.first().copied()
    }

    pub fn end_mass(&self) -> Option<f64> {
        self.conditions.mass.last().copied()
    }

    pub fn start_position(&self) -> Option<f64> {
        self.conditions.position.first().copied()
    }

    pub fn end_position(&self) -> Option<f64> {
        self.conditions.position.last().copied()
    }

    /// Along-track distance flown within the segment.
    pub fn distance(&self) -> Option<f64> {
        Some(self.end_position()? - self.start_position()?)
    }

    /// Mass burned within the segment.
    pub fn fuel_burned(&self) -> Option<f64> {
        Some(self.start_mass()? - self.end_mass()?)
    }

    pub fn start_throttle(&self) -> Option<f64> {
        self.conditions.throttle.first().copied()
    }
}

/// Ordered collection of segment outcomes for one mission evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissionResults {
    pub segments: Vec<SegmentResult>,
}

impl MissionResults {
    pub fn new(segments: Vec<SegmentResult>) -> Self {
        Self { segments }
    }

    pub fn get(&self, tag: &str) -> Option<&SegmentResult> {
        self.segments.iter().find(|s| s.tag == tag)
    }

    /// Segments tagged with `role`, in flight order.
    pub fn with_role(&self, role: SegmentRole) -> impl Iterator<Item = &SegmentResult> + '_ {
        self.segments.iter().filter(move |s| s.role() == Some(role))
    }

    /// Every percent-MAC sample across all segments and control points.
    pub fn percent_mac_samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.segments
            .iter()
            .filter_map(|s| s.conditions.percent_mac.as_deref())
            .flatten()
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_naming_convention() {
        let cases = [
            ("climb_1", Some(SegmentRole::Climb)),
            ("step_climb_2", Some(SegmentRole::StepClimb)),
            ("cruise_2", Some(SegmentRole::Cruise)),
            ("descent_0", Some(SegmentRole::Descent)),
            ("reserve_climb_3", Some(SegmentRole::ReserveClimb)),
            ("reserve_cruise", Some(SegmentRole::ReserveCruise)),
            ("reserve_descent_4", Some(SegmentRole::ReserveDescent)),
            ("hold", Some(SegmentRole::Hold)),
            ("second_leg_cruise", None),
            ("reserve_step_climb", None),
            ("takeoff", None),
            ("Cruise_1", None),
            ("HOLD", None),
        ];
        for (tag, expected) in cases {
            assert_eq!(SegmentRole::classify(tag), expected, "tag {tag}");
        }
    }

    #[test]
    fn segment_spans_use_first_and_last_control_points() {
        let segment = SegmentResult::new(
            "cruise_1",
            SegmentConditions {
                mass: vec![200_000.0, 199_000.0, 198_500.0],
                position: vec![1_000.0, 2_000.0, 4_000.0],
                throttle: vec![0.6, 0.7, 0.8],
                percent_mac: None,
            },
        );
        assert_eq!(segment.distance(), Some(3_000.0));
        assert_eq!(segment.fuel_burned(), Some(1_500.0));
        assert_eq!(segment.start_throttle(), Some(0.6));
    }
}
