//! Scalar quantities the balancers need, pulled out of one mission evaluation.

use serde::Serialize;
use thiserror::Error;

use crate::segments::{MissionResults, SegmentResult, SegmentRole};

/// Cruise leg whose throttle seeds the next surrogate calibration.
pub const MID_CRUISE_TAG: &str = "cruise_2";

/// Errors raised when a mission evaluation lacks the segments the sizing loop relies on.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("mission results contain no {0} segment")]
    MissingSegments(&'static str),
    #[error("segment '{0}' has no control points")]
    EmptySegment(String),
    #[error("mission results contain no percent-MAC samples")]
    NoPercentMac,
    #[error("percent-MAC sample {0} is not finite")]
    NonFinitePercentMac(f64),
}

/// Distances (m), fuel masses (kg) and stability samples of one mission run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionMeasurements {
    pub climb_distance: f64,
    pub step_climb_distance: f64,
    pub cruise_distance: f64,
    pub descent_distance: f64,
    /// First climb start to last descent end.
    pub block_distance: f64,
    pub reserve_climb_distance: f64,
    pub reserve_cruise_distance: f64,
    pub reserve_descent_distance: f64,

    pub climb_fuel: f64,
    pub cruise_fuel: f64,
    pub descent_fuel: f64,
    /// First climb start to last descent end.
    pub block_fuel: f64,
    /// First reserve climb start to last reserve descent end.
    pub alternate_fuel: f64,
    pub reserve_cruise_fuel: f64,
    pub hold_fuel: f64,
    /// Mass at the end of the hold.
    pub hold_end_mass: f64,

    /// Throttle at the first control point of the [`MID_CRUISE_TAG`] segment.
    pub throttle_mid_cruise: f64,
    pub percent_mac_min: f64,
    pub percent_mac_max: f64,
}

impl MissionMeasurements {
    pub fn extract(results: &MissionResults) -> Result<Self, ExtractionError> {
        let climbs = collect(results, SegmentRole::Climb)?;
        let cruises = collect(results, SegmentRole::Cruise)?;
        let descents = collect(results, SegmentRole::Descent)?;
        let reserve_climbs = collect(results, SegmentRole::ReserveClimb)?;
        let reserve_cruises = collect(results, SegmentRole::ReserveCruise)?;
        let reserve_descents = collect(results, SegmentRole::ReserveDescent)?;
        let holds = collect(results, SegmentRole::Hold)?;
        let step_climbs: Vec<&SegmentResult> = results.with_role(SegmentRole::StepClimb).collect();

        let first_climb = climbs[0];
        let last_descent = descents[descents.len() - 1];
        let hold = holds[0];

        let mid_cruise = results
            .get(MID_CRUISE_TAG)
            .ok_or(ExtractionError::MissingSegments(MID_CRUISE_TAG))?;
        let throttle_mid_cruise = end(mid_cruise, SegmentResult::start_throttle)?;

        let (percent_mac_min, percent_mac_max) = percent_mac_range(results)?;

        Ok(Self {
            climb_distance: position_span(&climbs)?,
            step_climb_distance: summed(&step_climbs, SegmentResult::distance)?,
            cruise_distance: summed(&cruises, SegmentResult::distance)?,
            descent_distance: position_span(&descents)?,
            block_distance: end(last_descent, SegmentResult::end_position)?
                - end(first_climb, SegmentResult::start_position)?,
            reserve_climb_distance: position_span(&reserve_climbs)?,
            reserve_cruise_distance: summed(&reserve_cruises, SegmentResult::distance)?,
            reserve_descent_distance: position_span(&reserve_descents)?,

            climb_fuel: mass_span(&climbs)?,
            cruise_fuel: mass_span(&cruises)?,
            descent_fuel: mass_span(&descents)?,
            block_fuel: end(first_climb, SegmentResult::start_mass)?
                - end(last_descent, SegmentResult::end_mass)?,
            alternate_fuel: end(reserve_climbs[0], SegmentResult::start_mass)?
                - end(reserve_descents[reserve_descents.len() - 1], SegmentResult::end_mass)?,
            reserve_cruise_fuel: summed(&reserve_cruises, SegmentResult::fuel_burned)?,
            hold_fuel: end(hold, SegmentResult::fuel_burned)?,
            hold_end_mass: end(hold, SegmentResult::end_mass)?,

            throttle_mid_cruise,
            percent_mac_min,
            percent_mac_max,
        })
    }

    /// Reserve-mission distance actually flown.
    pub fn reserve_distance(&self) -> f64 {
        self.reserve_climb_distance + self.reserve_cruise_distance + self.reserve_descent_distance
    }
}

fn collect(
    results: &MissionResults,
    role: SegmentRole,
) -> Result<Vec<&SegmentResult>, ExtractionError> {
    let segments: Vec<&SegmentResult> = results.with_role(role).collect();
    if segments.is_empty() {
        return Err(ExtractionError::MissingSegments(role.label()));
    }
    Ok(segments)
}

fn end(
    segment: &SegmentResult,
    value: impl Fn(&SegmentResult) -> Option<f64>,
) -> Result<f64, ExtractionError> {
    value(segment).ok_or_else(|| ExtractionError::EmptySegment(segment.tag.clone()))
}

fn summed(
    segments: &[&SegmentResult],
    value: impl Fn(&SegmentResult) -> Option<f64>,
) -> Result<f64, ExtractionError> {
    segments.iter().map(|s| end(s, &value)).sum()
}

fn position_span(segments: &[&SegmentResult]) -> Result<f64, ExtractionError> {
    let first = segments[0];
    let last = segments[segments.len() - 1];
    Ok(end(last, SegmentResult::end_position)? - end(first, SegmentResult::start_position)?)
}

fn mass_span(segments: &[&SegmentResult]) -> Result<f64, ExtractionError> {
    let first = segments[0];
    let last = segments[segments.len() - 1];
    Ok(end(first, SegmentResult::start_mass)? - end(last, SegmentResult::end_mass)?)
}

fn percent_mac_range(results: &MissionResults) -> Result<(f64, f64), ExtractionError> {
    let mut range: Option<(f64, f64)> = None;
    for sample in results.percent_mac_samples() {
        if !sample.is_finite() {
            return Err(ExtractionError::NonFinitePercentMac(sample));
        }
        range = Some(match range {
            None => (sample, sample),
            Some((lo, hi)) => (lo.min(sample), hi.max(sample)),
        });
    }
    range.ok_or(ExtractionError::NoPercentMac)
}
