//! Mission-side collaborators of the sizing loop.
//!
//! The loop talks to three seams: a [`VehicleBuilder`] turning the current state into
//! a [`VehicleDescription`], a [`MissionBuilder`] laying out the segment profile, and a
//! [`MissionEvaluator`] flying it. Reference implementations of all three live here so
//! the workspace runs end to end without an external simulator.

pub mod analytic;
pub mod measurements;
pub mod profile;
pub mod segments;
pub mod vehicle;

pub use analytic::AnalyticEvaluator;
pub use measurements::{ExtractionError, MID_CRUISE_TAG, MissionMeasurements};
pub use profile::{MissionProfile, ReferenceMissionBuilder, SegmentKind, SegmentSpec};
pub use segments::{MissionResults, SegmentConditions, SegmentResult, SegmentRole};
pub use vehicle::{OperatingEmptyCorrelation, ReferenceVehicleBuilder, VehicleDescription};

use sizing_core::state::IterationState;
use sizing_propulsion::SurrogateError;
use thiserror::Error;

/// Failures raised by vehicle/mission construction or evaluation.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("engine surrogate failure: {0}")]
    Surrogate(#[from] SurrogateError),
    #[error("invalid vehicle: {0}")]
    InvalidVehicle(String),
    #[error("invalid mission: {0}")]
    InvalidMission(String),
    #[error("mission evaluation failed: {0}")]
    Failed(String),
}

pub trait VehicleBuilder {
    fn build_vehicle(&self, state: &IterationState) -> Result<VehicleDescription, EvaluationError>;
}

pub trait MissionBuilder {
    fn build_mission(
        &self,
        vehicle: &VehicleDescription,
        state: &IterationState,
    ) -> Result<MissionProfile, EvaluationError>;
}

pub trait MissionEvaluator {
    fn evaluate(
        &self,
        vehicle: &VehicleDescription,
        mission: &MissionProfile,
    ) -> Result<MissionResults, EvaluationError>;
}

impl<T: VehicleBuilder + ?Sized> VehicleBuilder for &T {
    fn build_vehicle(&self, state: &IterationState) -> Result<VehicleDescription, EvaluationError> {
        (**self).build_vehicle(state)
    }
}

impl<T: MissionBuilder + ?Sized> MissionBuilder for &T {
    fn build_mission(
        &self,
        vehicle: &VehicleDescription,
        state: &IterationState,
    ) -> Result<MissionProfile, EvaluationError> {
        (**self).build_mission(vehicle, state)
    }
}

impl<T: MissionEvaluator + ?Sized> MissionEvaluator for &T {
    fn evaluate(
        &self,
        vehicle: &VehicleDescription,
        mission: &MissionProfile,
    ) -> Result<MissionResults, EvaluationError> {
        (**self).evaluate(vehicle, mission)
    }
}
