//! Outer fixed-point loop: build, fly, measure, rebalance.

use std::time::Instant;

use serde::Serialize;
use sizing_core::state::{IterationState, MissionState, WeightState};
use sizing_core::units::m_to_nmi;
use sizing_mission::{
    MissionBuilder, MissionEvaluator, MissionMeasurements, MissionResults, VehicleBuilder,
    VehicleDescription,
};
use tracing::{info, warn};

use crate::cg::{CgUpdate, target_wing_position};
use crate::controls::{DivergenceGuard, SolverControls};
use crate::criteria::{ConvergenceMetrics, ConvergenceReport};
use crate::distance::{DistanceUpdate, balance_distances};
use crate::error::{ConfigurationError, SizingError};
use crate::weight::{WeightUpdate, balance_weights};

/// The three seams the loop drives each iteration.
#[derive(Debug, Clone)]
pub struct Collaborators<V, M, E> {
    pub vehicle: V,
    pub mission: M,
    pub evaluator: E,
}

impl<V, M, E> Collaborators<V, M, E> {
    pub fn new(vehicle: V, mission: M, evaluator: E) -> Self {
        Self {
            vehicle,
            mission,
            evaluator,
        }
    }
}

/// Everything one iteration produced.
#[derive(Debug, Clone)]
pub struct IterationOutput {
    /// State for the next iteration.
    pub next: IterationState,
    pub report: ConvergenceReport,
    pub vehicle: VehicleDescription,
    pub results: MissionResults,
    pub measurements: MissionMeasurements,
    pub distance: DistanceUpdate,
    pub weight: WeightUpdate,
    pub cg: CgUpdate,
}

/// One row of the iteration history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub takeoff: f64,
    pub operating_empty: f64,
    pub fuel: f64,
    pub cruise_distance_nmi: f64,
    pub reserve_cruise_distance_nmi: f64,
    pub wing_x: f64,
    pub metrics: ConvergenceMetrics,
}

impl IterationRecord {
    fn new(state: &IterationState, metrics: ConvergenceMetrics) -> Self {
        Self {
            iteration: state.iteration,
            takeoff: state.weights.takeoff,
            operating_empty: state.weights.operating_empty,
            fuel: state.weights.fuel,
            cruise_distance_nmi: m_to_nmi(state.mission.cruise_distance),
            reserve_cruise_distance_nmi: m_to_nmi(state.mission.reserve_cruise_distance),
            wing_x: state.sizing.wing_origin[0],
            metrics,
        }
    }
}

/// A converged aircraft with the evidence that it converged.
#[derive(Debug, Clone)]
pub struct SizingOutcome {
    pub state: IterationState,
    pub report: ConvergenceReport,
    pub iterations: usize,
    pub history: Vec<IterationRecord>,
    pub vehicle: VehicleDescription,
    pub results: MissionResults,
    pub measurements: MissionMeasurements,
}

impl SizingOutcome {
    /// Converged fuel load (kg): block fuel plus reserves.
    pub fn fuel(&self) -> f64 {
        self.state.weights.fuel
    }
}

/// Run one iteration from `state` and fold the balancer outputs into a new state.
pub fn run_single_iteration<V, M, E>(
    state: &IterationState,
    collaborators: &Collaborators<V, M, E>,
    controls: &SolverControls,
) -> Result<IterationOutput, SizingError>
where
    V: VehicleBuilder,
    M: MissionBuilder,
    E: MissionEvaluator,
{
    let state = state.prepared();
    let vehicle = collaborators.vehicle.build_vehicle(&state)?;
    let profile = collaborators.mission.build_mission(&vehicle, &state)?;
    let results = collaborators.evaluator.evaluate(&vehicle, &profile)?;
    let measurements = MissionMeasurements::extract(&results)?;

    let distance = balance_distances(
        &measurements,
        state.mission.mission_distance,
        state.mission.reserve_distance,
    )?;
    let weight = balance_weights(
        &measurements,
        vehicle.operating_empty_mass,
        &state.weights,
        state.mission.reserve_trip_pct,
        &controls.gains,
    );
    let cg = target_wing_position(
        &measurements,
        vehicle.mean_aerodynamic_chord,
        state.sizing.wing_origin[0],
        &controls.mac,
    );

    let next = IterationState {
        iteration: state.iteration + 1,
        weights: WeightState::new(
            weight.operating_empty,
            state.weights.design_payload,
            weight.fuel,
        ),
        mission: MissionState {
            cruise_distance: distance.cruise_distance,
            reserve_cruise_distance: distance.reserve_cruise_distance,
            throttle_mid_cruise: measurements.throttle_mid_cruise,
            ..state.mission
        },
        sizing: state.sizing.with_wing_x(cg.wing_x),
    };
    let metrics = ConvergenceMetrics {
        distance_error_nmi: distance.distance_error_nmi,
        reserve_error_nmi: distance.reserve_error_nmi,
        weight_error_kg: weight.weight_error_kg,
        mac_error: cg.mac_error,
    };

    Ok(IterationOutput {
        next,
        report: ConvergenceReport::new(metrics, controls.tolerances),
        vehicle,
        results,
        measurements,
        distance,
        weight,
        cg,
    })
}

/// Iterate from `initial` until every criterion holds or a termination policy fires.
pub fn size<V, M, E>(
    initial: IterationState,
    collaborators: &Collaborators<V, M, E>,
    controls: &SolverControls,
) -> Result<SizingOutcome, SizingError>
where
    V: VehicleBuilder,
    M: MissionBuilder,
    E: MissionEvaluator,
{
    controls.validate()?;
    let started = Instant::now();
    let mut guard = DivergenceGuard::new(controls.divergence_window);
    let mut history = Vec::new();
    let mut state = initial.prepared();
    let mut last_report = None;

    for _ in 0..controls.max_iterations {
        let output = run_single_iteration(&state, collaborators, controls)?;
        let report = output.report;
        let metrics = report.metrics;
        history.push(IterationRecord::new(&output.next, metrics));
        let iterations = history.len();

        info!(
            iteration = iterations,
            takeoff = output.next.weights.takeoff,
            fuel = output.next.weights.fuel,
            distance_error_nmi = metrics.distance_error_nmi,
            reserve_error_nmi = metrics.reserve_error_nmi,
            weight_error_kg = metrics.weight_error_kg,
            mac_error = metrics.mac_error,
            "sizing iteration"
        );

        if report.converged {
            info!(iterations, fuel = output.next.weights.fuel, "sizing converged");
            return Ok(SizingOutcome {
                state: output.next,
                report,
                iterations,
                history,
                vehicle: output.vehicle,
                results: output.results,
                measurements: output.measurements,
            });
        }

        if guard.observe(report.worst_residual) {
            warn!(
                iterations,
                worst_residual = report.worst_residual,
                "sizing diverging"
            );
            return Err(SizingError::Divergence {
                iterations,
                window: controls.divergence_window,
                state: Box::new(output.next),
                report,
            });
        }

        if let Some(limit) = controls.max_wall_time {
            if started.elapsed() > limit {
                warn!(iterations, ?limit, "sizing wall-clock limit exceeded");
                return Err(SizingError::Timeout {
                    iterations,
                    limit,
                    state: Box::new(output.next),
                    report,
                });
            }
        }

        state = output.next;
        last_report = Some(report);
    }

    match last_report {
        Some(report) => {
            warn!(
                iterations = controls.max_iterations,
                unmet = ?report.unmet(),
                "sizing stopped at iteration cap"
            );
            Err(SizingError::NonConvergence {
                iterations: controls.max_iterations,
                state: Box::new(state),
                report,
            })
        }
        None => Err(ConfigurationError::Invalid(
            "max_iterations must be at least 1".to_string(),
        )
        .into()),
    }
}
