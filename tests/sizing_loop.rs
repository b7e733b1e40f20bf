mod common;

use std::time::Duration;

use aircraft_sizing::export::report::{RunReport, write_report};
use aircraft_sizing::solver::{
    ConfigurationError, DesignParameters, IterationSetup, SizingError, SolverControls,
    run_single_iteration, size_aircraft,
};
use common::*;

const PAYLOAD: f64 = 24_500.0;

fn block_and_reserve_fuel(setup: &IterationSetup) -> f64 {
    let cruise = setup.mission_distance
        - (3.0 * CLIMB_DISTANCE + 2.0 * STEP_CLIMB_DISTANCE + 3.0 * DESCENT_DISTANCE);
    let reserve_cruise = setup.reserve_distance - (2.0 * CLIMB_DISTANCE + 2.0 * DESCENT_DISTANCE);
    let block = 5.0 * CLIMB_FUEL + CRUISE_FUEL_PER_M * cruise + 3.0 * DESCENT_FUEL;
    let alternate = 2.0 * CLIMB_FUEL + CRUISE_FUEL_PER_M * reserve_cruise + 2.0 * DESCENT_FUEL;
    block * (1.0 + setup.reserve_trip_pct) + alternate + HOLD_FUEL
}

#[test]
fn converges_to_the_analytic_fixed_point() {
    let setup = IterationSetup::baseline();
    let collaborators = collaborators(70_000.0, 0.2);
    let outcome = size_aircraft(
        &DesignParameters::default(),
        &setup,
        &SolverControls::default(),
        &collaborators,
    )
    .expect("stub aircraft converges");

    assert!(outcome.report.converged);
    assert!(outcome.iterations <= 10, "took {} iterations", outcome.iterations);
    assert_eq!(outcome.history.len(), outcome.iterations);
    assert_eq!(outcome.state.iteration, outcome.iterations);

    let fuel = block_and_reserve_fuel(&setup);
    assert!((outcome.fuel() - fuel).abs() < 1e-6);

    let operating_empty = (70_000.0 + 0.2 * (PAYLOAD + fuel)) / 0.8;
    let takeoff = operating_empty + PAYLOAD + fuel;
    assert!((outcome.state.weights.takeoff - takeoff).abs() < 5.0);
    assert_eq!(
        outcome.state.weights.takeoff,
        outcome.state.weights.operating_empty + PAYLOAD + outcome.fuel()
    );

    assert!((outcome.state.sizing.wing_origin[0] - NEUTRAL_WING_X).abs() < 1e-9);
    assert_eq!(outcome.state.sizing.wing_origin[1..], [0.0, -0.957]);
}

#[test]
fn run_report_lists_zero_fuel_mass() {
    let collaborators = collaborators(70_000.0, 0.2);
    let outcome = size_aircraft(
        &DesignParameters::default(),
        &IterationSetup::baseline(),
        &SolverControls::default(),
        &collaborators,
    )
    .expect("converges");

    let report = RunReport::new("stub", &outcome);
    let weights = &outcome.state.weights;
    assert_eq!(report.zero_fuel_kg, weights.operating_empty + PAYLOAD);
    assert!((report.zero_fuel_kg - (weights.takeoff - outcome.fuel())).abs() < 1e-6);

    let mut buffer = Vec::new();
    write_report(&mut buffer, &report).expect("json");
    let json = String::from_utf8(buffer).expect("utf8");
    assert!(json.contains("\"zero_fuel_kg\": "));
}

#[test]
fn converged_state_is_a_fixed_point() {
    let setup = IterationSetup::baseline();
    let collaborators = collaborators(70_000.0, 0.2);
    let controls = SolverControls::default();
    let outcome = size_aircraft(&DesignParameters::default(), &setup, &controls, &collaborators)
        .expect("converges");

    let again = run_single_iteration(&outcome.state, &collaborators, &controls).expect("iteration");
    let (before, after) = (&outcome.state, &again.next);
    assert!(again.report.converged);
    assert!((after.weights.fuel - before.weights.fuel).abs() < 1e-6);
    assert!((after.weights.operating_empty - before.weights.operating_empty).abs() < 1.0);
    assert!((after.mission.cruise_distance - before.mission.cruise_distance).abs() < 1e-6);
    assert!((after.mission.reserve_cruise_distance - before.mission.reserve_cruise_distance).abs() < 1e-6);
    assert!((after.sizing.wing_origin[0] - before.sizing.wing_origin[0]).abs() < 1e-9);
}

#[test]
fn single_iteration_closes_distances_immediately() {
    let setup = IterationSetup::baseline();
    let state = setup.initial_state(&DesignParameters::default());
    let output = run_single_iteration(&state, &collaborators(70_000.0, 0.2), &SolverControls::default())
        .expect("iteration");

    let fixed = 3.0 * CLIMB_DISTANCE + 2.0 * STEP_CLIMB_DISTANCE + 3.0 * DESCENT_DISTANCE;
    assert_eq!(output.distance.cruise_distance, setup.mission_distance - fixed);
    assert_eq!(output.next.mission.cruise_distance, output.distance.cruise_distance);
    assert_eq!(output.next.iteration, 1);
    // initial guess was 9 900 nmi of cruise against 10 500 nmi required
    assert!(output.report.metrics.distance_error_nmi > 300.0);
    assert!(!output.report.converged);
}

#[test]
fn cruise_that_cannot_fit_is_a_configuration_error() {
    let setup = IterationSetup {
        mission_distance: 300_000.0,
        ..IterationSetup::baseline()
    };
    let err = size_aircraft(
        &DesignParameters::default(),
        &setup,
        &SolverControls::default(),
        &collaborators(70_000.0, 0.2),
    )
    .expect_err("mission shorter than climb and descent");
    assert!(matches!(
        err,
        SizingError::Configuration(ConfigurationError::NonPositiveCruise { .. })
    ));
    assert_eq!(err.kind(), "configuration");
    assert!(err.last_state().is_none());
}

#[test]
fn iteration_cap_returns_last_state() {
    let controls = SolverControls {
        max_iterations: 3,
        ..SolverControls::default()
    };
    let err = size_aircraft(
        &DesignParameters::default(),
        &IterationSetup::baseline(),
        &controls,
        &collaborators(70_000.0, 0.2),
    )
    .expect_err("three iterations are not enough");

    match &err {
        SizingError::NonConvergence { iterations, state, report } => {
            assert_eq!(*iterations, 3);
            assert_eq!(state.iteration, 3);
            assert!(report.unmet().contains(&"weight"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("no convergence after 3 iterations"));
    assert!(err.last_report().is_some());
}

#[test]
fn growing_residual_trips_divergence_guard() {
    let err = size_aircraft(
        &DesignParameters::default(),
        &IterationSetup::baseline(),
        &SolverControls::default(),
        &collaborators(0.0, 3.0),
    )
    .expect_err("empty mass grows faster than takeoff mass");

    match err {
        SizingError::Divergence { iterations, window, .. } => {
            assert_eq!(window, 6);
            assert_eq!(iterations, 7);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wall_clock_limit_stops_the_loop() {
    let controls = SolverControls {
        max_wall_time: Some(Duration::from_nanos(1)),
        ..SolverControls::default()
    };
    let err = size_aircraft(
        &DesignParameters::default(),
        &IterationSetup::baseline(),
        &controls,
        &collaborators(70_000.0, 0.2),
    )
    .expect_err("limit expires during the first iteration");
    assert_eq!(err.kind(), "timeout");
    assert_eq!(err.last_state().map(|s| s.iteration), Some(1));
}
