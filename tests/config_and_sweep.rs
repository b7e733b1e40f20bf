mod common;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use aircraft_sizing::config::{ConfigError, SizingConfig, load_sizing_config, load_sweep_config};
use aircraft_sizing::core::units::ft_to_m;
use aircraft_sizing::propulsion::SurrogateTables;
use aircraft_sizing::solver::{
    DesignParameters, IterationSetup, SolverControls, SweepGrid, load_engine_tables,
    reference_collaborators, size_aircraft, sweep,
};

fn repo_config(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs").join(name)
}

#[test]
fn bundled_baseline_matches_defaults() {
    let config = load_sizing_config(repo_config("baseline.toml")).expect("baseline.toml");
    assert_eq!(config, SizingConfig::default());
}

#[test]
fn bundled_sweep_overrides_iteration_cap() {
    let config = load_sweep_config(repo_config("sweep.yaml")).expect("sweep.yaml");
    assert_eq!(config.wing_loadings_kg_m2, vec![650.0, 700.0, 750.0]);
    assert_eq!(config.altitudes_ft.len(), 3);
    assert_eq!(config.base.controls.max_iterations, 80);
    assert_eq!(config.base.design, SizingConfig::default().design);
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("tempfile");
    writeln!(file, "controls:\n  gains:\n    near: -0.5").expect("write");
    let err = load_sizing_config(file.path()).expect_err("negative gain");
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("controls.gains.near"));
}

#[test]
fn sweep_sizes_every_grid_point_in_order() {
    let tables = SurrogateTables::bundled().expect("bundled tables");
    let grid = SweepGrid {
        wing_loadings: vec![650.0, 750.0],
        altitudes: vec![ft_to_m(35_000.0), ft_to_m(39_000.0)],
        m4_m0: 1.0,
        lift_to_drag: 22.0,
        threads: Some(3),
    };
    let points = sweep(
        &grid,
        &DesignParameters::default(),
        &IterationSetup::baseline(),
        &SolverControls::default(),
        &tables,
        || common::collaborators(70_000.0, 0.2),
    );

    assert_eq!(points.len(), 4);
    let order: Vec<(f64, f64)> = points.iter().map(|p| (p.wing_loading, p.altitude)).collect();
    assert_eq!(order, grid.points());
    for point in &points {
        let summary = point.outcome.as_ref().expect("stub point converges");
        assert!(summary.iterations <= 12);
        assert!(point.thrust_loading > 0.0 && point.thrust_loading < 1.0);
    }
    // higher cruise needs more installed thrust per unit weight
    assert!(points[1].thrust_loading > points[0].thrust_loading);
}

#[test]
fn empty_grid_yields_no_points() {
    let tables = SurrogateTables::bundled().expect("bundled tables");
    let grid = SweepGrid {
        wing_loadings: Vec::new(),
        altitudes: vec![ft_to_m(37_000.0)],
        m4_m0: 1.0,
        lift_to_drag: 22.0,
        threads: None,
    };
    assert!(grid.is_empty());
    let points = sweep(
        &grid,
        &DesignParameters::default(),
        &IterationSetup::baseline(),
        &SolverControls::default(),
        &tables,
        || common::collaborators(70_000.0, 0.2),
    );
    assert!(points.is_empty());
}

#[test]
fn reference_model_sizes_the_baseline() {
    let config = SizingConfig::default();
    let tables = load_engine_tables(&config.engine).expect("tables");
    let collaborators = reference_collaborators(&config, Arc::clone(&tables));
    let outcome = size_aircraft(
        &DesignParameters::from_config(&config),
        &IterationSetup::from_config(&config),
        &SolverControls::from_config(&config).expect("controls"),
        &collaborators,
    )
    .expect("baseline converges");

    assert!(outcome.report.converged);
    assert!(outcome.fuel() > 100_000.0 && outcome.fuel() < 150_000.0);
    assert!(outcome.measurements.block_fuel < outcome.fuel());
    let block_nmi = outcome.measurements.block_distance / 1_852.0;
    assert!((block_nmi - 10_500.0).abs() <= 2.0);
}
