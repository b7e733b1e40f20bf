use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

fn repo_config(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs")
        .join(name)
}

#[test]
fn size_help_lists_options() {
    Command::cargo_bin("size")
        .expect("size bin")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--max-iterations"));
}

#[test]
fn size_fails_on_missing_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("size")
        .expect("size bin")
        .args(["--config", dir.path().join("absent.toml").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn size_rejects_zero_iteration_cap() {
    Command::cargo_bin("size")
        .expect("size bin")
        .args([
            "--config",
            repo_config("baseline.toml").to_str().unwrap(),
            "--max-iterations",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_iterations"));
}

#[test]
fn size_reports_last_metrics_when_capped() {
    Command::cargo_bin("size")
        .expect("size bin")
        .args([
            "--config",
            repo_config("baseline.toml").to_str().unwrap(),
            "--max-iterations",
            "2",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no convergence after 2 iterations"))
        .stderr(predicate::str::contains("non_convergence"));
}

#[test]
fn size_converges_baseline_and_writes_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let history = dir.path().join("history.csv");
    let report = dir.path().join("out/report.json");

    Command::cargo_bin("size")
        .expect("size bin")
        .args([
            "--config",
            repo_config("baseline.toml").to_str().unwrap(),
            "--history",
            history.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("converged after"))
        .stdout(predicate::str::contains("Fuel"));

    let text = fs::read_to_string(&history).expect("history");
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("iteration,takeoff_kg"));
    assert!(lines.count() >= 2);

    let json = fs::read_to_string(&report).expect("report");
    assert!(json.contains("\"name\": \"baseline\""));
    assert!(json.contains("\"converged\": true"));
    assert!(json.contains("\"zero_fuel_kg\""));
}

#[test]
fn sweep_writes_one_row_per_grid_point() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("sweep.yaml");
    let output = dir.path().join("sweep.csv");
    let mut file = File::create(&config).expect("config");
    writeln!(
        file,
        "wing_loadings_kg_m2: [700.0]\naltitudes_ft: [35000.0, 37000.0]\nthreads: 2\nbase:\n  controls:\n    max_iterations: 80"
    )
    .unwrap();

    Command::cargo_bin("sweep")
        .expect("sweep bin")
        .args([
            "--config",
            config.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("grid points"));

    let text = fs::read_to_string(&output).expect("sweep csv");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("wing_loading_kg_m2,altitude_ft,thrust_loading"));
    assert!(lines[1].starts_with("700.0,"));
}
