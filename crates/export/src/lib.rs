//! Export helpers for sizing histories, run reports, and sweep tables.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod history {
    use std::io::Write;

    use serde::Serialize;
    use sizing_solver::IterationRecord;

    #[derive(Debug, Serialize)]
    struct Row {
        iteration: usize,
        takeoff_kg: f64,
        bow_kg: f64,
        fuel_kg: f64,
        cruise_distance_nmi: f64,
        reserve_cruise_distance_nmi: f64,
        wing_x_m: f64,
        distance_error_nmi: f64,
        reserve_error_nmi: f64,
        weight_error_kg: f64,
        mac_error: f64,
    }

    impl From<&IterationRecord> for Row {
        fn from(record: &IterationRecord) -> Self {
            Self {
                iteration: record.iteration,
                takeoff_kg: record.takeoff,
                bow_kg: record.operating_empty,
                fuel_kg: record.fuel,
                cruise_distance_nmi: record.cruise_distance_nmi,
                reserve_cruise_distance_nmi: record.reserve_cruise_distance_nmi,
                wing_x_m: record.wing_x,
                distance_error_nmi: record.metrics.distance_error_nmi,
                reserve_error_nmi: record.metrics.reserve_error_nmi,
                weight_error_kg: record.metrics.weight_error_kg,
                mac_error: record.metrics.mac_error,
            }
        }
    }

    /// One CSV row per iteration, header included.
    pub fn write_history<W: Write>(writer: W, records: &[IterationRecord]) -> csv::Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in records {
            csv.serialize(Row::from(record))?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub mod report {
    use std::io::{self, Write};

    use chrono::{SecondsFormat, Utc};
    use serde::Serialize;
    use sizing_core::state::IterationState;
    use sizing_core::units::m_to_nmi;
    use sizing_solver::{ConvergenceReport, SizingOutcome};

    #[derive(Debug, Serialize)]
    pub struct FuelBreakdown {
        pub total_kg: f64,
        pub block_kg: f64,
        pub climb_kg: f64,
        pub cruise_kg: f64,
        pub descent_kg: f64,
        pub reserve_kg: f64,
    }

    #[derive(Debug, Serialize)]
    pub struct Geometry {
        pub reference_area_m2: f64,
        pub span_m: f64,
        pub mean_aerodynamic_chord_m: f64,
        pub sea_level_static_thrust_n: f64,
        pub engine_count: u32,
        pub thrust_factor: f64,
        pub sfc_factor: f64,
    }

    /// JSON document describing one converged run.
    #[derive(Debug, Serialize)]
    pub struct RunReport<'a> {
        pub name: &'a str,
        pub generated_at: String,
        pub iterations: usize,
        pub block_distance_nmi: f64,
        pub zero_fuel_kg: f64,
        pub report: &'a ConvergenceReport,
        pub fuel: FuelBreakdown,
        pub geometry: Geometry,
        pub state: &'a IterationState,
        pub surrogate_out_of_range_queries: usize,
    }

    impl<'a> RunReport<'a> {
        pub fn new(name: &'a str, outcome: &'a SizingOutcome) -> Self {
            let measured = &outcome.measurements;
            let vehicle = &outcome.vehicle;
            let total = outcome.fuel();
            Self {
                name,
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                iterations: outcome.iterations,
                block_distance_nmi: m_to_nmi(measured.block_distance),
                zero_fuel_kg: outcome.state.weights.zero_fuel(),
                report: &outcome.report,
                fuel: FuelBreakdown {
                    total_kg: total,
                    block_kg: measured.block_fuel,
                    climb_kg: measured.climb_fuel,
                    cruise_kg: measured.cruise_fuel,
                    descent_kg: measured.descent_fuel,
                    reserve_kg: total - measured.block_fuel,
                },
                geometry: Geometry {
                    reference_area_m2: vehicle.reference_area,
                    span_m: vehicle.span,
                    mean_aerodynamic_chord_m: vehicle.mean_aerodynamic_chord,
                    sea_level_static_thrust_n: vehicle.sea_level_static_thrust,
                    engine_count: vehicle.engine_count,
                    thrust_factor: vehicle.engine.thrust_factor(),
                    sfc_factor: vehicle.engine.sfc_factor(),
                },
                state: &outcome.state,
                surrogate_out_of_range_queries: vehicle.engine.out_of_range_queries(),
            }
        }
    }

    /// Pretty-printed JSON followed by a newline.
    pub fn write_report<W: Write>(mut writer: W, report: &RunReport<'_>) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()
    }
}

pub mod sweep {
    use std::io::Write;

    use serde::Serialize;
    use sizing_core::units::m_to_ft;
    use sizing_solver::SweepPoint;

    #[derive(Debug, Serialize)]
    struct Row<'a> {
        wing_loading_kg_m2: f64,
        altitude_ft: f64,
        thrust_loading: f64,
        fuel_kg: Option<f64>,
        takeoff_kg: Option<f64>,
        iterations: Option<usize>,
        status: &'a str,
    }

    /// One CSV row per grid point; failed points carry empty figures and the failure kind.
    pub fn write_sweep<W: Write>(writer: W, points: &[SweepPoint]) -> csv::Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for point in points {
            let summary = point.outcome.as_ref().ok();
            csv.serialize(Row {
                wing_loading_kg_m2: point.wing_loading,
                altitude_ft: m_to_ft(point.altitude),
                thrust_loading: point.thrust_loading,
                fuel_kg: summary.map(|s| s.fuel),
                takeoff_kg: summary.map(|s| s.takeoff),
                iterations: summary.map(|s| s.iterations),
                status: match &point.outcome {
                    Ok(_) => "converged",
                    Err(err) => err.kind(),
                },
            })?;
        }
        csv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizing_solver::{
        ConfigurationError, ConvergenceMetrics, IterationRecord, SizingError, SweepPoint,
        SweepSummary,
    };

    fn record(iteration: usize) -> IterationRecord {
        IterationRecord {
            iteration,
            takeoff: 280_000.0,
            operating_empty: 131_000.0,
            fuel: 124_500.0,
            cruise_distance_nmi: 9_950.0,
            reserve_cruise_distance_nmi: 98.0,
            wing_x: 22.1,
            metrics: ConvergenceMetrics {
                distance_error_nmi: 1.5,
                reserve_error_nmi: 0.5,
                weight_error_kg: 0.25,
                mac_error: -0.5,
            },
        }
    }

    #[test]
    fn history_has_header_and_one_row_per_iteration() {
        let mut buffer = Vec::new();
        history::write_history(&mut buffer, &[record(1), record(2)]).expect("csv");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("iteration,takeoff_kg,bow_kg,fuel_kg"));
        assert!(lines[0].ends_with("weight_error_kg,mac_error"));
        assert!(lines[2].starts_with("2,280000"));
    }

    #[test]
    fn failed_sweep_points_report_their_kind() {
        let points = vec![
            SweepPoint {
                wing_loading: 700.0,
                altitude: 11_277.6,
                thrust_loading: 0.21,
                outcome: Ok(SweepSummary {
                    fuel: 125_000.0,
                    takeoff: 281_000.0,
                    iterations: 7,
                }),
            },
            SweepPoint {
                wing_loading: 900.0,
                altitude: 11_277.6,
                thrust_loading: 0.23,
                outcome: Err(SizingError::Configuration(ConfigurationError::Invalid(
                    "test".to_string(),
                ))),
            },
        ];
        let mut buffer = Vec::new();
        sweep::write_sweep(&mut buffer, &points).expect("csv");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",7,converged"));
        assert!(lines[2].ends_with(",,,,configuration"));
    }

    #[test]
    fn writer_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/out/history.csv");
        let mut writer = writer_for_path(&path).expect("writer");
        writeln!(writer, "iteration").expect("write");
        drop(writer);
        assert!(path.exists());
    }
}
