use std::path::PathBuf;

use aircraft_sizing::config::load_sizing_config;
use aircraft_sizing::core::units::m_to_nmi;
use aircraft_sizing::export::{history::write_history, report, writer_for_path};
use aircraft_sizing::solver::{
    ConvergenceReport, DesignParameters, IterationSetup, SizingError, SizingOutcome,
    SolverControls, load_engine_tables, reference_collaborators, size_aircraft,
};
use anyhow::Context;
use clap::Parser;

#[path = "shared/logging.rs"]
mod logging;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Size one aircraft until fuel, weights, distances and CG agree"
)]
struct Cli {
    /// Run configuration (TOML or YAML)
    #[arg(long, default_value = "configs/baseline.toml")]
    config: PathBuf,

    /// Write the per-iteration history as CSV ("-" for stdout)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Write the converged run as JSON ("-" for stdout)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Override controls.max_iterations from the configuration
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let mut config = load_sizing_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(max_iterations) = cli.max_iterations {
        config.controls.max_iterations = max_iterations;
    }

    let parameters = DesignParameters::from_config(&config);
    let setup = IterationSetup::from_config(&config);
    let controls = SolverControls::from_config(&config)?;
    let tables = load_engine_tables(&config.engine)?;
    let collaborators = reference_collaborators(&config, tables);

    let outcome = match size_aircraft(&parameters, &setup, &controls, &collaborators) {
        Ok(outcome) => outcome,
        Err(err) => {
            report_failure(&err);
            return Err(err.into());
        }
    };

    print_summary(&config.name, &outcome);

    if let Some(path) = &cli.history {
        let writer = writer_for_path(path)?;
        write_history(writer, &outcome.history)?;
        if path.as_os_str() != "-" {
            println!("History written to {}", path.display());
        }
    }
    if let Some(path) = &cli.report {
        let writer = writer_for_path(path)?;
        report::write_report(writer, &report::RunReport::new(&config.name, &outcome))?;
        if path.as_os_str() != "-" {
            println!("Report written to {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(name: &str, outcome: &SizingOutcome) {
    let measured = &outcome.measurements;
    let vehicle = &outcome.vehicle;
    let weights = &outcome.state.weights;
    let fuel = outcome.fuel();

    println!("{name}: converged after {} iterations", outcome.iterations);
    println!("  Takeoff mass     : {:.0} kg", weights.takeoff);
    println!("  Operating empty  : {:.0} kg", weights.operating_empty);
    println!("  Payload          : {:.0} kg", weights.design_payload);
    println!("  Zero fuel        : {:.0} kg", weights.zero_fuel());
    println!("  Fuel             : {:.0} kg", fuel);
    println!("    climb          : {:.0} kg", measured.climb_fuel);
    println!("    cruise         : {:.0} kg", measured.cruise_fuel);
    println!("    descent        : {:.0} kg", measured.descent_fuel);
    println!("    reserve        : {:.0} kg", fuel - measured.block_fuel);
    println!(
        "  Block distance   : {:.1} nmi",
        m_to_nmi(measured.block_distance)
    );
    println!("  Wing area        : {:.1} m²", vehicle.reference_area);
    println!("  Span             : {:.2} m", vehicle.span);
    println!("  MAC              : {:.3} m", vehicle.mean_aerodynamic_chord);
    println!(
        "  Static thrust    : {:.1} kN ({} engines)",
        vehicle.sea_level_static_thrust / 1_000.0,
        vehicle.engine_count
    );
    print_metrics(&outcome.report);
}

fn print_metrics(report: &ConvergenceReport) {
    let m = &report.metrics;
    println!("  Residuals:");
    println!("    distance       : {:+.3} nmi", m.distance_error_nmi);
    println!("    reserve        : {:+.3} nmi", m.reserve_error_nmi);
    println!("    weight         : {:+.3} kg", m.weight_error_kg);
    println!("    MAC            : {:+.3}", m.mac_error);
}

fn report_failure(err: &SizingError) {
    let Some(report) = err.last_report() else {
        return;
    };
    eprintln!("Sizing stopped ({}). Last iteration:", err.kind());
    if let Some(state) = err.last_state() {
        eprintln!(
            "  takeoff {:.0} kg, fuel {:.0} kg, wing x {:.3} m",
            state.weights.takeoff, state.weights.fuel, state.sizing.wing_origin[0]
        );
    }
    let m = &report.metrics;
    eprintln!(
        "  distance {:+.3} nmi, reserve {:+.3} nmi, weight {:+.3} kg, MAC {:+.3}",
        m.distance_error_nmi, m.reserve_error_nmi, m.weight_error_kg, m.mac_error
    );
    eprintln!("  unmet: {}", report.unmet().join(", "));
}
