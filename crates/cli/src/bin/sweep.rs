use std::path::PathBuf;
use std::sync::Arc;

use aircraft_sizing::config::load_sweep_config;
use aircraft_sizing::core::units::ft_to_m;
use aircraft_sizing::export::{sweep::write_sweep, writer_for_path};
use aircraft_sizing::solver::{
    DesignParameters, IterationSetup, SolverControls, SweepGrid, load_engine_tables,
    reference_collaborators, sweep,
};
use anyhow::Context;
use clap::Parser;

#[path = "shared/logging.rs"]
mod logging;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Size aircraft across a wing-loading × cruise-altitude grid"
)]
struct Cli {
    /// Sweep configuration (TOML or YAML)
    #[arg(long, default_value = "configs/sweep.yaml")]
    config: PathBuf,

    /// Output CSV path ("-" for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Override the worker thread count from the configuration
    #[arg(long)]
    threads: Option<usize>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let config = load_sweep_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let base = &config.base;

    let grid = SweepGrid {
        wing_loadings: config.wing_loadings_kg_m2.clone(),
        altitudes: config.altitudes_ft.iter().copied().map(ft_to_m).collect(),
        m4_m0: config.m4_m0,
        lift_to_drag: config.lift_to_drag,
        threads: cli.threads.or(config.threads),
    };
    let parameters = DesignParameters::from_config(base);
    let setup = IterationSetup::from_config(base);
    let controls = SolverControls::from_config(base)?;
    let tables = load_engine_tables(&base.engine)?;

    let points = sweep(&grid, &parameters, &setup, &controls, &tables, || {
        reference_collaborators(base, Arc::clone(&tables))
    });

    let writer = writer_for_path(&cli.output)?;
    write_sweep(writer, &points)?;

    let converged = points.iter().filter(|p| p.outcome.is_ok()).count();
    if cli.output.as_os_str() != "-" {
        println!(
            "Sized {converged}/{} grid points; table written to {}",
            points.len(),
            cli.output.display()
        );
    }
    Ok(())
}
