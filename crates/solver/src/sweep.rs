//! Independent sizing runs over a wing-loading × cruise-altitude grid.

use std::sync::Arc;
use std::thread;

use sizing_mission::{MissionBuilder, MissionEvaluator, VehicleBuilder};
use sizing_propulsion::{SurrogateTables, TurbofanSurrogate};
use tracing::{info, warn};

use crate::controls::SolverControls;
use crate::error::SizingError;
use crate::setup::{DesignParameters, IterationSetup, size_aircraft};
use crate::sizing::Collaborators;

/// Grid axes (SI) and the top-of-climb assumptions used to pick thrust loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    pub wing_loadings: Vec<f64>,
    pub altitudes: Vec<f64>,
    pub m4_m0: f64,
    pub lift_to_drag: f64,
    /// Worker threads; defaults to the available parallelism.
    pub threads: Option<usize>,
}

impl SweepGrid {
    pub fn len(&self) -> usize {
        self.wing_loadings.len() * self.altitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid points in wing-loading-major order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.wing_loadings
            .iter()
            .flat_map(|&w| self.altitudes.iter().map(move |&h| (w, h)))
            .collect()
    }
}

/// Converged figures of one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSummary {
    pub fuel: f64,
    pub takeoff: f64,
    pub iterations: usize,
}

#[derive(Debug)]
pub struct SweepPoint {
    pub wing_loading: f64,
    pub altitude: f64,
    pub thrust_loading: f64,
    pub outcome: Result<SweepSummary, SizingError>,
}

/// Size every grid point. Each run builds its own collaborators through `factory`
/// (and so owns its engine calibration) while reading the shared `tables`.
///
/// Failures are kept per point; the returned points follow [`SweepGrid::points`] order.
pub fn sweep<F, V, M, E>(
    grid: &SweepGrid,
    base: &DesignParameters,
    setup: &IterationSetup,
    controls: &SolverControls,
    tables: &Arc<SurrogateTables>,
    factory: F,
) -> Vec<SweepPoint>
where
    F: Fn() -> Collaborators<V, M, E> + Sync,
    V: VehicleBuilder,
    M: MissionBuilder,
    E: MissionEvaluator,
{
    let points = grid.points();
    if points.is_empty() {
        return Vec::new();
    }
    let workers = grid
        .threads
        .or_else(|| thread::available_parallelism().ok().map(usize::from))
        .unwrap_or(1)
        .clamp(1, points.len());
    let chunk = points.len().div_ceil(workers);
    info!(points = points.len(), workers, "starting sweep");

    let run_point = |(wing_loading, altitude): (f64, f64)| {
        let engine = TurbofanSurrogate::new(Arc::clone(tables));
        let thrust_loading = engine.thrust_loading_requirement_toc(
            altitude,
            base.design_cruise_mach,
            grid.m4_m0,
            grid.lift_to_drag,
        );
        let parameters = DesignParameters {
            wing_loading,
            design_cruise_altitude: altitude,
            thrust_loading,
            ..*base
        };
        let collaborators = factory();
        let outcome = size_aircraft(&parameters, setup, controls, &collaborators).map(|o| {
            SweepSummary {
                fuel: o.fuel(),
                takeoff: o.state.weights.takeoff,
                iterations: o.iterations,
            }
        });
        if let Err(err) = &outcome {
            warn!(wing_loading, altitude, error = %err, "sweep point failed");
        }
        SweepPoint {
            wing_loading,
            altitude,
            thrust_loading,
            outcome,
        }
    };

    thread::scope(|scope| {
        let handles: Vec<_> = points
            .chunks(chunk)
            .map(|slice| {
                let run_point = &run_point;
                scope.spawn(move || slice.iter().copied().map(run_point).collect::<Vec<_>>())
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(results) => results,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
