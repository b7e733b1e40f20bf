//! Outer sizing loop and the balancers it folds together each iteration.
//!
//! Every iteration rebuilds the vehicle and mission from an [`IterationState`], flies it,
//! and derives the next state from three independent balancers:
//!
//! * [`distance`] sets cruise lengths so the block and reserve distances close;
//! * [`weight`] sets the fuel load and relaxes the operating-empty target;
//! * [`cg`] slides the wing toward the target percent-MAC.
//!
//! The loop stops when all four residuals sit inside their [`Tolerances`], or reports
//! why it could not get there.
//!
//! [`IterationState`]: sizing_core::state::IterationState

pub mod cg;
pub mod controls;
pub mod criteria;
pub mod distance;
pub mod error;
pub mod setup;
pub mod sizing;
pub mod sweep;
pub mod weight;

pub use cg::{CgUpdate, MacReferencePolicy, MacTargeting, target_wing_position};
pub use controls::SolverControls;
pub use criteria::{ConvergenceMetrics, ConvergenceReport, Tolerances};
pub use distance::{DistanceUpdate, balance_distances};
pub use error::{ConfigurationError, SizingError};
pub use setup::{
    DesignParameters, IterationSetup, ReferenceCollaborators, load_engine_tables,
    reference_collaborators, size_aircraft,
};
pub use sizing::{
    Collaborators, IterationOutput, IterationRecord, SizingOutcome, run_single_iteration, size,
};
pub use sweep::{SweepGrid, SweepPoint, SweepSummary, sweep};
pub use weight::{RelaxationGains, WeightUpdate, balance_weights};
