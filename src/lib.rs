//! Aircraft sizing: iterate a vehicle and its design mission until fuel, weights,
//! distances and balance agree.
//!
//! The work is split across the workspace crates re-exported here so front-ends
//! can depend on a single library.

pub use sizing_config as config;
pub use sizing_core as core;
pub use sizing_export as export;
pub use sizing_mission as mission;
pub use sizing_propulsion as propulsion;
pub use sizing_solver as solver;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
