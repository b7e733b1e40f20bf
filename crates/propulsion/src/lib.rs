//! Engine performance surrogate used by the sizing loop.
//!
//! Reference engine-deck tables are resampled onto regular grids once, then queried
//! through a clamped multilinear interpolator. Each sizing run calibrates its own
//! [`TurbofanSurrogate`] to the design point; the underlying [`SurrogateTables`] are
//! immutable and may be shared across threads.

pub mod interpolation;
pub mod surrogate;

pub use surrogate::{
    Calibration, DEFAULT_BUCKET_SFC, ReferenceData, SurrogateError, SurrogateTables,
    TurbofanSurrogate, reference_sfc_per_hour,
};
