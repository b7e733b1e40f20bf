//! Interpolated turbofan performance map calibrated to a design point.
//!
//! The reference tables are expressed in the units the engine deck ships with
//! (feet, pound-force, per-hour consumption). The public API is SI: altitude in
//! metres, thrust in newtons, specific fuel consumption in 1/s such that
//! `fuel_flow = throttle * max_thrust / g0 * sfc`.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use sizing_core::atmosphere::standard_atmosphere;
use sizing_core::constants::{G0, SECONDS_PER_HOUR};
use sizing_core::units::{ft_to_m, lbf_to_n, m_to_ft};
use thiserror::Error;
use tracing::{debug, trace};

use crate::interpolation::{
    GridSample, InterpolationError, RegularGrid, linear_extrapolate, linspace, quadratic_resample,
    unique_sorted,
};

const BUNDLED_MAX_THRUST: &str = include_str!("../data/maxthrust.csv");
const BUNDLED_TSFC: &str = include_str!("../data/tsfc.csv");

const THRUST_MACH_GRID_MAX: f64 = 0.9;
const THRUST_MACH_GRID_POINTS: usize = 20;
const THROTTLE_GRID_POINTS: usize = 20;

/// Bucket SFC (lb/lbf/h) of the reference engine family.
pub const DEFAULT_BUCKET_SFC: f64 = 0.533_981;
const SFC_REFERENCE_ALTITUDE_FT: f64 = 36_000.0;
const SFC_REFERENCE_MACH: f64 = 0.82;
const INITIAL_CRUISE_ALTITUDE_OFFSET_FT: f64 = 2_000.0;
const TOP_OF_CLIMB_RATE_FT_MIN: f64 = 300.0;

/// Errors raised while loading reference data or calibrating the surrogate.
#[derive(Debug, Error)]
pub enum SurrogateError {
    #[error("failed to read reference table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse reference table: {0}")]
    Csv(#[from] csv::Error),
    #[error("reference table '{0}' is empty")]
    EmptyTable(&'static str),
    #[error("thrust table needs three distinct Mach samples at {altitude_ft} ft (found {found})")]
    SparseThrustRow { altitude_ft: f64, found: usize },
    #[error(
        "sfc table needs two distinct thrust samples at {altitude_ft} ft, Mach {mach} (found {found})"
    )]
    SparseSfcCell {
        altitude_ft: f64,
        mach: f64,
        found: usize,
    },
    #[error("reference grid could not be assembled from the tables: {0}")]
    Interpolation(#[from] InterpolationError),
    #[error("cannot calibrate: surrogate {quantity} is {value} at the reference point")]
    DegenerateCalibration { quantity: &'static str, value: f64 },
}

#[derive(Debug, Clone, Deserialize)]
struct ThrustRecord {
    altitude_ft: f64,
    mach: f64,
    thrust_lbf: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct TsfcRecord {
    altitude_ft: f64,
    mach: f64,
    thrust_lbf: f64,
    tsfc_per_hour: f64,
}

/// Raw engine deck rows.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    thrust: Vec<ThrustRecord>,
    tsfc: Vec<TsfcRecord>,
}

impl ReferenceData {
    /// The engine deck compiled into the crate.
    pub fn bundled() -> Result<Self, SurrogateError> {
        Self::from_readers(BUNDLED_MAX_THRUST.as_bytes(), BUNDLED_TSFC.as_bytes())
    }

    /// Load `altitude_ft,mach,thrust_lbf` and `altitude_ft,mach,thrust_lbf,tsfc_per_hour` CSVs.
    pub fn from_paths<P: AsRef<Path>>(max_thrust: P, tsfc: P) -> Result<Self, SurrogateError> {
        Self::from_readers(File::open(max_thrust)?, File::open(tsfc)?)
    }

    pub fn from_readers<R1: Read, R2: Read>(
        max_thrust: R1,
        tsfc: R2,
    ) -> Result<Self, SurrogateError> {
        let thrust = csv::Reader::from_reader(max_thrust)
            .deserialize()
            .collect::<Result<Vec<ThrustRecord>, _>>()?;
        let tsfc = csv::Reader::from_reader(tsfc)
            .deserialize()
            .collect::<Result<Vec<TsfcRecord>, _>>()?;
        if thrust.is_empty() {
            return Err(SurrogateError::EmptyTable("max thrust"));
        }
        if tsfc.is_empty() {
            return Err(SurrogateError::EmptyTable("tsfc"));
        }
        Ok(Self { thrust, tsfc })
    }
}

/// Immutable lookup grids built once from the reference data.
///
/// Shared between sizing runs behind an [`Arc`]; calibration lives on
/// [`TurbofanSurrogate`].
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateTables {
    /// (altitude ft, Mach) → max thrust lbf.
    max_thrust: RegularGrid<2>,
    /// (Mach, throttle, altitude ft) → TSFC per hour.
    tsfc: RegularGrid<3>,
}

impl SurrogateTables {
    pub fn build(data: &ReferenceData) -> Result<Self, SurrogateError> {
        let max_thrust = build_thrust_grid(&data.thrust)?;
        let tsfc = build_tsfc_grid(&data.tsfc, &max_thrust)?;
        Ok(Self { max_thrust, tsfc })
    }

    /// Tables built from the bundled engine deck.
    pub fn bundled() -> Result<Arc<Self>, SurrogateError> {
        Ok(Arc::new(Self::build(&ReferenceData::bundled()?)?))
    }

    /// Uncalibrated maximum thrust (lbf) at `altitude_ft`, `mach`.
    pub fn raw_max_thrust_lbf(&self, altitude_ft: f64, mach: f64) -> GridSample {
        self.max_thrust.sample(&[altitude_ft, mach])
    }

    /// Uncalibrated TSFC (per hour).
    pub fn raw_tsfc_per_hour(&self, altitude_ft: f64, mach: f64, throttle: f64) -> GridSample {
        self.tsfc.sample(&[mach, throttle, altitude_ft])
    }

    /// Altitude envelope of the thrust grid (ft).
    pub fn altitude_bounds_ft(&self) -> (f64, f64) {
        self.max_thrust.bounds(0)
    }

    /// Mach envelope of the thrust grid.
    pub fn mach_bounds(&self) -> (f64, f64) {
        self.max_thrust.bounds(1)
    }
}

fn build_thrust_grid(records: &[ThrustRecord]) -> Result<RegularGrid<2>, SurrogateError> {
    let altitudes = unique_sorted(records.iter().map(|r| r.altitude_ft));
    let mach_grid = linspace(0.0, THRUST_MACH_GRID_MAX, THRUST_MACH_GRID_POINTS);

    let mut values = Vec::with_capacity(altitudes.len() * mach_grid.len());
    for &altitude in &altitudes {
        let mut row: Vec<(f64, f64)> = records
            .iter()
            .filter(|r| r.altitude_ft == altitude)
            .map(|r| (r.mach, r.thrust_lbf))
            .collect();
        row.sort_by(|a, b| a.0.total_cmp(&b.0));
        row.dedup_by(|a, b| a.0 == b.0);
        if row.len() < 3 {
            return Err(SurrogateError::SparseThrustRow {
                altitude_ft: altitude,
                found: row.len(),
            });
        }
        let (machs, thrusts): (Vec<f64>, Vec<f64>) = row.into_iter().unzip();
        values.extend(quadratic_resample(&machs, &thrusts, &mach_grid)?);
    }

    Ok(RegularGrid::new([altitudes, mach_grid], values)?)
}

fn build_tsfc_grid(
    records: &[TsfcRecord],
    max_thrust: &RegularGrid<2>,
) -> Result<RegularGrid<3>, SurrogateError> {
    let altitudes = unique_sorted(records.iter().map(|r| r.altitude_ft));
    let machs = unique_sorted(records.iter().map(|r| r.mach));
    let throttles = linspace(0.0, 1.0, THROTTLE_GRID_POINTS);

    let (n_mach, n_throttle, n_alt) = (machs.len(), throttles.len(), altitudes.len());
    let mut values = vec![0.0; n_mach * n_throttle * n_alt];

    for (i, &altitude) in altitudes.iter().enumerate() {
        let at_altitude: Vec<&TsfcRecord> =
            records.iter().filter(|r| r.altitude_ft == altitude).collect();
        let (mach_lo, mach_hi) = at_altitude
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.mach), hi.max(r.mach))
            });

        for (j, &mach) in machs.iter().enumerate() {
            let mach = mach.clamp(mach_lo, mach_hi);
            let max_thrust_lbf = max_thrust.sample(&[altitude, mach]).value;

            let mut cell: Vec<(f64, f64)> = at_altitude
                .iter()
                .filter(|r| r.mach == mach)
                .map(|r| (r.thrust_lbf, r.tsfc_per_hour))
                .collect();
            cell.sort_by(|a, b| a.0.total_cmp(&b.0));
            cell.dedup_by(|a, b| a.0 == b.0);
            if cell.len() < 2 {
                return Err(SurrogateError::SparseSfcCell {
                    altitude_ft: altitude,
                    mach,
                    found: cell.len(),
                });
            }
            let (thrusts, tsfcs): (Vec<f64>, Vec<f64>) = cell.into_iter().unzip();

            for (k, &throttle) in throttles.iter().enumerate() {
                let index = (j * n_throttle + k) * n_alt + i;
                values[index] = linear_extrapolate(&thrusts, &tsfcs, throttle * max_thrust_lbf)?;
            }
        }
    }

    Ok(RegularGrid::new([machs, throttles, altitudes], values)?)
}

/// Reference TSFC (lb/lbf/h) at a design cruise point, adjusted from the bucket value.
pub fn reference_sfc_per_hour(design_altitude_m: f64, design_mach: f64, bucket_sfc: f64) -> f64 {
    let altitude_ft = m_to_ft(design_altitude_m);
    let offset_kft = (altitude_ft - SFC_REFERENCE_ALTITUDE_FT).abs() / 1_000.0;
    let altitude_penalty = if altitude_ft < SFC_REFERENCE_ALTITUDE_FT {
        0.003
    } else {
        0.002
    };
    (1.0 + altitude_penalty * offset_kft) * bucket_sfc
        + 0.006 * (design_mach - SFC_REFERENCE_MACH) / 0.01
}

/// Calibration factors derived for one design point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub thrust_factor: f64,
    pub sfc_factor: f64,
    /// Reference SFC the surrogate now reproduces at the design point (1/s).
    pub reference_sfc: f64,
}

/// Per-engine surrogate: shared tables plus this run's calibration.
#[derive(Debug)]
pub struct TurbofanSurrogate {
    tables: Arc<SurrogateTables>,
    thrust_factor: f64,
    sfc_factor: f64,
    out_of_range: AtomicUsize,
}

impl Clone for TurbofanSurrogate {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            thrust_factor: self.thrust_factor,
            sfc_factor: self.sfc_factor,
            out_of_range: AtomicUsize::new(self.out_of_range.load(Ordering::Relaxed)),
        }
    }
}

impl TurbofanSurrogate {
    /// Uncalibrated surrogate (both factors 1).
    pub fn new(tables: Arc<SurrogateTables>) -> Self {
        Self {
            tables,
            thrust_factor: 1.0,
            sfc_factor: 1.0,
            out_of_range: AtomicUsize::new(0),
        }
    }

    pub fn tables(&self) -> &Arc<SurrogateTables> {
        &self.tables
    }

    pub fn thrust_factor(&self) -> f64 {
        self.thrust_factor
    }

    pub fn sfc_factor(&self) -> f64 {
        self.sfc_factor
    }

    /// Number of queries answered from a clamped boundary value so far.
    pub fn out_of_range_queries(&self) -> usize {
        self.out_of_range.load(Ordering::Relaxed)
    }

    fn note(&self, sample: GridSample, what: &str, point: &[f64]) -> f64 {
        if sample.clamped {
            self.out_of_range.fetch_add(1, Ordering::Relaxed);
            trace!(query = what, ?point, "surrogate query clamped to table boundary");
        }
        sample.value
    }

    /// Uncalibrated maximum thrust (N).
    pub fn raw_max_thrust(&self, altitude_m: f64, mach: f64) -> f64 {
        let altitude_ft = m_to_ft(altitude_m);
        let sample = self.tables.raw_max_thrust_lbf(altitude_ft, mach);
        lbf_to_n(self.note(sample, "max_thrust", &[altitude_ft, mach]))
    }

    /// Uncalibrated specific fuel consumption (1/s).
    pub fn raw_specific_fuel_consumption(&self, altitude_m: f64, mach: f64, throttle: f64) -> f64 {
        let altitude_ft = m_to_ft(altitude_m);
        let sample = self.tables.raw_tsfc_per_hour(altitude_ft, mach, throttle);
        self.note(sample, "sfc", &[altitude_ft, mach, throttle]) / SECONDS_PER_HOUR
    }

    /// Calibrated maximum available thrust per engine (N).
    pub fn max_thrust(&self, altitude_m: f64, mach: f64) -> f64 {
        self.raw_max_thrust(altitude_m, mach) * self.thrust_factor
    }

    /// Calibrated specific fuel consumption (1/s).
    pub fn specific_fuel_consumption(&self, altitude_m: f64, mach: f64, throttle: f64) -> f64 {
        self.raw_specific_fuel_consumption(altitude_m, mach, throttle) * self.sfc_factor
    }

    /// Fuel mass flow per engine (kg/s) at the given throttle setting.
    pub fn fuel_flow(&self, altitude_m: f64, mach: f64, throttle: f64) -> f64 {
        throttle * self.max_thrust(altitude_m, mach) / G0
            * self.specific_fuel_consumption(altitude_m, mach, throttle)
    }

    /// Calibrate so that sea-level static thrust equals `sea_level_static_thrust` (N, per
    /// engine) and the SFC at the design cruise point equals the adjusted bucket value.
    pub fn scale_factors(
        &mut self,
        design_altitude_m: f64,
        design_mach: f64,
        sea_level_static_thrust: f64,
        throttle_mid_cruise: f64,
        bucket_sfc: f64,
    ) -> Result<Calibration, SurrogateError> {
        self.thrust_factor = 1.0;
        self.sfc_factor = 1.0;

        let raw_static = self.raw_max_thrust(0.0, 0.0);
        if !(raw_static.is_finite() && raw_static > 0.0) {
            return Err(SurrogateError::DegenerateCalibration {
                quantity: "sea-level static thrust",
                value: raw_static,
            });
        }

        let reference_sfc =
            reference_sfc_per_hour(design_altitude_m, design_mach, bucket_sfc) / SECONDS_PER_HOUR;
        let raw_sfc =
            self.raw_specific_fuel_consumption(design_altitude_m, design_mach, throttle_mid_cruise);
        if !(raw_sfc.is_finite() && raw_sfc > 0.0) {
            return Err(SurrogateError::DegenerateCalibration {
                quantity: "specific fuel consumption",
                value: raw_sfc,
            });
        }

        self.thrust_factor = sea_level_static_thrust / raw_static;
        self.sfc_factor = reference_sfc / raw_sfc;
        debug!(
            thrust_factor = self.thrust_factor,
            sfc_factor = self.sfc_factor,
            "surrogate calibrated"
        );

        Ok(Calibration {
            thrust_factor: self.thrust_factor,
            sfc_factor: self.sfc_factor,
            reference_sfc,
        })
    }

    /// Thrust-to-weight needed to keep climbing at 300 ft/min at the initial cruise
    /// altitude (design altitude − 2000 ft), expressed at sea-level static conditions.
    pub fn thrust_loading_requirement_toc(
        &self,
        design_altitude_m: f64,
        design_mach: f64,
        m4_m0: f64,
        lift_to_drag_initial_cruise: f64,
    ) -> f64 {
        let altitude = design_altitude_m - ft_to_m(INITIAL_CRUISE_ALTITUDE_OFFSET_FT);
        let climb_rate = ft_to_m(TOP_OF_CLIMB_RATE_FT_MIN) / 60.0;
        let true_air_speed = design_mach * standard_atmosphere(altitude).speed_of_sound_m_s;
        let thrust_ratio = self.raw_max_thrust(0.0, 0.0) / self.raw_max_thrust(altitude, design_mach);
        m4_m0 * (climb_rate / true_air_speed + 1.0 / lift_to_drag_initial_cruise) * thrust_ratio
    }
}
