//! Core units, constants, and shared primitives for the aircraft sizing workspace.

pub mod atmosphere;
pub mod state;

pub use state::{IterationState, MissionState, SizingState, WeightState};

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Metres per foot.
    pub const FOOT_M: f64 = 0.3048;
    /// Metres per international nautical mile.
    pub const NAUTICAL_MILE_M: f64 = 1_852.0;
    /// Newtons per pound-force.
    pub const LBF_N: f64 = 4.448_221_615_260_5;
    /// Metres per second per knot.
    pub const KNOT_M_S: f64 = NAUTICAL_MILE_M / 3_600.0;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{FOOT_M, KNOT_M_S, LBF_N, NAUTICAL_MILE_M};

    /// Convert feet to metres.
    #[inline]
    pub fn ft_to_m(v: f64) -> f64 {
        v * FOOT_M
    }

    /// Convert metres to feet.
    #[inline]
    pub fn m_to_ft(v: f64) -> f64 {
        v / FOOT_M
    }

    /// Convert nautical miles to metres.
    #[inline]
    pub fn nmi_to_m(v: f64) -> f64 {
        v * NAUTICAL_MILE_M
    }

    /// Convert metres to nautical miles.
    #[inline]
    pub fn m_to_nmi(v: f64) -> f64 {
        v / NAUTICAL_MILE_M
    }

    /// Convert pound-force to newtons.
    #[inline]
    pub fn lbf_to_n(v: f64) -> f64 {
        v * LBF_N
    }

    /// Convert knots to metres per second.
    #[inline]
    pub fn kts_to_ms(v: f64) -> f64 {
        v * KNOT_M_S
    }

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    /// Convert minutes to seconds.
    #[inline]
    pub fn minutes_to_seconds(minutes: f64) -> f64 {
        minutes * 60.0
    }
}
