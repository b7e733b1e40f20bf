use std::time::Duration;

use crate::cg::MacTargeting;
use crate::criteria::Tolerances;
use crate::error::ConfigurationError;
use crate::weight::RelaxationGains;

/// Termination policy and balancer tuning for one sizing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverControls {
    pub max_iterations: usize,
    pub max_wall_time: Option<Duration>,
    /// Consecutive growths of the worst normalized residual treated as divergence.
    pub divergence_window: usize,
    pub tolerances: Tolerances,
    pub gains: RelaxationGains,
    pub mac: MacTargeting,
}

impl Default for SolverControls {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_wall_time: None,
            divergence_window: 6,
            tolerances: Tolerances::default(),
            gains: RelaxationGains::default(),
            mac: MacTargeting::default(),
        }
    }
}

impl SolverControls {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_iterations == 0 {
            return Err(ConfigurationError::Invalid(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.divergence_window < 2 {
            return Err(ConfigurationError::Invalid(format!(
                "divergence_window must be at least 2 (got {})",
                self.divergence_window
            )));
        }
        let t = &self.tolerances;
        for (name, value) in [
            ("distance", t.distance_nmi),
            ("reserve", t.reserve_nmi),
            ("weight", t.weight_kg),
            ("mac", t.mac),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::Invalid(format!(
                    "{name} tolerance must be positive (got {value})"
                )));
            }
        }
        Ok(())
    }
}

/// Tracks consecutive increases of the worst normalized residual.
#[derive(Debug, Clone)]
pub(crate) struct DivergenceGuard {
    window: usize,
    previous: Option<f64>,
    rising: usize,
}

impl DivergenceGuard {
    pub(crate) fn new(window: usize) -> Self {
        Self {
            window,
            previous: None,
            rising: 0,
        }
    }

    /// Returns `true` once the residual has grown `window` times in a row.
    pub(crate) fn observe(&mut self, residual: f64) -> bool {
        if let Some(previous) = self.previous {
            if residual > previous {
                self.rising += 1;
            } else {
                self.rising = 0;
            }
        }
        self.previous = Some(residual);
        self.rising >= self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_trips_after_window_of_growth() {
        let mut guard = DivergenceGuard::new(3);
        assert!(!guard.observe(1.0));
        assert!(!guard.observe(2.0));
        assert!(!guard.observe(3.0));
        assert!(!guard.observe(2.5));
        assert!(!guard.observe(4.0));
        assert!(!guard.observe(5.0));
        assert!(guard.observe(6.0));
    }

    #[test]
    fn zero_iteration_cap_is_rejected() {
        let controls = SolverControls {
            max_iterations: 0,
            ..SolverControls::default()
        };
        assert!(matches!(
            controls.validate(),
            Err(ConfigurationError::Invalid(_))
        ));
    }
}
