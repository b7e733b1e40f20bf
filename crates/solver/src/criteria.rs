//! Convergence criteria of the outer loop.

use serde::Serialize;

/// Tolerance per criterion. Distances in nautical miles, weight in kg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerances {
    pub distance_nmi: f64,
    pub reserve_nmi: f64,
    pub weight_kg: f64,
    pub mac: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            distance_nmi: 2.0,
            reserve_nmi: 1.0,
            weight_kg: 1.0,
            mac: 1.0,
        }
    }
}

/// The four residuals of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergenceMetrics {
    pub distance_error_nmi: f64,
    pub reserve_error_nmi: f64,
    pub weight_error_kg: f64,
    pub mac_error: f64,
}

impl ConvergenceMetrics {
    /// Each residual divided by its tolerance, in declaration order.
    pub fn normalized(&self, tolerances: &Tolerances) -> [f64; 4] {
        [
            self.distance_error_nmi.abs() / tolerances.distance_nmi,
            self.reserve_error_nmi.abs() / tolerances.reserve_nmi,
            self.weight_error_kg.abs() / tolerances.weight_kg,
            self.mac_error.abs() / tolerances.mac,
        ]
    }
}

/// Metrics judged against their tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub metrics: ConvergenceMetrics,
    pub tolerances: Tolerances,
    pub converged: bool,
    /// Largest residual/tolerance ratio; below or at 1 on every criterion means converged.
    pub worst_residual: f64,
}

impl ConvergenceReport {
    pub fn new(metrics: ConvergenceMetrics, tolerances: Tolerances) -> Self {
        let normalized = metrics.normalized(&tolerances);
        let converged = normalized.iter().all(|r| *r <= 1.0);
        // NaN residuals never converge and rank as worst
        let worst_residual = normalized
            .iter()
            .map(|r| if r.is_nan() { f64::INFINITY } else { *r })
            .fold(0.0, f64::max);
        Self {
            metrics,
            tolerances,
            converged,
            worst_residual,
        }
    }

    /// Names of the criteria still outside tolerance.
    pub fn unmet(&self) -> Vec<&'static str> {
        const NAMES: [&str; 4] = ["distance", "reserve", "weight", "mac"];
        self.metrics
            .normalized(&self.tolerances)
            .iter()
            .zip(NAMES)
            .filter(|(r, _)| !(**r <= 1.0))
            .map(|(_, name)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(distance: f64, reserve: f64, weight: f64, mac: f64) -> ConvergenceMetrics {
        ConvergenceMetrics {
            distance_error_nmi: distance,
            reserve_error_nmi: reserve,
            weight_error_kg: weight,
            mac_error: mac,
        }
    }

    #[test]
    fn converged_only_when_every_criterion_holds() {
        let tolerances = Tolerances::default();
        assert!(ConvergenceReport::new(metrics(1.9, 0.5, 0.9, -0.4), tolerances).converged);

        let report = ConvergenceReport::new(metrics(1.9, 0.5, 1.5, 0.0), tolerances);
        assert!(!report.converged);
        assert_eq!(report.unmet(), vec!["weight"]);
        assert!((report.worst_residual - 1.5).abs() < 1e-12);
    }

    #[test]
    fn nan_metric_is_never_converged() {
        let report = ConvergenceReport::new(metrics(0.0, 0.0, f64::NAN, 0.0), Tolerances::default());
        assert!(!report.converged);
        assert!(report.worst_residual.is_infinite());
    }
}
