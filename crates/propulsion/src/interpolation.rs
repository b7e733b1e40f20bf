//! One-dimensional curve fits and a clamped multilinear regular-grid interpolator.

use thiserror::Error;

/// Shape problems in the samples handed to a fit or a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("need at least {needed} samples, found {found}")]
    TooFewSamples { needed: usize, found: usize },
    #[error("{xs} abscissae but {ys} ordinates")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("axis {axis} is empty or not strictly increasing")]
    UnsortedAxis { axis: usize },
    #[error("grid expects {expected} values, found {found}")]
    ValueCount { expected: usize, found: usize },
    #[error("spline collocation system is singular")]
    SingularSystem,
}

/// `n` evenly spaced samples from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Sorted, deduplicated copy of `values` (exact comparison).
pub fn unique_sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

fn check_samples(xs: &[f64], ys: &[f64], needed: usize) -> Result<(), InterpolationError> {
    if xs.len() != ys.len() {
        return Err(InterpolationError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < needed {
        return Err(InterpolationError::TooFewSamples {
            needed,
            found: xs.len(),
        });
    }
    if !xs.windows(2).all(|w| w[0] < w[1]) {
        return Err(InterpolationError::UnsortedAxis { axis: 0 });
    }
    Ok(())
}

/// Index of the interval `[xs[i], xs[i + 1]]` used for `x`, clamped to the end intervals.
fn bracket(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&v| v <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

/// Interpolating quadratic B-spline.
///
/// The interior knots sit at the midpoints between samples, except the first and
/// last midpoints which are dropped (not-a-knot), so the curve is C1 everywhere and
/// passes through every sample. Outside the sample range the end pieces are
/// continued.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticSpline {
    knots: Vec<f64>,
    coefficients: Vec<f64>,
}

impl QuadraticSpline {
    const DEGREE: usize = 2;

    /// Fit through `(xs[i], ys[i])`; `xs` strictly increasing with at least three entries.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self, InterpolationError> {
        check_samples(xs, ys, Self::DEGREE + 1)?;
        let n = xs.len();

        let mut knots = Vec::with_capacity(n + Self::DEGREE + 1);
        knots.extend([xs[0]; 3]);
        knots.extend(xs.windows(2).skip(1).take(n - 3).map(|w| 0.5 * (w[0] + w[1])));
        knots.extend([xs[n - 1]; 3]);

        let mut matrix = vec![vec![0.0; n]; n];
        for (row, &x) in matrix.iter_mut().zip(xs) {
            let span = span_index(&knots, n, x);
            for (r, value) in basis(&knots, span, x).into_iter().enumerate() {
                row[span - Self::DEGREE + r] = value;
            }
        }
        let coefficients = solve_dense(matrix, ys.to_vec())?;
        Ok(Self {
            knots,
            coefficients,
        })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.coefficients.len();
        let span = span_index(&self.knots, n, x);
        basis(&self.knots, span, x)
            .iter()
            .enumerate()
            .map(|(r, b)| b * self.coefficients[span - Self::DEGREE + r])
            .sum()
    }
}

/// Knot span `l` with `knots[l] <= x < knots[l + 1]`, limited to the spans that carry
/// the curve so points past either end use the end polynomial.
fn span_index(knots: &[f64], n: usize, x: f64) -> usize {
    let upper = knots.partition_point(|&k| k <= x);
    upper.saturating_sub(1).clamp(2, n - 1)
}

/// The three non-zero degree-2 basis functions on span `l` (Cox-de Boor).
fn basis(knots: &[f64], l: usize, x: f64) -> [f64; 3] {
    let mut values = [1.0, 0.0, 0.0];
    let mut left = [0.0; 3];
    let mut right = [0.0; 3];
    for j in 1..=2 {
        left[j] = x - knots[l + 1 - j];
        right[j] = knots[l + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let tmp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * tmp;
            saved = left[j - r] * tmp;
        }
        values[j] = saved;
    }
    values
}

/// Gaussian elimination with partial pivoting.
fn solve_dense(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, InterpolationError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < f64::EPSILON {
            return Err(InterpolationError::SingularSystem);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

/// Evaluate the quadratic spline through `(xs, ys)` at every target.
pub fn quadratic_resample(
    xs: &[f64],
    ys: &[f64],
    targets: &[f64],
) -> Result<Vec<f64>, InterpolationError> {
    let spline = QuadraticSpline::fit(xs, ys)?;
    Ok(targets.iter().map(|&x| spline.evaluate(x)).collect())
}

/// Linear interpolation over strictly increasing `xs`, extrapolating past both ends.
pub fn linear_extrapolate(xs: &[f64], ys: &[f64], x: f64) -> Result<f64, InterpolationError> {
    check_samples(xs, ys, 2)?;
    let i = bracket(xs, x);
    let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
    Ok(ys[i] + t * (ys[i + 1] - ys[i]))
}

/// Value of a grid lookup and whether any coordinate had to be clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSample {
    pub value: f64,
    pub clamped: bool,
}

/// Multilinear interpolator over a `D`-dimensional rectilinear grid.
///
/// Values are stored row-major with the last axis varying fastest. Coordinates
/// outside an axis are replaced by the nearest boundary value.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularGrid<const D: usize> {
    axes: [Vec<f64>; D],
    values: Vec<f64>,
}

impl<const D: usize> RegularGrid<D> {
    pub fn new(axes: [Vec<f64>; D], values: Vec<f64>) -> Result<Self, InterpolationError> {
        if let Some(axis) = axes
            .iter()
            .position(|axis| axis.is_empty() || !axis.windows(2).all(|w| w[0] < w[1]))
        {
            return Err(InterpolationError::UnsortedAxis { axis });
        }
        let expected: usize = axes.iter().map(Vec::len).product();
        if expected != values.len() {
            return Err(InterpolationError::ValueCount {
                expected,
                found: values.len(),
            });
        }
        Ok(Self { axes, values })
    }

    /// Lower and upper bound of axis `dim`.
    pub fn bounds(&self, dim: usize) -> (f64, f64) {
        let axis = &self.axes[dim];
        (axis[0], axis[axis.len() - 1])
    }

    /// Interpolate at `point` (one coordinate per axis).
    pub fn sample(&self, point: &[f64; D]) -> GridSample {
        let mut clamped = false;
        // (lower index, upper index, weight of upper) per axis
        let mut cells = [(0usize, 0usize, 0.0f64); D];
        for ((axis, &coordinate), cell) in self.axes.iter().zip(point).zip(cells.iter_mut()) {
            let (lo, hi) = (axis[0], axis[axis.len() - 1]);
            let x = if coordinate.is_nan() {
                clamped = true;
                lo
            } else if coordinate < lo || coordinate > hi {
                clamped = true;
                coordinate.clamp(lo, hi)
            } else {
                coordinate
            };

            if axis.len() > 1 {
                let i = bracket(axis, x);
                let t = (x - axis[i]) / (axis[i + 1] - axis[i]);
                *cell = (i, i + 1, t);
            }
        }

        let mut value = 0.0;
        for corner in 0..(1usize << D) {
            let mut weight = 1.0;
            let mut offset = 0;
            for (dim, &(lo, hi, t)) in cells.iter().enumerate() {
                let upper = (corner >> dim) & 1 == 1;
                weight *= if upper { t } else { 1.0 - t };
                offset = offset * self.axes[dim].len() + if upper { hi } else { lo };
            }
            if weight != 0.0 {
                value += weight * self.values[offset];
            }
        }

        GridSample { value, clamped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let grid = linspace(0.0, 0.9, 20);
        assert_eq!(grid.len(), 20);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[19], 0.9);
    }

    #[test]
    fn quadratic_resample_reproduces_parabola() {
        let xs = [0.0, 0.2, 0.5, 0.6, 0.9];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 - x + 3.0 * x * x).collect();
        let targets = [-0.3, 0.1, 0.33, 0.7, 1.2];
        let fitted = quadratic_resample(&xs, &ys, &targets).expect("fit");
        for (x, y) in targets.iter().zip(fitted) {
            assert!((y - (2.0 - x + 3.0 * x * x)).abs() < 1e-12);
        }
    }

    // Knots 0,0,0,1.5,3,3,3: two parabolas p on [0, 1.5] and q on [1.5, 3] joined
    // with matching value and slope. Solving by hand through (0,0),(1,0),(2,0),(3,1):
    //   p(x) = x(1 - x) / 12
    //   q(x) = (7x^2 - 23x + 18) / 12
    #[test]
    fn spline_matches_hand_solved_two_piece_fit() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 0.0, 0.0, 1.0];
        let p = |x: f64| x * (1.0 - x) / 12.0;
        let q = |x: f64| (7.0 * x * x - 23.0 * x + 18.0) / 12.0;

        let spline = QuadraticSpline::fit(&xs, &ys).expect("fit");
        for x in [-0.5, 0.0, 0.5, 1.0, 1.4] {
            assert!((spline.evaluate(x) - p(x)).abs() < 1e-12, "x = {x}");
        }
        for x in [1.6, 2.0, 2.5, 3.0, 3.5] {
            assert!((spline.evaluate(x) - q(x)).abs() < 1e-12, "x = {x}");
        }
        assert!((spline.evaluate(1.5) + 0.0625).abs() < 1e-12);
    }

    #[test]
    fn spline_passes_through_samples_with_continuous_slope() {
        let xs = [0.0, 0.1, 0.3, 0.45, 0.6, 0.8, 0.9];
        let ys = [27.0, 25.1, 22.4, 20.9, 19.8, 18.2, 17.9];
        let spline = QuadraticSpline::fit(&xs, &ys).expect("fit");
        for (x, y) in xs.iter().zip(ys) {
            assert!((spline.evaluate(*x) - y).abs() < 1e-9);
        }

        let h = 1e-7;
        for knot in [0.2, 0.375, 0.525, 0.7] {
            let left = (spline.evaluate(knot) - spline.evaluate(knot - h)) / h;
            let right = (spline.evaluate(knot + h) - spline.evaluate(knot)) / h;
            assert!((left - right).abs() < 1e-4, "kink at {knot}");
        }
    }

    #[test]
    fn spline_with_three_samples_is_the_interpolating_parabola() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [1.0, 4.0, 16.0];
        let fitted = quadratic_resample(&xs, &ys, &[3.0, 5.0]).expect("fit");
        assert!((fitted[0] - 9.0).abs() < 1e-12);
        assert!((fitted[1] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn fits_report_bad_sample_shapes() {
        assert_eq!(
            QuadraticSpline::fit(&[0.0, 1.0], &[0.0, 1.0]),
            Err(InterpolationError::TooFewSamples {
                needed: 3,
                found: 2
            })
        );
        assert_eq!(
            quadratic_resample(&[0.0, 1.0, 2.0], &[0.0, 1.0], &[0.5]),
            Err(InterpolationError::LengthMismatch { xs: 3, ys: 2 })
        );
        assert_eq!(
            linear_extrapolate(&[1.0, 0.0], &[0.0, 1.0], 0.5),
            Err(InterpolationError::UnsortedAxis { axis: 0 })
        );
    }

    #[test]
    fn linear_extrapolates_beyond_samples() {
        let xs = [1.0, 2.0];
        let ys = [10.0, 20.0];
        assert!((linear_extrapolate(&xs, &ys, 3.0).expect("fit") - 30.0).abs() < 1e-12);
        assert!((linear_extrapolate(&xs, &ys, 0.0).expect("fit") - 0.0).abs() < 1e-12);
    }

    #[test]
    fn bilinear_is_exact_for_plane_and_clamps_outside() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 10.0];
        let values: Vec<f64> = xs
            .iter()
            .flat_map(|x| ys.iter().map(move |y| 3.0 * x + 0.5 * y))
            .collect();
        let grid = RegularGrid::new([xs, ys], values).expect("grid");

        let inside = grid.sample(&[1.5, 4.0]);
        assert!(!inside.clamped);
        assert!((inside.value - 6.5).abs() < 1e-12);

        let outside = grid.sample(&[7.0, -3.0]);
        let edge = grid.sample(&[2.0, 0.0]);
        assert!(outside.clamped);
        assert_eq!(outside.value, edge.value);
    }

    #[test]
    fn rejects_mismatched_value_count() {
        assert_eq!(
            RegularGrid::new([vec![0.0, 1.0]], vec![1.0]),
            Err(InterpolationError::ValueCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            RegularGrid::new([vec![0.0], vec![1.0, 0.0]], vec![1.0, 2.0]),
            Err(InterpolationError::UnsortedAxis { axis: 1 })
        );
    }
}
