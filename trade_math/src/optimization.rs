//! Bounded Nelder–Mead simplex minimisation
//!
//! Used by the forecasting models to estimate smoothing parameters and ARMA
//! coefficients. The minimiser is deterministic: the same objective, start
//! point and configuration always visit the same sequence of points. An
//! optional wall-clock deadline bounds runaway fits.

use std::cmp::Ordering;
use std::time::Instant;

/// Why the minimiser stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The simplex collapsed, or its values agree and it is no wider than `tolerance.sqrt()`
    Converged,
    /// The iteration budget ran out
    MaxIterations,
    /// The deadline passed before convergence
    DeadlineExceeded,
}

/// Configuration for Nelder–Mead minimisation
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values and on the simplex size
    pub tolerance: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Initial simplex step, relative to the start point where it is non-zero
    pub initial_step: f64,
    /// Stop with `Termination::DeadlineExceeded` once this instant passes
    pub deadline: Option<Instant>,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
            deadline: None,
        }
    }
}

/// Result of a minimisation run
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Why the run stopped
    pub termination: Termination,
}

impl NelderMeadResult {
    /// Whether the run stopped because it converged
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Minimise `objective` starting from `initial`.
///
/// `bounds`, when given, holds one `(min, max)` pair per dimension and every
/// evaluated point is clamped into it. Non-finite objective values are
/// treated as worse than any finite value.
///
/// ```
/// use trade_math::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     &NelderMeadConfig::default(),
/// );
/// assert!(result.converged());
/// assert!((result.point[0] - 2.0).abs() < 1e-3);
/// assert!((result.point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            point: Vec::new(),
            value: objective(&[]),
            iterations: 0,
            termination: Termination::Converged,
        };
    }

    let evaluate = |point: &[f64]| -> f64 {
        let value = objective(point);
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    };

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(clamp(initial, bounds));
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(clamp(&vertex, bounds));
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| evaluate(v)).collect();

    let mut iterations = 0;
    let mut termination = Termination::MaxIterations;

    while iterations < config.max_iter {
        if let Some(deadline) = config.deadline {
            if Instant::now() >= deadline {
                termination = Termination::DeadlineExceeded;
                break;
            }
        }
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| compare(values[a], values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let centroid = centroid(&simplex, worst);
        let diameter = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);

        // Equal values alone are not enough: a wide simplex can straddle the minimum.
        let spread = values[worst] - values[best];
        let flat = values[best].is_finite()
            && spread.abs() < config.tolerance
            && diameter < config.tolerance.sqrt();
        if flat || diameter < config.tolerance {
            termination = Termination::Converged;
            break;
        }

        let reflected = clamp(&towards(&centroid, &simplex[worst], -config.alpha), bounds);
        let reflected_value = evaluate(&reflected);

        if reflected_value < values[best] {
            let expanded = clamp(&towards(&centroid, &reflected, config.gamma), bounds);
            let expanded_value = evaluate(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < values[worst] {
            let point = clamp(&towards(&centroid, &reflected, config.rho), bounds);
            let value = evaluate(&point);
            (point, value)
        } else {
            let point = clamp(&towards(&centroid, &simplex[worst], config.rho), bounds);
            let value = evaluate(&point);
            (point, value)
        };

        if contracted_value < values[worst].min(reflected_value) {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink towards the best vertex
        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i == best {
                continue;
            }
            let shrunk: Vec<f64> = anchor
                .iter()
                .zip(simplex[i].iter())
                .map(|(a, x)| a + config.sigma * (x - a))
                .collect();
            simplex[i] = clamp(&shrunk, bounds);
            values[i] = evaluate(&simplex[i]);
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| compare(values[a], values[b]))
        .unwrap_or(0);

    NelderMeadResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        termination,
    }
}

/// Total order on objective values; ties keep vertex order stable.
fn compare(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

fn centroid(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let dims = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centre = vec![0.0; dims];
    for (i, vertex) in simplex.iter().enumerate() {
        if i == exclude {
            continue;
        }
        for (c, x) in centre.iter_mut().zip(vertex.iter()) {
            *c += x;
        }
    }
    for c in centre.iter_mut() {
        *c /= count;
    }
    centre
}

/// `centroid + coefficient * (point - centroid)`
fn towards(centroid: &[f64], point: &[f64], coefficient: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point.iter())
        .map(|(c, p)| c + coefficient * (p - c))
        .collect()
}

fn clamp(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(bounds) => point
            .iter()
            .enumerate()
            .map(|(i, &x)| match bounds.get(i) {
                Some(&(lo, hi)) => x.clamp(lo, hi),
                None => x,
            })
            .collect(),
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
