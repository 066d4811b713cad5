//! Derivative-free minimisation
//!
//! Holt's smoothing constants and initial states are estimated by minimising
//! the in-sample squared error. The objective is cheap and low dimensional,
//! so a Nelder-Mead simplex with a hard iteration cap is enough. The search
//! is fully deterministic: identical inputs always walk the same simplex.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Result of a successful minimisation
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Simplex iterations performed
    pub iterations: usize,
}

/// Nelder-Mead simplex optimiser
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelderMead {
    /// Iteration cap; hitting it is reported as non-convergence
    pub max_iterations: usize,
    /// Relative spread of objective values across the simplex at convergence
    pub f_tolerance: f64,
    /// Relative spread of simplex vertices at convergence
    pub x_tolerance: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            f_tolerance: 1e-10,
            x_tolerance: 1e-7,
        }
    }
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl NelderMead {
    /// Create an optimiser with the given iteration cap and objective tolerance
    pub fn new(max_iterations: usize, f_tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration cap must be greater than zero".to_string(),
            ));
        }
        if !(f_tolerance > 0.0 && f_tolerance.is_finite()) {
            return Err(MathError::InvalidInput(
                "Tolerance must be a positive finite number".to_string(),
            ));
        }

        Ok(Self {
            max_iterations,
            f_tolerance,
            ..Self::default()
        })
    }

    /// Minimise `objective` starting from `start`.
    ///
    /// The initial simplex is `start` plus one vertex per dimension offset by
    /// the matching entry of `steps`. Non-finite objective values are treated
    /// as `+inf` so the simplex moves away from them.
    pub fn minimize<F>(&self, objective: F, start: &[f64], steps: &[f64]) -> Result<Minimum>
    where
        F: Fn(&[f64]) -> f64,
    {
        let n = start.len();
        if n == 0 {
            return Err(MathError::InvalidInput(
                "Cannot optimise over zero parameters".to_string(),
            ));
        }
        if steps.len() != n {
            return Err(MathError::InvalidInput(format!(
                "Expected {} initial steps, got {}",
                n,
                steps.len()
            )));
        }

        let eval = |x: &[f64]| {
            let value = objective(x);
            if value.is_finite() {
                value
            } else {
                f64::INFINITY
            }
        };

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push((start.to_vec(), eval(start)));
        for (i, step) in steps.iter().enumerate() {
            let mut vertex = start.to_vec();
            vertex[i] += step;
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        loop {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            if self.has_converged(&simplex) {
                let (point, value) = simplex.swap_remove(0);
                return Ok(Minimum {
                    point,
                    value,
                    iterations,
                });
            }
            if iterations >= self.max_iterations {
                return Err(MathError::NonConvergence { iterations });
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(x, _)| x[j]).sum::<f64>() / n as f64)
                .collect();
            let worst = simplex[n].0.clone();
            let worst_value = simplex[n].1;
            let second_worst_value = simplex[n - 1].1;
            let best_value = simplex[0].1;

            let reflected = along(&centroid, &worst, -REFLECTION);
            let reflected_value = eval(&reflected);

            if reflected_value < best_value {
                let expanded = along(&centroid, &reflected, EXPANSION);
                let expanded_value = eval(&expanded);
                simplex[n] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
                continue;
            }

            if reflected_value < second_worst_value {
                simplex[n] = (reflected, reflected_value);
                continue;
            }

            let (contracted, accepted) = if reflected_value < worst_value {
                let outside = along(&centroid, &reflected, CONTRACTION);
                let value = eval(&outside);
                ((outside, value), value <= reflected_value)
            } else {
                let inside = along(&centroid, &worst, CONTRACTION);
                let value = eval(&inside);
                ((inside, value), value < worst_value)
            };

            if accepted {
                simplex[n] = contracted;
            } else {
                let best = simplex[0].0.clone();
                for vertex in simplex.iter_mut().skip(1) {
                    let shrunk = along(&best, &vertex.0, SHRINK);
                    let value = eval(&shrunk);
                    *vertex = (shrunk, value);
                }
            }
        }
    }

    fn has_converged(&self, simplex: &[(Vec<f64>, f64)]) -> bool {
        let (best, best_value) = (&simplex[0].0, simplex[0].1);

        let x_spread = simplex[1..]
            .iter()
            .flat_map(|(x, _)| x.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        let x_scale = 1.0 + best.iter().map(|v| v.abs()).fold(0.0_f64, f64::max);

        let f_spread = simplex[1..]
            .iter()
            .map(|(_, f)| (f - best_value).abs())
            .fold(0.0_f64, f64::max);

        x_spread <= self.x_tolerance * x_scale
            && f_spread <= self.f_tolerance * (1.0 + best_value.abs())
    }
}

/// `origin + coef * (target - origin)`
fn along(origin: &[f64], target: &[f64], coef: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, t)| o + coef * (t - o))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimises_quadratic_bowl() {
        let optimizer = NelderMead::default();
        let bowl = |x: &[f64]| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2);

        let minimum = optimizer.minimize(bowl, &[0.0, 0.0], &[0.5, 0.5]).unwrap();

        assert!((minimum.point[0] - 3.0).abs() < 1e-4);
        assert!((minimum.point[1] + 1.0).abs() < 1e-4);
        assert!(minimum.value < 1e-8);
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let optimizer = NelderMead::new(3, 1e-12).unwrap();
        let rosenbrock =
            |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);

        let result = optimizer.minimize(rosenbrock, &[-1.2, 1.0], &[0.1, 0.1]);

        assert_eq!(result, Err(MathError::NonConvergence { iterations: 3 }));
    }

    #[test]
    fn test_non_finite_objective_is_avoided() {
        let optimizer = NelderMead::default();
        let guarded = |x: &[f64]| {
            if x[0] < 0.0 {
                f64::NAN
            } else {
                (x[0] - 2.0).powi(2)
            }
        };

        let minimum = optimizer.minimize(guarded, &[0.5], &[0.25]).unwrap();
        assert!((minimum.point[0] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_mismatched_steps() {
        let optimizer = NelderMead::default();
        let result = optimizer.minimize(|x| x[0], &[0.0, 0.0], &[0.1]);
        assert!(matches!(result, Err(MathError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_construction() {
        assert!(NelderMead::new(0, 1e-8).is_err());
        assert!(NelderMead::new(10, 0.0).is_err());
        assert!(NelderMead::new(10, f64::NAN).is_err());
    }
}
