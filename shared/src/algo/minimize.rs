//! Derivative-free scalar minimization (Nelder–Mead on a 1-D simplex).
//!
//! The simplex is the pair `{x0, x0 + initial_step}`. Iteration stops when
//! both the simplex width and the spread of its function values drop below
//! the tolerances, or after `max_iterations`. Non-finite cost values are
//! treated as `+inf` so the simplex moves away from them.

use serde::{Deserialize, Serialize};

/// Reflection coefficient
const ALPHA: f64 = 1.0;
/// Expansion coefficient
const GAMMA: f64 = 2.0;
/// Contraction coefficient
const RHO: f64 = 0.5;
/// Shrink coefficient
const SIGMA: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NelderMeadOptions {
    /// Offset of the second simplex vertex from the starting point
    pub initial_step: f64,
    /// Stop when the simplex is narrower than this
    pub x_tolerance: f64,
    /// Stop when vertex costs differ by less than this
    pub f_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            initial_step: 1.0,
            x_tolerance: 1e-4,
            f_tolerance: 1e-4,
            max_iterations: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeResult {
    pub x: f64,
    pub fx: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

#[derive(Clone, Copy)]
struct Vertex {
    x: f64,
    fx: f64,
}

/// Minimize `cost` starting from `x0`.
pub fn nelder_mead_1d<F>(mut cost: F, x0: f64, options: &NelderMeadOptions) -> MinimizeResult
where
    F: FnMut(f64) -> f64,
{
    let mut evaluations = 0;
    let mut eval = |x: f64| {
        evaluations += 1;
        let fx = cost(x);
        if fx.is_finite() {
            fx
        } else {
            f64::INFINITY
        }
    };

    let step = if options.initial_step != 0.0 {
        options.initial_step
    } else {
        1.0
    };
    let mut best = Vertex { x: x0, fx: eval(x0) };
    let mut worst = Vertex {
        x: x0 + step,
        fx: eval(x0 + step),
    };

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        if worst.fx < best.fx {
            std::mem::swap(&mut best, &mut worst);
        }
        if (worst.x - best.x).abs() <= options.x_tolerance
            && (worst.fx - best.fx).abs() <= options.f_tolerance
        {
            converged = true;
            break;
        }
        iterations += 1;

        let reflected_x = best.x + ALPHA * (best.x - worst.x);
        let reflected = Vertex {
            x: reflected_x,
            fx: eval(reflected_x),
        };

        if reflected.fx < best.fx {
            let expanded_x = best.x + GAMMA * (reflected.x - best.x);
            let expanded = Vertex {
                x: expanded_x,
                fx: eval(expanded_x),
            };
            worst = if expanded.fx < reflected.fx {
                expanded
            } else {
                reflected
            };
            continue;
        }

        // With one free dimension the best vertex is also the second worst,
        // so anything short of a new best goes straight to contraction.
        let (contracted_x, bound) = if reflected.fx < worst.fx {
            (best.x + RHO * (reflected.x - best.x), reflected.fx)
        } else {
            (best.x + RHO * (worst.x - best.x), worst.fx)
        };
        let contracted = Vertex {
            x: contracted_x,
            fx: eval(contracted_x),
        };

        if contracted.fx < bound {
            worst = contracted;
        } else {
            let shrunk_x = best.x + SIGMA * (worst.x - best.x);
            worst = Vertex {
                x: shrunk_x,
                fx: eval(shrunk_x),
            };
        }
    }

    if worst.fx < best.fx {
        best = worst;
    }

    MinimizeResult {
        x: best.x,
        fx: best.fx,
        iterations,
        evaluations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quadratic_minimum() {
        let options = NelderMeadOptions {
            initial_step: 0.5,
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
            max_iterations: 500,
        };
        let result = nelder_mead_1d(|x| (x - 3.7).powi(2) + 1.0, 0.0, &options);
        assert!(result.converged);
        assert_abs_diff_eq!(result.x, 3.7, epsilon = 1e-6);
        assert_abs_diff_eq!(result.fx, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_large_scale_parameter() {
        // Dispersion coefficients live around 1e6..1e8 rad·nm²
        let target = 2.5e6;
        let options = NelderMeadOptions {
            initial_step: 5e5,
            x_tolerance: 1.0,
            f_tolerance: 1e-12,
            max_iterations: 500,
        };
        let result = nelder_mead_1d(|x| ((x - target) / 1e6).powi(2), 0.0, &options);
        assert_abs_diff_eq!(result.x, target, epsilon = 10.0);
    }

    #[test]
    fn test_nan_cost_is_avoided() {
        let options = NelderMeadOptions {
            initial_step: 1.0,
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
            max_iterations: 500,
        };
        let result = nelder_mead_1d(
            |x| if x < 0.0 { f64::NAN } else { (x - 2.0).powi(2) },
            1.0,
            &options,
        );
        assert_abs_diff_eq!(result.x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_iteration_cap() {
        let options = NelderMeadOptions {
            max_iterations: 3,
            x_tolerance: 0.0,
            f_tolerance: 0.0,
            ..Default::default()
        };
        let result = nelder_mead_1d(|x| x * x, 100.0, &options);
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }
}
