//! Damped Newton iteration with backtracking line search.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Newton solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Relative finite-difference step for the Jacobian
    pub fd_epsilon: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-6,
            rel_tol: 1e-9,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            fd_epsilon: 1e-7,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    /// Last accepted iterate
    pub x: DVector<f64>,
    /// Residual norm at `x`
    pub residual_norm: f64,
    /// Number of Jacobian updates performed
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Solve `residual_fn(x) = 0` starting from `x0`.
///
/// Trial points that are not admissible, or where the residual cannot be
/// evaluated, are treated like a failed descent and the step is halved.
/// Running out of iterations or step length is reported through
/// `converged = false`; only a failure at `x0` or a singular Jacobian is an error.
pub fn newton_solve<F, A>(
    x0: DVector<f64>,
    residual_fn: F,
    admissible: A,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    A: Fn(&DVector<f64>) -> bool,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let tol = config.abs_tol.max(config.rel_tol * r_norm);

    for iter in 0..config.max_iterations {
        if r_norm < tol {
            debug!(iterations = iter, residual_norm = r_norm, "newton converged");
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = finite_difference_jacobian(&x, &r, &residual_fn, config.fd_epsilon)?;
        let dx = jac.lu().solve(&(-&r)).ok_or_else(|| SolverError::Numeric {
            what: format!("singular Jacobian at iteration {iter}"),
        })?;

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..=config.max_line_search_iters {
            let x_trial = &x + alpha * &dx;
            if admissible(&x_trial)
                && let Ok(r_trial) = residual_fn(&x_trial)
                && r_trial.norm() < r_norm
            {
                accepted = Some((x_trial, r_trial));
                break;
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new)) = accepted else {
            debug!(iteration = iter, residual_norm = r_norm, "line search stagnated");
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: false,
            });
        };

        x = x_new;
        r = r_new;
        r_norm = r.norm();
        trace!(iteration = iter, alpha, residual_norm = r_norm, "newton step");
    }

    let converged = r_norm < tol;
    debug!(
        iterations = config.max_iterations,
        residual_norm = r_norm,
        converged,
        "newton iteration limit reached"
    );
    Ok(NewtonResult {
        x,
        residual_norm: r_norm,
        iterations: config.max_iterations,
        converged,
    })
}
