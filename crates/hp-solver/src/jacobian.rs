//! Finite difference Jacobian computation.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Compute the Jacobian using forward finite differences.
///
/// Column j is (f(x + dx·e_j) - f(x)) / dx with dx = epsilon · max(|x_j|, 1).
/// `f_x` is the residual already evaluated at `x`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac = DMatrix::zeros(f_x.len(), n);

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        let mut x_perturbed = x.clone();
        x_perturbed[j] += dx;

        let df = (f(&x_perturbed)? - f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_of_coupled_system() {
        // f = [x0 * x1, x0 + 3 x1], J = [[x1, x0], [1, 3]]
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[1], x[0] + 3.0 * x[1]]))
        };

        let x = DVector::from_vec(vec![2.0, 5.0]);
        let fx = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &fx, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 5.0).abs() < 1e-5);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-5);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-5);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-5);
    }
}
