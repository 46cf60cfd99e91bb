use crate::HpError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair used for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Loose tolerance for comparing quantities that passed through an iterative solve.
    pub const fn solver() -> Self {
        Self {
            abs: 1e-6,
            rel: 1e-6,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HpError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HpError::NonFinite { what, value: v })
    }
}
