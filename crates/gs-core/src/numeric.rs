use crate::GsError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-9,
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, GsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(GsError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, GsError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(GsError::InvalidArg { what })
    }
}

/// Finite and inside the closed interval `[min, max]`.
pub fn ensure_within(v: Real, min: Real, max: Real, what: &'static str) -> Result<Real, GsError> {
    let v = ensure_finite(v, what)?;
    if (min..=max).contains(&v) {
        Ok(v)
    } else {
        Err(GsError::OutOfRange {
            what,
            value: v,
            min,
            max,
        })
    }
}
