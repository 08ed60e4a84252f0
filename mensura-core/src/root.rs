//! nth-root extraction for arbitrary-precision decimals
//!
//! Seeds with a floating-point estimate and refines with Newton-Raphson in
//! decimal arithmetic until consecutive iterates agree to the requested
//! digit count. The iteration count is capped so pathological inputs fail
//! instead of spinning.

use dashu_float::ops::Abs;
use dashu_float::DBig;
use dashu_int::IBig;

use crate::decimal::{decimal_from_f64, decimal_to_f64, Decimal, PrecisionContext};
use crate::NumericError;

/// Iteration cap for the Newton-Raphson refinement
pub const MAX_ROOT_ITERATIONS: usize = 64;

/// Compute the real `degree`-th root of `value` to the context's precision.
///
/// Even roots of negative values and a zero degree fail with
/// [`NumericError::DomainError`]; failure to converge within
/// [`MAX_ROOT_ITERATIONS`] fails with [`NumericError::NonConvergence`].
pub fn nth_root(
    degree: u32,
    value: &Decimal,
    ctx: &PrecisionContext,
) -> Result<Decimal, NumericError> {
    if degree == 0 {
        return Err(NumericError::DomainError(
            "zeroth root is undefined".to_string(),
        ));
    }
    if *value == Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    if *value < Decimal::ZERO {
        if degree % 2 == 0 {
            return Err(NumericError::DomainError(format!(
                "even root (n={degree}) of a negative value"
            )));
        }
        return nth_root(degree, &(-value.clone()), ctx).map(|r| -r);
    }
    if degree == 1 {
        return Ok(value.clone());
    }

    if let Some(exact) = exact_integer_root(degree, value) {
        return Ok(exact);
    }

    let working = ctx.working_digits();
    let v = value.clone().with_precision(working).value();
    let mut x = seed(degree, &v, working);

    // Stop once two iterates agree to the requested digit count.
    let tolerance_scale = DBig::from_parts(IBig::ONE, -((ctx.digits + 2) as isize));
    let n = DBig::from(degree);
    let n_minus_one = DBig::from(degree - 1);

    for _ in 0..MAX_ROOT_ITERATIONS {
        let x_pow = pow_uint_at(&x, degree - 1, working);
        let next = (&x * &n_minus_one + &v / &x_pow) / &n;
        let diff = Abs::abs(&next - &x);
        let tolerance = Abs::abs(next.clone()) * &tolerance_scale;
        let converged = diff <= tolerance;
        x = next;
        if converged {
            return Ok(x.with_precision(ctx.digits).value());
        }
    }

    Err(NumericError::NonConvergence(MAX_ROOT_ITERATIONS))
}

/// Floating-point first estimate, falling back to `exp(ln(v)/n)` in decimal
/// arithmetic when the value lies outside the `f64` range.
fn seed(degree: u32, v: &Decimal, working: usize) -> Decimal {
    if let Some(f) = decimal_to_f64(v) {
        if f > 0.0 {
            let estimate = if degree == 2 {
                f.sqrt()
            } else {
                f.powf(1.0 / f64::from(degree))
            };
            if estimate.is_finite() && estimate > 0.0 {
                return decimal_from_f64(estimate).with_precision(working).value();
            }
        }
    }
    (v.clone().ln() / DBig::from(degree)).exp()
}

/// Short-circuit for integer values that are perfect nth powers.
fn exact_integer_root(degree: u32, value: &Decimal) -> Option<Decimal> {
    if value.clone().floor() != *value {
        return None;
    }
    let f = decimal_to_f64(value)?;
    let estimate = if degree == 2 {
        f.sqrt()
    } else {
        f.powf(1.0 / f64::from(degree))
    };
    let rounded = estimate.round();
    if !rounded.is_finite() || rounded <= 0.0 || rounded >= 9.2e18 {
        return None;
    }
    let candidate = DBig::from(rounded as i64).with_precision(0).value();
    (pow_uint(&candidate, degree) == *value).then_some(candidate)
}

/// Repeated-multiplication integer power, exact (unlimited precision).
/// The base is widened first: a finite-precision operand would drag the
/// whole product down to its own precision.
fn pow_uint(base: &Decimal, exp: u32) -> Decimal {
    let base = base.clone().with_precision(0).value();
    pow_uint_at(&base, exp, 0)
}

/// Repeated-multiplication integer power at a fixed working precision
/// (zero meaning unlimited)
fn pow_uint_at(base: &Decimal, exp: u32, precision: usize) -> Decimal {
    let mut result = DBig::ONE.with_precision(precision).value();
    for _ in 0..exp {
        result = &result * base;
    }
    result
}
