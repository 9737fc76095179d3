//! Standard operators, functions and constants.
//!
//! [`Registry::with_defaults`](crate::context::Registry::with_defaults) is assembled from
//! the lists returned here. Basic arithmetic and the variadic aggregates need nothing
//! beyond `core`; the transcendental functions and the `^` operator use the `libm`
//! crate so they stay available in no_std builds, and are only registered when the
//! `libm` feature is enabled.
//!
//! The plain helpers (`add`, `div`, `sum`, ...) are public so callers composing their
//! own registry can reuse them.

extern crate alloc;

#[cfg(feature = "libm")]
use libm::{
    ceil as libm_ceil, cos as libm_cos, exp as libm_exp, fabs as libm_abs, floor as libm_floor,
    log as libm_ln, log10 as libm_log10, pow as libm_pow, sin as libm_sin, sqrt as libm_sqrt,
    tan as libm_tan,
};

use crate::Real;
use crate::error::{MappingError, MappingResult, Result};
use crate::types::{Function, NumberConstant, Operator};
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

/// The golden ratio.
pub const GOLDEN_RATIO: Real = 1.618_033_988_749_895;

pub fn add(a: Real, b: Real) -> Real {
    a + b
}

pub fn sub(a: Real, b: Real) -> Real {
    a - b
}

pub fn mul(a: Real, b: Real) -> Real {
    a * b
}

/// Divides `a` by `b`, rejecting a zero divisor instead of producing infinity.
pub fn div(a: Real, b: Real) -> MappingResult {
    if b == 0.0 {
        return Err(MappingError::new("Division by zero"));
    }
    Ok(a / b)
}

/// Remainder of `a / b` with the sign of `a`.
pub fn rem(a: Real, b: Real) -> MappingResult {
    if b == 0.0 {
        return Err(MappingError::new("Division by zero"));
    }
    Ok(a % b)
}

#[cfg(feature = "libm")]
pub fn pow(a: Real, b: Real) -> Real {
    libm_pow(a, b)
}

pub fn sum(args: &[Real]) -> Real {
    args.iter().sum()
}

pub fn avg(args: &[Real]) -> Real {
    sum(args) / args.len() as Real
}

/// Smallest argument. NaN arguments are skipped unless every argument is NaN.
pub fn min(args: &[Real]) -> Real {
    args.iter().copied().fold(Real::NAN, Real::min)
}

/// Largest argument. NaN arguments are skipped unless every argument is NaN.
pub fn max(args: &[Real]) -> Real {
    args.iter().copied().fold(Real::NAN, Real::max)
}

/// Checks that `name` was called with exactly `expected` arguments.
#[cfg(feature = "libm")]
fn exact_arity(
    name: &str,
    expected: usize,
    args: &[Real],
) -> core::result::Result<(), MappingError> {
    if args.len() != expected {
        return Err(MappingError::new(format!(
            "{} expects {} argument{}, got {}",
            name,
            expected,
            if expected == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

/// Wraps a one-argument function into a registry entry.
#[cfg(feature = "libm")]
fn unary(name: &'static str, f: fn(Real) -> Real) -> Result<Function> {
    Function::new(name, move |args| {
        exact_arity(name, 1, args)?;
        Ok(f(args[0]))
    })
}

/// Wraps an aggregate over one or more arguments into a registry entry.
fn variadic(name: &'static str, f: fn(&[Real]) -> Real) -> Result<Function> {
    Function::new(name, move |args| {
        if args.is_empty() {
            return Err(MappingError::new(format!("{} expects at least 1 argument", name)));
        }
        Ok(f(args))
    })
}

/// `+` and `-` at precedence 0, `*`, `/` and `%` at 1, and `^` at 2 when `libm` is on.
pub fn standard_operators() -> Result<Vec<Operator>> {
    #[allow(unused_mut)]
    let mut operators = vec![
        Operator::infallible('+', 0, add)?,
        Operator::infallible('-', 0, sub)?,
        Operator::infallible('*', 1, mul)?,
        Operator::new('/', 1, div)?,
        Operator::new('%', 1, rem)?,
    ];
    #[cfg(feature = "libm")]
    operators.push(Operator::infallible('^', 2, pow)?);
    Ok(operators)
}

pub fn standard_functions() -> Result<Vec<Function>> {
    #[allow(unused_mut)]
    let mut functions = vec![
        variadic("min", min)?,
        variadic("max", max)?,
        variadic("sum", sum)?,
        variadic("avg", avg)?,
    ];

    #[cfg(feature = "libm")]
    {
        functions.extend([
            unary("ln", libm_ln)?,
            unary("log10", libm_log10)?,
            unary("exp", libm_exp)?,
            unary("sqrt", libm_sqrt)?,
            unary("abs", libm_abs)?,
            unary("sin", libm_sin)?,
            unary("cos", libm_cos)?,
            unary("tan", libm_tan)?,
            unary("floor", libm_floor)?,
            unary("ceil", libm_ceil)?,
        ]);
        functions.push(Function::new("pow", |args| {
            exact_arity("pow", 2, args)?;
            Ok(pow(args[0], args[1]))
        })?);
    }

    Ok(functions)
}

/// π and ε under both their symbol and their name, plus φ and τ.
pub fn standard_constants() -> Result<Vec<NumberConstant>> {
    Ok(vec![
        NumberConstant::symbol('π', crate::constants::PI)?,
        NumberConstant::named("pi", crate::constants::PI)?,
        NumberConstant::symbol('ε', crate::constants::E)?,
        NumberConstant::named("e", crate::constants::E)?,
        NumberConstant::symbol('φ', GOLDEN_RATIO)?,
        NumberConstant::symbol('τ', core::f64::consts::TAU)?,
    ])
}
