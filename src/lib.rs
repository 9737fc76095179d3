#![cfg_attr(not(test), no_std)]
#![doc = r#"
# math-eval

A small, no_std-friendly evaluator for infix math expressions whose operators,
functions and constants are all supplied by the caller.

## Overview

An expression goes through four stages:

1. **Lexer** ([`lexer`]): splits the text into numbers, names, operator symbols,
   constant symbols, parentheses and commas, reporting illegal characters and
   malformed numbers with their position.
2. **Preprocessor** ([`preprocessor`]): checks that the tokens form a valid sequence,
   balances parentheses and decides whether each name is a function or a constant.
3. **Tree builder** ([`engine`]): builds an arena-allocated syntax tree, binding every
   operator and function to its [`Registry`](context::Registry) entry. Higher
   precedence binds tighter; equal precedence groups left to right.
4. **Evaluation** ([`eval`]): a single pass over the tree.

There are no unary operators and no variables: `-1` is rejected, write `0-1`.

## Quick Start

```rust
use math_eval::context::Registry;
use math_eval::engine::interp;

let registry = Registry::with_defaults().unwrap();
assert_eq!(interp("2+3*4", &registry).unwrap(), 14.0);
assert_eq!(interp("(2+3)*4", &registry).unwrap(), 20.0);
assert_eq!(interp("max(1,sum(2,3),4)", &registry).unwrap(), 5.0);
```

## Custom definitions

```rust
use math_eval::error::{ExprError, MappingError};
use math_eval::evaluator::Evaluator;
use math_eval::types::{Function, NumberConstant, Operator};

let evaluator = Evaluator::from_definitions(
    [Function::infallible("mv2", |args| args[0] + args[1]).unwrap()],
    [
        Operator::infallible('+', 0, |a, b| a + b).unwrap(),
        Operator::new('/', 1, |a, b| {
            if b == 0.0 {
                Err(MappingError::new("Division by zero is not allowed"))
            } else {
                Ok(a / b)
            }
        })
        .unwrap(),
    ],
    [NumberConstant::named("half", 0.5).unwrap()],
)
.unwrap();

assert_eq!(evaluator.evaluate("mv2(half,1)/2").unwrap(), 0.75);
assert_eq!(
    evaluator.evaluate("half*2"),
    Err(ExprError::Syntax { message: "Operator Not Found", position: 4, length: 1 })
);
assert!(matches!(evaluator.evaluate("1/0"), Err(ExprError::Mapping(_))));
```

## Errors

Every failure is an [`ExprError`](error::ExprError). Lexical and syntax errors carry
the character position and length of the offending text; errors raised by a
mapping are returned unchanged inside [`ExprError::Mapping`](error::ExprError::Mapping).

## Features

- `libm` (default): registers the transcendental functions and the `^` operator in
  the standard library. Basic arithmetic and aggregates are always available.
"#]

extern crate alloc;

pub mod ast;
pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod preprocessor;
pub mod types;

pub use context::Registry;
pub use engine::{interp, parse};
pub use error::{ExprError, MappingError};
pub use evaluator::Evaluator;
pub use types::{Function, NumberConstant, Operator};

/// The numeric type every expression evaluates to.
pub type Real = f64;

pub mod constants {
    use super::Real;

    pub const PI: Real = core::f64::consts::PI;
    pub const E: Real = core::f64::consts::E;
    pub const TEST_PRECISION: Real = 1e-10;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. Supports optional format arguments like assert_eq!.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite() && right_val.is_infinite() {
            assert_eq!(left_val, right_val);
        } else {
            assert!(
                (left_val - right_val).abs() < eps,
                "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
                left_val,
                right_val,
                eps
            );
        }
    }};
    ($left:expr, $right:expr, $epsilon:expr, $($arg:tt)+) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if !(left_val.is_nan() && right_val.is_nan()) {
            assert!((left_val - right_val).abs() < eps || left_val == right_val, $($arg)+);
        }
    }};
}
