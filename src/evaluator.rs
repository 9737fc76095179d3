//! High-level evaluation interface.
//!
//! An [`Evaluator`] owns a [`Registry`] and runs the whole pipeline for each
//! expression. It holds no per-evaluation state, so one evaluator can be shared
//! between threads; every call allocates its tree in its own arena.

extern crate alloc;

use crate::Real;
use crate::ast::Ast;
use crate::context::Registry;
use crate::engine;
use crate::error::{ExprError, Result};
use crate::lexer;
use crate::preprocessor::preprocess;
use crate::types::{Function, NumberConstant, Operator, Token};
use alloc::vec::Vec;
use bumpalo::Bump;

/// Evaluates expressions against a fixed set of definitions.
///
/// # Examples
///
/// ```
/// use math_eval::evaluator::Evaluator;
///
/// let evaluator = Evaluator::with_defaults().unwrap();
/// assert_eq!(evaluator.evaluate("2+3*4").unwrap(), 14.0);
/// assert_eq!(evaluator.evaluate("max(1,7,3)-sum(1,1)").unwrap(), 5.0);
///
/// // Reusing one arena for several evaluations
/// let mut arena = bumpalo::Bump::new();
/// for expression in ["1+1", "2*(3+4)"] {
///     evaluator.evaluate_in(expression, &arena).unwrap();
///     arena.reset();
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    registry: Registry,
    arena_capacity: usize,
}

impl Evaluator {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            arena_capacity: 0,
        }
    }

    /// An evaluator with the standard operators, functions and constants.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Registry::with_defaults()?))
    }

    /// Builds the registry from the given definitions; see [`Registry::new`].
    pub fn from_definitions<F, O, C>(functions: F, operators: O, constants: C) -> Result<Self>
    where
        F: IntoIterator<Item = Function>,
        O: IntoIterator<Item = Operator>,
        C: IntoIterator<Item = NumberConstant>,
    {
        Ok(Self::new(Registry::new(functions, operators, constants)?))
    }

    /// Pre-sizes the arena [`evaluate`](Self::evaluate) allocates for each call.
    pub fn with_arena_capacity(mut self, capacity: usize) -> Self {
        self.arena_capacity = capacity;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Evaluates `expression`, allocating its tree in a fresh arena.
    pub fn evaluate(&self, expression: &str) -> Result<Real> {
        let arena = Bump::with_capacity(self.arena_capacity);
        self.evaluate_in(expression, &arena)
    }

    /// Evaluates `expression`, allocating its tree in `arena`.
    pub fn evaluate_in(&self, expression: &str, arena: &Bump) -> Result<Real> {
        self.parse(expression, arena)?.evaluate()
    }

    /// Parses `expression` into a tree that can be evaluated repeatedly.
    pub fn parse<'arena, 'reg>(
        &'reg self,
        expression: &str,
        arena: &'arena Bump,
    ) -> Result<Ast<'arena, 'reg>> {
        engine::parse(expression, &self.registry, arena)
    }

    /// Lexes and preprocesses `expression` without building a tree.
    ///
    /// The returned tokens have every name resolved into a function or constant name.
    pub fn tokenize<'a>(&self, expression: &'a str) -> Result<Vec<Token<'a>>> {
        if expression.is_empty() {
            return Err(ExprError::EmptyExpression);
        }
        preprocess(&lexer::tokenize(expression)?)
    }
}
