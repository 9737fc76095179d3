//! Registry of operators, functions and constants.
//!
//! A [`Registry`] is built once from caller-supplied definitions and never changes
//! afterwards. Construction rejects duplicate identifiers within a table and
//! constants whose identifier is already taken by a function or operator. All tables
//! are fixed-capacity `heapless` maps.

extern crate alloc;

use crate::error::{ExprError, Result};
use crate::types::{
    Function, Identifier, MAX_CONSTANTS, MAX_FUNCTIONS, MAX_OPERATORS, NumberConstant, Operator,
    TryIntoIdentifier,
};
use alloc::string::ToString;

pub type FunctionMap = heapless::FnvIndexMap<Identifier, Function, MAX_FUNCTIONS>;
pub type ConstantMap = heapless::FnvIndexMap<Identifier, NumberConstant, MAX_CONSTANTS>;
pub type OperatorMap = heapless::LinearMap<char, Operator, MAX_OPERATORS>;

/// Lookup tables consulted while building a syntax tree.
///
/// # Examples
///
/// ```
/// use math_eval::context::Registry;
/// use math_eval::types::{Function, NumberConstant, Operator};
/// use math_eval::engine::interp;
///
/// let registry = Registry::new(
///     [Function::infallible("twice", |args| args[0] * 2.0).unwrap()],
///     [
///         Operator::infallible('+', 0, |a, b| a + b).unwrap(),
///         Operator::infallible('*', 1, |a, b| a * b).unwrap(),
///     ],
///     [NumberConstant::symbol('π', std::f64::consts::PI).unwrap()],
/// )
/// .unwrap();
///
/// assert_eq!(interp("twice(3)+1*2", &registry).unwrap(), 8.0);
/// assert_eq!(interp("π", &registry).unwrap(), std::f64::consts::PI);
/// ```
///
/// A constant may not reuse a function's name:
///
/// ```
/// use math_eval::context::Registry;
/// use math_eval::error::ExprError;
/// use math_eval::types::{Function, NumberConstant, Operator};
///
/// let result = Registry::new(
///     [Function::infallible("ln", |args| args[0].ln()).unwrap()],
///     Vec::<Operator>::new(),
///     [NumberConstant::named("ln", 1.0).unwrap()],
/// );
/// assert!(matches!(result, Err(ExprError::IdentifierCollision { .. })));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    functions: FunctionMap,
    operators: OperatorMap,
    constants: ConstantMap,
}

impl Registry {
    /// A registry with no definitions; only numeric literals can be evaluated.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a registry from functions, operators and constants, in that order.
    pub fn new<F, O, C>(functions: F, operators: O, constants: C) -> Result<Self>
    where
        F: IntoIterator<Item = Function>,
        O: IntoIterator<Item = Operator>,
        C: IntoIterator<Item = NumberConstant>,
    {
        let mut registry = Self::empty();
        for function in functions {
            registry.insert_function(function)?;
        }
        for operator in operators {
            registry.insert_operator(operator)?;
        }
        for constant in constants {
            registry.insert_constant(constant)?;
        }
        Ok(registry)
    }

    /// The standard operators, functions and constants from [`crate::functions`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            crate::functions::standard_functions()?,
            crate::functions::standard_operators()?,
            crate::functions::standard_constants()?,
        )
    }

    fn insert_function(&mut self, function: Function) -> Result<()> {
        let key = function.key().clone();
        if self.functions.contains_key(&key) {
            return Err(collision(&key, "function"));
        }
        self.functions
            .insert(key, function)
            .map_err(|_| ExprError::CapacityExceeded("functions"))?;
        Ok(())
    }

    fn insert_operator(&mut self, operator: Operator) -> Result<()> {
        let symbol = operator.symbol();
        if self.operators.contains_key(&symbol) {
            return Err(ExprError::IdentifierCollision {
                identifier: symbol.to_string(),
                existing: "operator",
            });
        }
        self.operators
            .insert(symbol, operator)
            .map_err(|_| ExprError::CapacityExceeded("operators"))?;
        Ok(())
    }

    fn insert_constant(&mut self, constant: NumberConstant) -> Result<()> {
        let key = constant.key().clone();
        if self.constants.contains_key(&key) {
            return Err(collision(&key, "constant"));
        }
        if self.functions.contains_key(&key) {
            return Err(collision(&key, "function"));
        }
        if let Some(symbol) = constant.as_symbol() {
            if self.operators.contains_key(&symbol) {
                return Err(collision(&key, "operator"));
            }
        }
        self.constants
            .insert(key, constant)
            .map_err(|_| ExprError::CapacityExceeded("constants"))?;
        Ok(())
    }

    pub fn operator(&self, symbol: char) -> Option<&Operator> {
        self.operators.get(&symbol)
    }

    /// Looks up a function; names longer than an [`Identifier`] are never registered.
    pub fn function(&self, name: &str) -> Option<&Function> {
        let key = name.try_into_identifier().ok()?;
        self.functions.get(&key)
    }

    /// Looks up a constant by name or by its symbol written as a string.
    pub fn constant(&self, identifier: &str) -> Option<&NumberConstant> {
        let key = identifier.try_into_identifier().ok()?;
        self.constants.get(&key)
    }

    pub fn constant_symbol(&self, symbol: char) -> Option<&NumberConstant> {
        let key = symbol.try_into_identifier().ok()?;
        self.constants.get(&key)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.operators.values()
    }

    pub fn constants(&self) -> impl Iterator<Item = &NumberConstant> {
        self.constants.values()
    }
}

fn collision(identifier: &Identifier, existing: &'static str) -> ExprError {
    ExprError::IdentifierCollision {
        identifier: identifier.as_str().to_string(),
        existing,
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.functions.keys().collect::<alloc::vec::Vec<_>>())
            .field("operators", &self.operators.keys().collect::<alloc::vec::Vec<_>>())
            .field("constants", &self.constants.keys().collect::<alloc::vec::Vec<_>>())
            .finish()
    }
}
