//! Type definitions for the expression pipeline.
//!
//! This module contains the token representation shared by the lexer, preprocessor and
//! tree builder, the character sets that define the input alphabet, and the registry
//! entry types (operators, functions and constants) callers use to configure evaluation.

extern crate alloc;

use crate::Real;
use crate::error::{ExprError, MappingResult, Result};
use alloc::string::ToString;
use alloc::sync::Arc;
use core::fmt;

/// Characters that may be registered as binary operators.
pub const OPERATOR_SYMBOLS: [char; 12] = [
    '+', '-', '*', '/', '^', '%', ':', '&', '#', '@', '>', '<',
];

/// Single code points that may be registered as symbolic constants.
pub const NUMBER_SYMBOLS: [char; 24] = [
    'α', 'χ', 'δ', 'β', 'ε', 'φ', 'γ', 'η', 'ι', 'κ', 'λ', 'μ', 'ν', 'ο', 'π', 'θ', 'ρ', 'σ',
    'τ', 'υ', 'ω', 'ξ', 'ψ', 'ζ',
];

/// Maximum length in bytes of a function or constant identifier.
pub const MAX_IDENTIFIER_LEN: usize = 32;
/// Capacity of the function table (must be a power of two).
pub const MAX_FUNCTIONS: usize = 64;
/// Capacity of the constant table (must be a power of two).
pub const MAX_CONSTANTS: usize = 64;
/// Capacity of the operator table; one slot per operator symbol is enough.
pub const MAX_OPERATORS: usize = 16;

/// Fixed-capacity identifier used as a registry key.
pub type Identifier = heapless::String<MAX_IDENTIFIER_LEN>;

/// Helper trait to convert string slices into registry identifiers.
pub trait TryIntoIdentifier {
    fn try_into_identifier(&self) -> Result<Identifier>;
}

impl TryIntoIdentifier for str {
    fn try_into_identifier(&self) -> Result<Identifier> {
        let mut identifier = Identifier::new();
        identifier
            .push_str(self)
            .map_err(|_| ExprError::StringTooLong)?;
        Ok(identifier)
    }
}

impl TryIntoIdentifier for char {
    fn try_into_identifier(&self) -> Result<Identifier> {
        let mut identifier = Identifier::new();
        identifier
            .push(*self)
            .map_err(|_| ExprError::StringTooLong)?;
        Ok(identifier)
    }
}

pub fn is_operator_symbol(c: char) -> bool {
    OPERATOR_SYMBOLS.contains(&c)
}

pub fn is_number_symbol(c: char) -> bool {
    NUMBER_SYMBOLS.contains(&c)
}

/// Checks `name` against `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Classifies a token produced by the lexer or rewritten by the preprocessor.
///
/// Names borrow from the input text, so a token stream never outlives the
/// expression it was read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind<'a> {
    OpeningParenthesis,
    ClosingParenthesis,
    Comma,
    /// A numeric literal and its parsed value.
    Number(Real),
    /// An identifier not yet known to be a function or a constant.
    Name(&'a str),
    /// A single-character constant reference such as `π`.
    NumberSymbol(char),
    OperatorSymbol(char),
    /// A name followed by an opening parenthesis.
    FunctionName(&'a str),
    /// A name used as a constant reference.
    NumberName(&'a str),
}

/// A token with its location in the input text.
///
/// `position` and `length` are counted in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub position: usize,
    pub length: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, position: usize, length: usize) -> Self {
        Self {
            kind,
            position,
            length,
        }
    }

    pub fn opening_parenthesis(position: usize) -> Self {
        Self::new(TokenKind::OpeningParenthesis, position, 1)
    }

    pub fn closing_parenthesis(position: usize) -> Self {
        Self::new(TokenKind::ClosingParenthesis, position, 1)
    }

    pub fn comma(position: usize) -> Self {
        Self::new(TokenKind::Comma, position, 1)
    }

    pub fn number(value: Real, position: usize, length: usize) -> Self {
        Self::new(TokenKind::Number(value), position, length)
    }

    pub fn name(name: &'a str, position: usize) -> Self {
        Self::new(TokenKind::Name(name), position, name.chars().count())
    }

    pub fn number_symbol(symbol: char, position: usize) -> Self {
        Self::new(TokenKind::NumberSymbol(symbol), position, 1)
    }

    pub fn operator_symbol(symbol: char, position: usize) -> Self {
        Self::new(TokenKind::OperatorSymbol(symbol), position, 1)
    }

    /// Same location, different kind.
    pub fn with_kind(self, kind: TokenKind<'a>) -> Self {
        Self { kind, ..self }
    }
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::OpeningParenthesis => write!(f, "("),
            TokenKind::ClosingParenthesis => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Number(value) => write!(f, "{}", value),
            TokenKind::Name(name) | TokenKind::FunctionName(name) | TokenKind::NumberName(name) => {
                write!(f, "{}", name)
            }
            TokenKind::NumberSymbol(symbol) | TokenKind::OperatorSymbol(symbol) => {
                write!(f, "{}", symbol)
            }
        }
    }
}

/// Shared implementation of a binary operator.
pub type OperatorMapping = Arc<dyn Fn(Real, Real) -> MappingResult + Send + Sync>;

/// Shared implementation of a variadic function.
pub type FunctionMapping = Arc<dyn Fn(&[Real]) -> MappingResult + Send + Sync>;

/// A binary operator bound to one of the [`OPERATOR_SYMBOLS`].
///
/// Operators with a higher `precedence` bind tighter. Operators of equal
/// precedence are applied left to right.
///
/// ```
/// use math_eval::types::Operator;
///
/// let plus = Operator::infallible('+', 0, |a, b| a + b).unwrap();
/// assert_eq!(plus.symbol(), '+');
/// assert_eq!(plus.apply(1.0, 2.0), Ok(3.0));
///
/// assert!(Operator::infallible('$', 0, |a, b| a + b).is_err());
/// ```
#[derive(Clone)]
pub struct Operator {
    symbol: char,
    precedence: u32,
    mapping: OperatorMapping,
}

impl Operator {
    pub fn new<F>(symbol: char, precedence: u32, mapping: F) -> Result<Self>
    where
        F: Fn(Real, Real) -> MappingResult + Send + Sync + 'static,
    {
        if !is_operator_symbol(symbol) {
            return Err(ExprError::InvalidIdentifier {
                identifier: symbol.to_string(),
                reason: "not an operator symbol",
            });
        }
        Ok(Self {
            symbol,
            precedence,
            mapping: Arc::new(mapping),
        })
    }

    /// Wraps a mapping that cannot fail.
    pub fn infallible<F>(symbol: char, precedence: u32, mapping: F) -> Result<Self>
    where
        F: Fn(Real, Real) -> Real + Send + Sync + 'static,
    {
        Self::new(symbol, precedence, move |a, b| Ok(mapping(a, b)))
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    pub fn apply(&self, left: Real, right: Real) -> MappingResult {
        (self.mapping)(left, right)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("precedence", &self.precedence)
            .finish_non_exhaustive()
    }
}

/// A named function taking any number of arguments.
///
/// The crate does not check arity; a mapping that only accepts a fixed
/// number of arguments reports the mismatch through its own [`MappingError`].
///
/// [`MappingError`]: crate::error::MappingError
#[derive(Clone)]
pub struct Function {
    name: Identifier,
    mapping: FunctionMapping,
}

impl Function {
    pub fn new<F>(name: &str, mapping: F) -> Result<Self>
    where
        F: Fn(&[Real]) -> MappingResult + Send + Sync + 'static,
    {
        if !is_identifier(name) {
            return Err(ExprError::InvalidIdentifier {
                identifier: name.to_string(),
                reason: "function names must match [A-Za-z_][A-Za-z0-9_]*",
            });
        }
        Ok(Self {
            name: name.try_into_identifier()?,
            mapping: Arc::new(mapping),
        })
    }

    /// Wraps a mapping that cannot fail.
    pub fn infallible<F>(name: &str, mapping: F) -> Result<Self>
    where
        F: Fn(&[Real]) -> Real + Send + Sync + 'static,
    {
        Self::new(name, move |args| Ok(mapping(args)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn key(&self) -> &Identifier {
        &self.name
    }

    pub fn call(&self, arguments: &[Real]) -> MappingResult {
        (self.mapping)(arguments)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name.as_str())
            .finish_non_exhaustive()
    }
}

/// A constant referenced either by a number symbol (`π`) or by a name (`pi`).
#[derive(Debug, Clone, PartialEq)]
pub struct NumberConstant {
    identifier: Identifier,
    value: Real,
}

impl NumberConstant {
    pub fn symbol(symbol: char, value: Real) -> Result<Self> {
        if !is_number_symbol(symbol) {
            return Err(ExprError::InvalidIdentifier {
                identifier: symbol.to_string(),
                reason: "not a number symbol",
            });
        }
        Ok(Self {
            identifier: symbol.try_into_identifier()?,
            value,
        })
    }

    pub fn named(name: &str, value: Real) -> Result<Self> {
        if !is_identifier(name) {
            return Err(ExprError::InvalidIdentifier {
                identifier: name.to_string(),
                reason: "constant names must match [A-Za-z_][A-Za-z0-9_]*",
            });
        }
        Ok(Self {
            identifier: name.try_into_identifier()?,
            value,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn key(&self) -> &Identifier {
        &self.identifier
    }

    /// The symbol, if this constant is referenced by a single character.
    pub fn as_symbol(&self) -> Option<char> {
        let mut chars = self.identifier.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    pub fn value(&self) -> Real {
        self.value
    }
}
