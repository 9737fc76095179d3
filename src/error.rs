//! Error types and handling for the math-eval crate.
//!
//! Every stage of the pipeline (lexer, preprocessor, tree builder, evaluator) and
//! registry construction reports failures through the single [`ExprError`] type.
//! Errors caused by the input text carry the character position and length of the
//! offending sequence so callers can point at it.

extern crate alloc;
use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

/// Result type used throughout the crate.
///
/// This is a convenience type alias that uses the `ExprError` type for the error variant.
pub type Result<T> = core::result::Result<T, ExprError>;

/// Result type returned by caller-supplied operator and function mappings.
pub type MappingResult = core::result::Result<crate::Real, MappingError>;

/// Failure raised by a registered operator or function mapping.
///
/// The evaluator never inspects or rewrites these: whatever a mapping returns is
/// handed back to the caller inside [`ExprError::Mapping`].
///
/// ```
/// use math_eval::error::MappingError;
///
/// let err = MappingError::new("Division by zero is not allowed");
/// assert_eq!(err.message(), "Division by zero is not allowed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingError {
    message: Cow<'static, str>,
}

impl MappingError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for MappingError {}

/// Error type for expression parsing and evaluation.
///
/// This enum represents all possible errors that can occur while building a
/// registry, tokenizing, validating, building the syntax tree and evaluating it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    /// The input string has zero length (or contains nothing but spaces).
    EmptyExpression,

    /// Error during lexical analysis (tokenization).
    ///
    /// Raised for a character outside the legal alphabet (length 1) or for a
    /// run of legal characters that does not form a complete token, such as
    /// `1.` with no digits after the decimal point.
    Lexical {
        message: &'static str,
        /// Character offset of the sequence in the input.
        position: usize,
        /// Number of characters in the offending sequence.
        length: usize,
    },

    /// Error during syntax analysis.
    ///
    /// Covers token-adjacency violations, commas outside of a function call's
    /// argument list and identifiers that are not registered
    /// ("Function Not Found", "Operator Not Found", "Constant Not Found").
    Syntax {
        message: &'static str,
        position: usize,
        length: usize,
    },

    /// Error for unbalanced parentheses in an expression.
    ///
    /// Reports the earliest parenthesis that has no partner.
    UnmatchedParenthesis { position: usize, found: char },

    /// An invariant of the tree builder or evaluator was violated.
    ///
    /// This never results from user input; it indicates a defect in the crate.
    InternalConsistency(&'static str),

    /// A registered operator or function mapping failed.
    Mapping(MappingError),

    /// A registry entry was defined with an identifier that is not allowed for its kind.
    InvalidIdentifier {
        identifier: String,
        reason: &'static str,
    },

    /// Two registry entries share an identifier.
    IdentifierCollision {
        identifier: String,
        /// Kind of the entry that already owns the identifier.
        existing: &'static str,
    },

    /// Error when capacity is exceeded for a heapless container.
    ///
    /// The string indicates which registry table exceeded capacity.
    CapacityExceeded(&'static str),

    /// Error when an identifier is too long for the heapless string buffer.
    StringTooLong,
}

impl ExprError {
    /// Returns `(position, length)` for errors attributable to a span of the input.
    pub fn span(&self) -> Option<(usize, usize)> {
        match self {
            ExprError::Lexical {
                position, length, ..
            }
            | ExprError::Syntax {
                position, length, ..
            } => Some((*position, *length)),
            ExprError::UnmatchedParenthesis { position, .. } => Some((*position, 1)),
            _ => None,
        }
    }

    /// Whether this error signals a defect in the crate rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, ExprError::InternalConsistency(_))
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::EmptyExpression => write!(f, "Empty expression"),
            ExprError::Lexical {
                message,
                position,
                length,
            } => write!(
                f,
                "Lexical error: {} at position {} (length {})",
                message, position, length
            ),
            ExprError::Syntax {
                message,
                position,
                length,
            } => write!(
                f,
                "Syntax error: {} at position {} (length {})",
                message, position, length
            ),
            ExprError::UnmatchedParenthesis { position, found } => {
                write!(
                    f,
                    "Unmatched parenthesis at position {}: found '{}'",
                    position, found
                )
            }
            ExprError::InternalConsistency(err) => {
                write!(f, "Internal consistency error: {}", err)
            }
            ExprError::Mapping(err) => write!(f, "{}", err),
            ExprError::InvalidIdentifier { identifier, reason } => {
                write!(f, "Invalid identifier '{}': {}", identifier, reason)
            }
            ExprError::IdentifierCollision {
                identifier,
                existing,
            } => write!(
                f,
                "Identifier '{}' is already used by a {}",
                identifier, existing
            ),
            ExprError::CapacityExceeded(container_type) => {
                write!(f, "Capacity exceeded for {}", container_type)
            }
            ExprError::StringTooLong => write!(f, "String too long for heapless buffer"),
        }
    }
}

impl core::error::Error for ExprError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ExprError::Mapping(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MappingError> for ExprError {
    fn from(err: MappingError) -> ExprError {
        ExprError::Mapping(err)
    }
}
