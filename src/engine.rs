//! Syntax-tree construction and the evaluation entry points.
//!
//! The [`TreeBuilder`] consumes a preprocessed token stream one token at a time,
//! keeping a single stack of the nodes that can still receive a child (operations,
//! function calls and parentheses). Precedence is handled without lookahead: when an
//! operator arrives, finished operations that bind at least as tightly are popped,
//! and the new operation takes over the pending operand slot of whatever frame is
//! left on top.

extern crate alloc;

use crate::Real;
use crate::ast::{Ast, Node, NodeId};
use crate::context::Registry;
use crate::error::{ExprError, Result};
use crate::lexer::tokenize;
use crate::preprocessor::preprocess;
use crate::types::{Token, TokenKind};
use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;

fn not_found(message: &'static str, token: &Token<'_>) -> ExprError {
    ExprError::Syntax {
        message,
        position: token.position,
        length: token.length,
    }
}

/// Incremental builder turning preprocessed tokens into an [`Ast`].
pub struct TreeBuilder<'arena, 'reg> {
    registry: &'reg Registry,
    arena: &'arena Bump,
    nodes: BumpVec<'arena, Node<'arena, 'reg>>,
    /// Open frames, innermost last. Values are never pushed.
    stack: BumpVec<'arena, NodeId>,
    root: Option<NodeId>,
}

impl<'arena, 'reg> TreeBuilder<'arena, 'reg> {
    pub fn new(registry: &'reg Registry, arena: &'arena Bump) -> Self {
        Self {
            registry,
            arena,
            nodes: BumpVec::new_in(arena),
            stack: BumpVec::new_in(arena),
            root: None,
        }
    }

    fn alloc(&mut self, node: Node<'arena, 'reg>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn top(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    /// Stores `child` in the pending slot of the innermost open frame.
    fn attach(&mut self, child: NodeId) -> Result<()> {
        let Some(top) = self.top() else {
            if self.root.is_some() {
                return Err(ExprError::InternalConsistency(
                    "second root node in one expression",
                ));
            }
            self.root = Some(child);
            return Ok(());
        };

        match &mut self.nodes[top.0] {
            Node::Operation { right: slot, .. } | Node::Parenthesis { child: slot } => {
                if slot.is_some() {
                    return Err(ExprError::InternalConsistency("operand slot already filled"));
                }
                *slot = Some(child);
            }
            Node::FunctionCall { arguments, .. } => arguments.push(child),
            Node::Value(_) => {
                return Err(ExprError::InternalConsistency("value on the builder stack"));
            }
        }
        Ok(())
    }

    /// Removes and returns the most recent child of the innermost open frame.
    fn take_pending(&mut self) -> Result<NodeId> {
        let pending = match self.top() {
            None => self.root.take(),
            Some(top) => match &mut self.nodes[top.0] {
                Node::Operation { right: slot, .. } | Node::Parenthesis { child: slot } => {
                    slot.take()
                }
                Node::FunctionCall { arguments, .. } => arguments.pop(),
                Node::Value(_) => None,
            },
        };
        pending.ok_or(ExprError::InternalConsistency("operator without a left operand"))
    }

    fn top_precedence(&self) -> Option<u32> {
        match &self.nodes[self.top()?.0] {
            Node::Operation { operator, .. } => Some(operator.precedence()),
            _ => None,
        }
    }

    /// Pops finished operations up to and including the innermost parenthesis.
    fn close_parenthesis(&mut self) -> Result<()> {
        while let Some(top) = self.stack.pop() {
            match self.nodes[top.0] {
                Node::Operation { .. } => continue,
                Node::Parenthesis { .. } => return Ok(()),
                Node::FunctionCall { .. } | Node::Value(_) => break,
            }
        }
        Err(ExprError::InternalConsistency(
            "closing a parenthesis that was never opened",
        ))
    }

    fn top_is_function_call(&self) -> bool {
        self.top()
            .is_some_and(|top| matches!(self.nodes[top.0], Node::FunctionCall { .. }))
    }

    fn push_value(&mut self, value: Real) -> Result<()> {
        let id = self.alloc(Node::Value(value));
        self.attach(id)
    }

    /// Attaches a new frame and makes it the innermost one.
    fn open(&mut self, node: Node<'arena, 'reg>) -> Result<()> {
        let id = self.alloc(node);
        self.attach(id)?;
        self.stack.push(id);
        Ok(())
    }

    /// Feeds one token to the builder.
    pub fn push_token(&mut self, token: &Token<'_>) -> Result<()> {
        let registry = self.registry;

        match token.kind {
            TokenKind::Number(value) => self.push_value(value),
            TokenKind::NumberName(name) => {
                let constant = registry
                    .constant(name)
                    .ok_or_else(|| not_found("Constant Not Found", token))?;
                self.push_value(constant.value())
            }
            TokenKind::NumberSymbol(symbol) => {
                let constant = registry
                    .constant_symbol(symbol)
                    .ok_or_else(|| not_found("Constant Not Found", token))?;
                self.push_value(constant.value())
            }
            TokenKind::FunctionName(name) => {
                let function = registry
                    .function(name)
                    .ok_or_else(|| not_found("Function Not Found", token))?;
                let arguments = BumpVec::new_in(self.arena);
                self.open(Node::FunctionCall {
                    function,
                    arguments,
                })
            }
            TokenKind::OperatorSymbol(symbol) => {
                let operator = registry
                    .operator(symbol)
                    .ok_or_else(|| not_found("Operator Not Found", token))?;

                // Equal precedence finishes the earlier operation first.
                while self
                    .top_precedence()
                    .is_some_and(|precedence| precedence >= operator.precedence())
                {
                    self.stack.pop();
                }

                let left = self.take_pending()?;
                self.open(Node::Operation {
                    operator,
                    left: Some(left),
                    right: None,
                })
            }
            TokenKind::OpeningParenthesis => self.open(Node::Parenthesis { child: None }),
            TokenKind::ClosingParenthesis => {
                self.close_parenthesis()?;
                // The parenthesis was an argument slot: the call is complete too.
                if self.top_is_function_call() {
                    self.stack.pop();
                }
                Ok(())
            }
            TokenKind::Comma => {
                self.close_parenthesis()?;
                if !self.top_is_function_call() {
                    return Err(ExprError::InternalConsistency(
                        "comma outside of a function call",
                    ));
                }
                self.open(Node::Parenthesis { child: None })
            }
            TokenKind::Name(_) => Err(ExprError::InternalConsistency(
                "unresolved name reached the tree builder",
            )),
        }
    }

    /// Completes the tree once every token has been pushed.
    pub fn finish(self) -> Result<Ast<'arena, 'reg>> {
        let all_closed = self
            .stack
            .iter()
            .all(|id| matches!(self.nodes[id.0], Node::Operation { .. }));
        if !all_closed {
            return Err(ExprError::InternalConsistency(
                "parenthesis left open at end of input",
            ));
        }
        let root = self
            .root
            .ok_or(ExprError::InternalConsistency("expression without a root node"))?;
        Ok(Ast::new(self.nodes, root))
    }
}

/// Builds a syntax tree from tokens that already went through [`preprocess`].
pub fn build<'arena, 'reg>(
    tokens: &[Token<'_>],
    registry: &'reg Registry,
    arena: &'arena Bump,
) -> Result<Ast<'arena, 'reg>> {
    let mut builder = TreeBuilder::new(registry, arena);
    for token in tokens {
        builder.push_token(token)?;
    }
    builder.finish()
}

/// Lexes, validates and builds `expression` into a tree allocated in `arena`.
pub fn parse<'arena, 'reg>(
    expression: &str,
    registry: &'reg Registry,
    arena: &'arena Bump,
) -> Result<Ast<'arena, 'reg>> {
    if expression.is_empty() {
        return Err(ExprError::EmptyExpression);
    }
    let tokens = tokenize(expression)?;
    let tokens = preprocess(&tokens)?;
    build(&tokens, registry, arena)
}

/// Evaluates `expression` against `registry`.
///
/// ```
/// use math_eval::context::Registry;
/// use math_eval::engine::interp;
/// use math_eval::error::ExprError;
///
/// let registry = Registry::with_defaults().unwrap();
/// assert_eq!(interp("1+2*3-4", &registry).unwrap(), 3.0);
/// assert_eq!(interp("", &registry), Err(ExprError::EmptyExpression));
/// ```
pub fn interp(expression: &str, registry: &Registry) -> Result<Real> {
    let arena = Bump::new();
    let ast = parse(expression, registry, &arena)?;
    ast.evaluate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;
    use crate::types::{Function, NumberConstant, Operator};
    use alloc::format;
    use alloc::string::{String, ToString};

    fn registry() -> Registry {
        Registry::new(
            [
                Function::infallible("ln", |args| args[0].ln()).unwrap(),
                Function::infallible("mv2", |args| args[0] + args[1]).unwrap(),
                Function::infallible("neg", |args| -args[0]).unwrap(),
            ],
            [
                Operator::infallible('+', 0, |a, b| a + b).unwrap(),
                Operator::infallible('-', 0, |a, b| a - b).unwrap(),
                Operator::infallible('*', 1, |a, b| a * b).unwrap(),
                Operator::new('/', 1, |a, b| {
                    if b == 0.0 {
                        Err(MappingError::new("Division by zero is not allowed"))
                    } else {
                        Ok(a / b)
                    }
                })
                .unwrap(),
                Operator::infallible('^', 2, |a, b| a.powf(b)).unwrap(),
            ],
            [
                NumberConstant::symbol('π', core::f64::consts::PI).unwrap(),
                NumberConstant::named("two", 2.0).unwrap(),
            ],
        )
        .unwrap()
    }

    fn shape(expression: &str) -> String {
        let registry = registry();
        let arena = Bump::new();
        parse(expression, &registry, &arena)
            .unwrap_or_else(|e| panic!("Parse error for {:?}: {}", expression, e))
            .to_string()
    }

    #[test]
    fn test_left_to_right_for_equal_precedence() {
        assert_eq!(shape("1-2+3"), "((1 - 2) + 3)");
        assert_eq!(shape("1+2-3"), "((1 + 2) - 3)");
        assert_eq!(shape("8/4/2"), "((8 / 4) / 2)");
    }

    #[test]
    fn test_higher_precedence_binds_tighter() {
        assert_eq!(shape("1+2*3"), "(1 + (2 * 3))");
        assert_eq!(shape("2*3+1"), "((2 * 3) + 1)");
        assert_eq!(shape("1+2*3-4"), "((1 + (2 * 3)) - 4)");
        assert_eq!(shape("1+2*3^2*4+5"), "((1 + ((2 * (3 ^ 2)) * 4)) + 5)");
    }

    #[test]
    fn test_parenthesis_groups() {
        assert_eq!(shape("(1+2)*3"), "((1 + 2) * 3)");
        assert_eq!(shape("2*(1+1)+3"), "((2 * (1 + 1)) + 3)");
        assert_eq!(shape("((1))"), "1");
        assert_eq!(shape("2*((1+1))"), "(2 * (1 + 1))");
    }

    #[test]
    fn test_function_calls_are_terms() {
        assert_eq!(shape("ln(1)"), "ln(1)");
        assert_eq!(shape("mv2(1,2*3)"), "mv2(1, (2 * 3))");
        assert_eq!(shape("1*neg(2)+3"), "((1 * neg(2)) + 3)");
        assert_eq!(shape("neg(neg(1))+2"), "(neg(neg(1)) + 2)");
        assert_eq!(shape("mv2(ln(2/3)-4,5/(6+7))"), "mv2((ln((2 / 3)) - 4), (5 / (6 + 7)))");
        assert_eq!(shape("(mv2(1,2))*two"), "(mv2(1, 2) * 2)");
    }

    #[test]
    fn test_deep_trees_render() {
        let depth = 50_000;
        let nested = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(shape(&nested), "1");

        let chain = format!("{}1", "1-".repeat(depth));
        let rendered = shape(&chain);
        assert!(rendered.starts_with(&format!("{}1 - 1) - 1)", "(".repeat(depth))));
        assert!(rendered.ends_with(") - 1) - 1)"));
    }

    #[test]
    fn test_constants_are_resolved() {
        assert_eq!(shape("two*π"), format!("(2 * {})", core::f64::consts::PI));
    }

    #[test]
    fn test_unknown_identifiers() {
        let registry = registry();
        let arena = Bump::new();
        let span = |expression: &str| {
            parse(expression, &registry, &arena)
                .map(|ast| ast.to_string())
                .unwrap_err()
        };

        assert_eq!(
            span("1+foo(2)"),
            ExprError::Syntax {
                message: "Function Not Found",
                position: 2,
                length: 3
            }
        );
        assert_eq!(
            span("1%2"),
            ExprError::Syntax {
                message: "Operator Not Found",
                position: 1,
                length: 1
            }
        );
        assert_eq!(
            span("1+three"),
            ExprError::Syntax {
                message: "Constant Not Found",
                position: 2,
                length: 5
            }
        );
        assert_eq!(
            span("ω"),
            ExprError::Syntax {
                message: "Constant Not Found",
                position: 0,
                length: 1
            }
        );
    }

    #[test]
    fn test_interp_pipeline() {
        let registry = registry();
        assert_eq!(interp("1-2+3", &registry), Ok(2.0));
        assert_eq!(interp("two^3*2", &registry), Ok(16.0));
        assert_eq!(interp("", &registry), Err(ExprError::EmptyExpression));
        assert_eq!(interp("  ", &registry), Err(ExprError::EmptyExpression));
        assert_eq!(
            interp("1/(2-2)", &registry),
            Err(ExprError::Mapping(MappingError::new(
                "Division by zero is not allowed"
            )))
        );
    }

    #[test]
    fn test_builder_rejects_unprocessed_tokens() {
        let registry = registry();
        let arena = Bump::new();
        let err = build(&[Token::name("two", 0)], &registry, &arena).unwrap_err();
        assert!(err.is_internal());

        let err = build(&[Token::closing_parenthesis(0)], &registry, &arena).unwrap_err();
        assert!(err.is_internal());

        let err = build(&[Token::opening_parenthesis(0)], &registry, &arena).unwrap_err();
        assert!(err.is_internal());
    }
}
