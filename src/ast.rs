//! Arena-backed abstract syntax tree.
//!
//! Nodes live in a `bumpalo` vector owned by the [`Ast`]; children are referenced by
//! [`NodeId`] index, which lets the tree builder rewire an operation's right operand
//! in place without back pointers. Operators and functions are bound to their
//! registry entries while the tree is built, so evaluation never looks anything up.

extern crate alloc;

use crate::Real;
use crate::types::{Function, Operator};
use alloc::vec;
use bumpalo::collections::Vec as BumpVec;
use core::fmt;

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A syntax tree node.
///
/// `Operation` and `Parenthesis` temporarily miss children while the tree is under
/// construction; a finished tree always has them filled in.
#[derive(Debug)]
pub enum Node<'arena, 'reg> {
    /// A literal or a resolved constant.
    Value(Real),
    Operation {
        operator: &'reg Operator,
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
    /// A call with its argument expressions in textual order.
    FunctionCall {
        function: &'reg Function,
        arguments: BumpVec<'arena, NodeId>,
    },
    /// Purely structural; evaluates to its child.
    Parenthesis { child: Option<NodeId> },
}

/// A parsed expression, ready to be evaluated any number of times.
pub struct Ast<'arena, 'reg> {
    nodes: BumpVec<'arena, Node<'arena, 'reg>>,
    root: NodeId,
}

impl<'arena, 'reg> Ast<'arena, 'reg> {
    pub(crate) fn new(nodes: BumpVec<'arena, Node<'arena, 'reg>>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<'arena, 'reg>> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: Option<NodeId>) -> fmt::Result {
        // Pieces are popped, so each node pushes its parts in reverse.
        let mut pending = vec![Piece::Node(id)];

        while let Some(piece) = pending.pop() {
            let id = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Symbol(symbol) => {
                    write!(f, " {} ", symbol)?;
                    continue;
                }
                Piece::Node(id) => id,
            };

            let Some(node) = id.and_then(|id| self.node(id)) else {
                f.write_str("?")?;
                continue;
            };
            match node {
                Node::Value(value) => write!(f, "{}", value)?,
                Node::Operation {
                    operator,
                    left,
                    right,
                } => {
                    pending.extend([
                        Piece::Text(")"),
                        Piece::Node(*right),
                        Piece::Symbol(operator.symbol()),
                        Piece::Node(*left),
                    ]);
                    f.write_str("(")?;
                }
                Node::FunctionCall {
                    function,
                    arguments,
                } => {
                    pending.push(Piece::Text(")"));
                    for (i, argument) in arguments.iter().enumerate().rev() {
                        pending.push(Piece::Node(Some(*argument)));
                        if i > 0 {
                            pending.push(Piece::Text(", "));
                        }
                    }
                    write!(f, "{}(", function.name())?;
                }
                Node::Parenthesis { child } => pending.push(Piece::Node(*child)),
            }
        }
        Ok(())
    }
}

/// Output still to be written by [`Ast::write_node`].
enum Piece {
    Node(Option<NodeId>),
    Text(&'static str),
    Symbol(char),
}

/// Renders the tree with every operation fully parenthesized, e.g. `((1 - 2) + 3)`.
impl fmt::Display for Ast<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, Some(self.root))
    }
}

impl fmt::Debug for Ast<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ast")
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .finish()
    }
}
