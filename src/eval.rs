//! Evaluation of syntax trees.
//!
//! A single bottom-up pass driven by an explicit stack, so arbitrarily deep trees
//! never grow the call stack. Every node evaluates its children and combines them
//! with the operator or function bound at build time. Errors returned by a mapping
//! are passed through untouched; missing children are reported as internal errors.

extern crate alloc;

use crate::Real;
use crate::ast::{Ast, Node, NodeId};
use crate::error::{ExprError, Result};
use alloc::vec::Vec;

/// Initial capacity for the work and value stacks.
const INITIAL_STACK_CAPACITY: usize = 32;

/// Pending work for the evaluation loop.
#[derive(Debug, Clone, Copy)]
enum EvalOp {
    /// Evaluate a node, or schedule its children first.
    Visit(NodeId),
    /// Combine the already evaluated children of an operation or call.
    Complete(NodeId),
}

impl<'arena, 'reg> Ast<'arena, 'reg> {
    /// Evaluates the whole tree.
    pub fn evaluate(&self) -> Result<Real> {
        self.evaluate_node(self.root())
    }

    /// Evaluates the subtree rooted at `id`.
    pub fn evaluate_node(&self, id: NodeId) -> Result<Real> {
        let mut ops: Vec<EvalOp> = Vec::with_capacity(INITIAL_STACK_CAPACITY);
        let mut values: Vec<Real> = Vec::with_capacity(INITIAL_STACK_CAPACITY);
        ops.push(EvalOp::Visit(id));

        while let Some(op) = ops.pop() {
            match op {
                EvalOp::Visit(id) => self.visit(id, &mut ops, &mut values)?,
                EvalOp::Complete(id) => self.complete(id, &mut values)?,
            }
        }

        match (values.pop(), values.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(ExprError::InternalConsistency(
                "evaluation left an unbalanced value stack",
            )),
        }
    }

    fn lookup(&self, id: NodeId) -> Result<&Node<'arena, 'reg>> {
        self.node(id)
            .ok_or(ExprError::InternalConsistency("node index out of bounds"))
    }

    fn visit(&self, id: NodeId, ops: &mut Vec<EvalOp>, values: &mut Vec<Real>) -> Result<()> {
        match self.lookup(id)? {
            Node::Value(value) => values.push(*value),
            Node::Operation { left, right, .. } => {
                let (Some(left), Some(right)) = (left, right) else {
                    return Err(ExprError::InternalConsistency(
                        "operation evaluated while missing an operand",
                    ));
                };
                // Popped in reverse: left is evaluated before right.
                ops.push(EvalOp::Complete(id));
                ops.push(EvalOp::Visit(*right));
                ops.push(EvalOp::Visit(*left));
            }
            Node::FunctionCall { arguments, .. } => {
                if arguments.is_empty() {
                    return Err(ExprError::InternalConsistency(
                        "function call evaluated with zero arguments",
                    ));
                }
                ops.push(EvalOp::Complete(id));
                ops.extend(arguments.iter().rev().map(|&argument| EvalOp::Visit(argument)));
            }
            Node::Parenthesis { child } => match child {
                Some(child) => ops.push(EvalOp::Visit(*child)),
                None => {
                    return Err(ExprError::InternalConsistency(
                        "empty parenthesis evaluated",
                    ));
                }
            },
        }
        Ok(())
    }

    fn complete(&self, id: NodeId, values: &mut Vec<Real>) -> Result<()> {
        let underflow = ExprError::InternalConsistency("value stack underflow");

        let value = match self.lookup(id)? {
            Node::Operation { operator, .. } => {
                let right = values.pop().ok_or(underflow.clone())?;
                let left = values.pop().ok_or(underflow)?;
                operator.apply(left, right)?
            }
            Node::FunctionCall {
                function,
                arguments,
            } => {
                let start = values
                    .len()
                    .checked_sub(arguments.len())
                    .ok_or(underflow)?;
                let result = function.call(&values[start..])?;
                values.truncate(start);
                result
            }
            Node::Value(_) | Node::Parenthesis { .. } => {
                return Err(ExprError::InternalConsistency(
                    "completion scheduled for a leaf or parenthesis",
                ));
            }
        };
        values.push(value);
        Ok(())
    }
}
