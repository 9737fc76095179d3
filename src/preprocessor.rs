//! Token-stream validation and name disambiguation.
//!
//! The preprocessor checks that the first and last tokens can begin and end an
//! expression, that every pair of neighbouring tokens is an allowed continuation,
//! that commas only appear directly inside a function call's argument list and that
//! parentheses balance. Along the way every `Name` is rewritten into either a
//! `FunctionName` (when a call parenthesis follows) or a `NumberName`.

extern crate alloc;

use crate::error::{ExprError, Result};
use crate::types::{Token, TokenKind};
use alloc::vec::Vec;

fn unexpected(token: &Token<'_>) -> ExprError {
    ExprError::Syntax {
        message: "Unexpected Token",
        position: token.position,
        length: token.length,
    }
}

fn can_start(kind: &TokenKind<'_>) -> bool {
    matches!(
        kind,
        TokenKind::Name(_)
            | TokenKind::Number(_)
            | TokenKind::NumberSymbol(_)
            | TokenKind::OpeningParenthesis
    )
}

fn can_end(kind: &TokenKind<'_>) -> bool {
    matches!(
        kind,
        TokenKind::Name(_)
            | TokenKind::Number(_)
            | TokenKind::NumberSymbol(_)
            | TokenKind::ClosingParenthesis
    )
}

/// Whether `next` may directly follow `current`.
fn may_follow(current: &TokenKind<'_>, next: &TokenKind<'_>) -> bool {
    use TokenKind::*;

    match current {
        Number(_) | NumberSymbol(_) | ClosingParenthesis | NumberName(_) => {
            matches!(next, OperatorSymbol(_) | Comma | ClosingParenthesis)
        }
        Name(_) => matches!(
            next,
            OpeningParenthesis | OperatorSymbol(_) | Comma | ClosingParenthesis
        ),
        FunctionName(_) => matches!(next, OpeningParenthesis),
        Comma | OperatorSymbol(_) | OpeningParenthesis => matches!(
            next,
            Number(_) | Name(_) | NumberSymbol(_) | OpeningParenthesis
        ),
    }
}

/// Validates `tokens` and resolves every `Name` into a `FunctionName` or `NumberName`.
///
/// ```
/// use math_eval::preprocessor::preprocess;
/// use math_eval::types::{Token, TokenKind};
///
/// let tokens = [
///     Token::name("ln", 0),
///     Token::opening_parenthesis(2),
///     Token::number(1.0, 3, 1),
///     Token::closing_parenthesis(4),
/// ];
/// let processed = preprocess(&tokens).unwrap();
/// assert_eq!(processed[0], Token::new(TokenKind::FunctionName("ln"), 0, 2));
/// assert_eq!(&processed[1..], &tokens[1..]);
/// ```
pub fn preprocess<'a>(tokens: &[Token<'a>]) -> Result<Vec<Token<'a>>> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(ExprError::EmptyExpression);
    };

    if !can_start(&first.kind) {
        return Err(unexpected(first));
    }
    if !can_end(&last.kind) {
        return Err(unexpected(last));
    }

    let mut result = Vec::with_capacity(tokens.len());

    // Positions of unmatched opening parentheses, innermost last. Call
    // parentheses are also recorded in `function_calls`.
    let mut open_parentheses: Vec<usize> = Vec::new();
    let mut function_calls: Vec<usize> = Vec::new();
    let mut unmatched_closing: Option<usize> = None;

    for pair in tokens.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);

        if !may_follow(&current.kind, &next.kind) {
            return Err(unexpected(next));
        }

        match current.kind {
            TokenKind::Name(name) => {
                if next.kind == TokenKind::OpeningParenthesis {
                    function_calls.push(next.position);
                    result.push(current.with_kind(TokenKind::FunctionName(name)));
                } else {
                    result.push(current.with_kind(TokenKind::NumberName(name)));
                }
            }
            TokenKind::Comma => {
                if function_calls.is_empty() || function_calls.last() != open_parentheses.last() {
                    return Err(unexpected(current));
                }
                result.push(*current);
            }
            TokenKind::OpeningParenthesis => {
                open_parentheses.push(current.position);
                result.push(*current);
            }
            _ => result.push(*current),
        }

        if next.kind == TokenKind::ClosingParenthesis {
            match open_parentheses.pop() {
                Some(opening) => {
                    if function_calls.last() == Some(&opening) {
                        function_calls.pop();
                    }
                }
                None => {
                    unmatched_closing.get_or_insert(next.position);
                }
            }
        }
    }

    // Nothing follows the last token, so a trailing name is a constant.
    match last.kind {
        TokenKind::Name(name) => result.push(last.with_kind(TokenKind::NumberName(name))),
        _ => result.push(*last),
    }

    let unmatched = match (open_parentheses.first(), unmatched_closing) {
        (Some(&opening), Some(closing)) if closing < opening => Some((closing, ')')),
        (Some(&opening), _) => Some((opening, '(')),
        (None, Some(closing)) => Some((closing, ')')),
        (None, None) => None,
    };
    if let Some((position, found)) = unmatched {
        return Err(ExprError::UnmatchedParenthesis { position, found });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use alloc::vec;

    fn syntax_span(tokens: &[Token<'_>]) -> (usize, usize) {
        match preprocess(tokens) {
            Err(err @ ExprError::Syntax { .. }) => err.span().unwrap(),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    fn preprocess_text(input: &str) -> Result<Vec<Token<'_>>> {
        preprocess(&tokenize(input)?)
    }

    #[test]
    fn test_number_symbol_followed_by_name() {
        let tokens = [Token::number_symbol('π', 0), Token::name("_abc", 1)];
        assert_eq!(syntax_span(&tokens), (1, 4));
    }

    #[test]
    fn test_number_followed_by_name() {
        let tokens = [Token::number(1.2, 0, 3), Token::name("ln", 3)];
        assert_eq!(syntax_span(&tokens), (3, 2));
    }

    #[test]
    fn test_number_followed_by_opening_parenthesis() {
        let tokens = [Token::number(1.0, 0, 1), Token::opening_parenthesis(1)];
        // The trailing parenthesis cannot end an expression.
        assert_eq!(syntax_span(&tokens), (1, 1));

        let tokens = [
            Token::number(1.0, 0, 1),
            Token::opening_parenthesis(1),
            Token::number(2.0, 2, 1),
            Token::closing_parenthesis(3),
        ];
        assert_eq!(syntax_span(&tokens), (1, 1));
    }

    #[test]
    fn test_comma_outside_function_call() {
        let tokens = [
            Token::number(123.0, 0, 3),
            Token::comma(3),
            Token::number(456.0, 4, 3),
        ];
        assert_eq!(syntax_span(&tokens), (3, 1));

        let tokens = [
            Token::name("fn123", 0),
            Token::comma(5),
            Token::number(456.0, 6, 3),
        ];
        assert_eq!(syntax_span(&tokens), (5, 1));
    }

    #[test]
    fn test_comma_inside_grouping_parenthesis_of_call() {
        let err = preprocess_text("f((1,2))").unwrap_err();
        assert_eq!(err.span(), Some((4, 1)));

        let err = preprocess_text("(1,2)").unwrap_err();
        assert_eq!(err.span(), Some((2, 1)));

        assert!(preprocess_text("f((1),2)").is_ok());
        assert!(preprocess_text("f(g(1,2),3)").is_ok());
    }

    #[test]
    fn test_boundary_tokens() {
        assert_eq!(syntax_span(&[Token::operator_symbol('+', 0)]), (0, 1));
        assert_eq!(syntax_span(&[Token::comma(0)]), (0, 1));
        assert_eq!(syntax_span(&[Token::opening_parenthesis(0)]), (0, 1));
        assert_eq!(syntax_span(&[Token::closing_parenthesis(0)]), (0, 1));

        let err = preprocess_text("1+2+").unwrap_err();
        assert_eq!(err.span(), Some((3, 1)));
        // Boundary checks run before the adjacency scan.
        let err = preprocess_text("1 2 +").unwrap_err();
        assert_eq!(err.span(), Some((4, 1)));
    }

    #[test]
    fn test_unmatched_parenthesis() {
        let tokens = [Token::opening_parenthesis(0), Token::number(1.0, 1, 1)];
        assert_eq!(
            preprocess(&tokens),
            Err(ExprError::UnmatchedParenthesis {
                position: 0,
                found: '('
            })
        );

        assert_eq!(
            preprocess_text("(1))+(2"),
            Err(ExprError::UnmatchedParenthesis {
                position: 3,
                found: ')'
            })
        );
        assert_eq!(
            preprocess_text("((1)"),
            Err(ExprError::UnmatchedParenthesis {
                position: 0,
                found: '('
            })
        );
    }

    #[test]
    fn test_name_disambiguation() {
        let tokens = [
            Token::name("ln", 0),
            Token::opening_parenthesis(2),
            Token::number(1.0, 3, 1),
            Token::closing_parenthesis(4),
        ];
        assert_eq!(
            preprocess(&tokens).unwrap(),
            vec![
                Token::new(TokenKind::FunctionName("ln"), 0, 2),
                Token::opening_parenthesis(2),
                Token::number(1.0, 3, 1),
                Token::closing_parenthesis(4),
            ]
        );

        let tokens = [
            Token::name("exp", 0),
            Token::operator_symbol('+', 3),
            Token::number(1.0, 4, 1),
        ];
        assert_eq!(
            preprocess(&tokens).unwrap(),
            vec![
                Token::new(TokenKind::NumberName("exp"), 0, 3),
                Token::operator_symbol('+', 3),
                Token::number(1.0, 4, 1),
            ]
        );
    }

    #[test]
    fn test_single_and_trailing_names_become_constants() {
        assert_eq!(
            preprocess(&[Token::name("x", 0)]).unwrap(),
            vec![Token::new(TokenKind::NumberName("x"), 0, 1)]
        );
        let processed = preprocess_text("1+tau").unwrap();
        assert_eq!(
            processed.last(),
            Some(&Token::new(TokenKind::NumberName("tau"), 2, 3))
        );
    }

    #[test]
    fn test_empty_token_stream() {
        assert_eq!(preprocess(&[]), Err(ExprError::EmptyExpression));
    }
}
