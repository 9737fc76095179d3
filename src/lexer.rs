//! Lexical scanner turning expression text into tokens.
//!
//! Every character is classified into a [`CharClass`]; anything outside the legal
//! alphabet is rejected at its own position. Tokens are the longest runs of a
//! valid shape: digits with an optional fractional part, identifiers, or a single
//! symbol, comma or parenthesis. Runs of spaces only advance the cursor.

extern crate alloc;

use crate::Real;
use crate::error::{ExprError, Result};
use crate::types::{Token, TokenKind, is_number_symbol, is_operator_symbol};
use alloc::vec::Vec;
use bitflags::bitflags;

bitflags! {
    /// Character classes making up the legal input alphabet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CharClass: u16 {
        const DIGIT = 1 << 0;
        const LETTER = 1 << 1;
        const UNDERSCORE = 1 << 2;
        const DECIMAL_POINT = 1 << 3;
        const COMMA = 1 << 4;
        const PARENTHESIS = 1 << 5;
        const SPACE = 1 << 6;
        const OPERATOR_SYMBOL = 1 << 7;
        const NUMBER_SYMBOL = 1 << 8;

        const NAME_START = Self::LETTER.bits() | Self::UNDERSCORE.bits();
        const NAME_CONTINUE = Self::NAME_START.bits() | Self::DIGIT.bits();
        /// Classes whose characters are complete tokens on their own.
        const SINGLE = Self::COMMA.bits()
            | Self::PARENTHESIS.bits()
            | Self::OPERATOR_SYMBOL.bits()
            | Self::NUMBER_SYMBOL.bits();
    }
}

impl CharClass {
    /// Classifies `c`; an empty set means the character is illegal.
    pub fn of(c: char) -> Self {
        match c {
            '0'..='9' => CharClass::DIGIT,
            'a'..='z' | 'A'..='Z' => CharClass::LETTER,
            '_' => CharClass::UNDERSCORE,
            '.' => CharClass::DECIMAL_POINT,
            ',' => CharClass::COMMA,
            '(' | ')' => CharClass::PARENTHESIS,
            ' ' => CharClass::SPACE,
            c if is_operator_symbol(c) => CharClass::OPERATOR_SYMBOL,
            c if is_number_symbol(c) => CharClass::NUMBER_SYMBOL,
            _ => CharClass::empty(),
        }
    }

    pub fn is_legal(self) -> bool {
        !self.is_empty()
    }
}

/// The lexer struct, which produces tokens from an input string.
///
/// Positions are character offsets; the byte offset of each character is kept
/// alongside so names can be sliced out of the input without copying.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).map(|&(_, c)| c)
    }

    fn class_at(&self, index: usize) -> CharClass {
        self.peek_at(index).map_or(CharClass::empty(), CharClass::of)
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.chars
            .get(index)
            .map_or(self.input.len(), |&(offset, _)| offset)
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[self.byte_offset(start)..self.byte_offset(end)]
    }

    fn skip_while(&mut self, class: CharClass) {
        while class.intersects(self.class_at(self.pos)) {
            self.pos += 1;
        }
    }

    /// Stops the scan; nothing after a lexical error is tokenized.
    fn fail(&mut self, message: &'static str, position: usize, length: usize) -> Result<Token<'a>> {
        self.pos = self.chars.len();
        Err(ExprError::Lexical {
            message,
            position,
            length,
        })
    }

    /// Get the next token from the input, or `None` at the end of input.
    pub fn next_token(&mut self) -> Option<Result<Token<'a>>> {
        loop {
            let start = self.pos;
            let c = self.peek_at(start)?;
            let class = CharClass::of(c);

            if !class.is_legal() {
                return Some(self.fail("Illegal character", start, 1));
            }

            if class.contains(CharClass::SPACE) {
                self.skip_while(CharClass::SPACE);
                continue;
            }

            if class.intersects(CharClass::SINGLE) {
                self.pos += 1;
                let kind = match c {
                    '(' => TokenKind::OpeningParenthesis,
                    ')' => TokenKind::ClosingParenthesis,
                    ',' => TokenKind::Comma,
                    c if class.contains(CharClass::NUMBER_SYMBOL) => TokenKind::NumberSymbol(c),
                    c => TokenKind::OperatorSymbol(c),
                };
                return Some(Ok(Token::new(kind, start, 1)));
            }

            if class.intersects(CharClass::NAME_START) {
                self.skip_while(CharClass::NAME_CONTINUE);
                let name = self.slice(start, self.pos);
                return Some(Ok(Token::new(TokenKind::Name(name), start, self.pos - start)));
            }

            if class.contains(CharClass::DIGIT) {
                return Some(self.number(start));
            }

            // A decimal point can never start a token.
            return Some(self.fail("Illegal Sequence", start, 1));
        }
    }

    /// Scans `digits ( "." digits )?` starting at `start`.
    fn number(&mut self, start: usize) -> Result<Token<'a>> {
        self.skip_while(CharClass::DIGIT);

        if self.class_at(self.pos).contains(CharClass::DECIMAL_POINT) {
            let point = self.pos;
            let after = point + 1;
            match self.peek_at(after).map(CharClass::of) {
                None => return self.fail("Illegal Sequence", start, after - start),
                Some(class) if !class.is_legal() => {
                    return self.fail("Illegal character", after, 1);
                }
                Some(class) if !class.contains(CharClass::DIGIT) => {
                    return self.fail("Illegal Sequence", start, after + 1 - start);
                }
                Some(_) => {
                    self.pos = after;
                    self.skip_while(CharClass::DIGIT);
                }
            }
        }

        let length = self.pos - start;
        match self.slice(start, self.pos).parse::<Real>() {
            Ok(value) => Ok(Token::number(value, start, length)),
            Err(_) => self.fail("Illegal Sequence", start, length),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Splits `input` into tokens, dropping spaces.
///
/// ```
/// use math_eval::lexer::tokenize;
/// use math_eval::types::Token;
///
/// let tokens = tokenize("(π,)").unwrap();
/// assert_eq!(tokens, vec![
///     Token::opening_parenthesis(0),
///     Token::number_symbol('π', 1),
///     Token::comma(2),
///     Token::closing_parenthesis(3),
/// ]);
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn lexical(position: usize, length: usize) -> (usize, usize) {
        (position, length)
    }

    fn error_span(input: &str) -> (usize, usize) {
        match tokenize(input) {
            Err(err @ ExprError::Lexical { .. }) => err.span().unwrap(),
            other => panic!("Expected lexical error for {:?}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_symbols_parenthesis_and_commas() {
        assert_eq!(
            tokenize("(π,)").unwrap(),
            vec![
                Token::opening_parenthesis(0),
                Token::number_symbol('π', 1),
                Token::comma(2),
                Token::closing_parenthesis(3),
            ]
        );
    }

    #[test]
    fn test_number_symbol_followed_by_name() {
        assert_eq!(
            tokenize("π_xxx").unwrap(),
            vec![Token::number_symbol('π', 0), Token::name("_xxx", 1)]
        );
    }

    #[test]
    fn test_whole_sequence_is_a_name() {
        assert_eq!(tokenize("_123").unwrap(), vec![Token::name("_123", 0)]);
        assert_eq!(tokenize("xxx_123").unwrap(), vec![Token::name("xxx_123", 0)]);
    }

    #[test]
    fn test_number_then_name_boundaries() {
        assert_eq!(
            tokenize("123_xxx").unwrap(),
            vec![Token::number(123.0, 0, 3), Token::name("_xxx", 3)]
        );
        assert_eq!(
            tokenize("1.23xxx").unwrap(),
            vec![Token::number(1.23, 0, 4), Token::name("xxx", 4)]
        );
        assert_eq!(
            tokenize("1.2_3+").unwrap(),
            vec![
                Token::number(1.2, 0, 3),
                Token::name("_3", 3),
                Token::operator_symbol('+', 5),
            ]
        );
        assert_eq!(
            tokenize("1.2ln").unwrap(),
            vec![Token::number(1.2, 0, 3), Token::name("ln", 3)]
        );
    }

    #[test]
    fn test_decimal_point_cannot_start_a_sequence() {
        assert_eq!(error_span("_xxx1.3xxx"), lexical(5, 1));
        assert_eq!(error_span("."), lexical(0, 1));
    }

    #[test]
    fn test_spaces_separate_tokens() {
        assert_eq!(
            tokenize("_xxx 1.3 xxx").unwrap(),
            vec![
                Token::name("_xxx", 0),
                Token::number(1.3, 5, 3),
                Token::name("xxx", 9),
            ]
        );
        assert_eq!(
            tokenize("1 1").unwrap(),
            vec![Token::number(1.0, 0, 1), Token::number(1.0, 2, 1)]
        );
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_incomplete_fraction_is_illegal() {
        assert_eq!(error_span("1.xxx+"), lexical(0, 3));
        assert_eq!(error_span("1."), lexical(0, 2));
        assert_eq!(error_span("12.+3"), lexical(0, 4));
        assert_eq!(error_span("2*10. "), lexical(2, 4));
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(error_span("1 $ 2"), lexical(2, 1));
        assert_eq!(error_span("1.$"), lexical(2, 1));
        assert_eq!(error_span("1\t+2"), lexical(1, 1));
        // Offsets count characters, not bytes.
        assert_eq!(error_span("π+π!"), lexical(3, 1));
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(
            tokenize("123+2_3+").unwrap(),
            vec![
                Token::number(123.0, 0, 3),
                Token::operator_symbol('+', 3),
                Token::number(2.0, 4, 1),
                Token::name("_3", 5),
                Token::operator_symbol('+', 7),
            ]
        );
        assert_eq!(
            tokenize("1+1_").unwrap(),
            vec![
                Token::number(1.0, 0, 1),
                Token::operator_symbol('+', 1),
                Token::number(1.0, 2, 1),
                Token::name("_", 3),
            ]
        );
        assert_eq!(
            tokenize("+++").unwrap(),
            vec![
                Token::operator_symbol('+', 0),
                Token::operator_symbol('+', 1),
                Token::operator_symbol('+', 2),
            ]
        );
        assert_eq!(
            tokenize("1+").unwrap(),
            vec![Token::number(1.0, 0, 1), Token::operator_symbol('+', 1)]
        );
    }

    #[test]
    fn test_single_tokens() {
        assert_eq!(tokenize("(").unwrap(), vec![Token::opening_parenthesis(0)]);
        assert_eq!(tokenize("π").unwrap(), vec![Token::number_symbol('π', 0)]);
        assert_eq!(
            tokenize("123,456").unwrap(),
            vec![
                Token::number(123.0, 0, 3),
                Token::comma(3),
                Token::number(456.0, 4, 3),
            ]
        );
    }

    #[test]
    fn test_expression_with_all_token_classes() {
        assert_eq!(
            tokenize("mv(π/(2+3),(1+2)/(2+3))").unwrap(),
            vec![
                Token::name("mv", 0),
                Token::opening_parenthesis(2),
                Token::number_symbol('π', 3),
                Token::operator_symbol('/', 4),
                Token::opening_parenthesis(5),
                Token::number(2.0, 6, 1),
                Token::operator_symbol('+', 7),
                Token::number(3.0, 8, 1),
                Token::closing_parenthesis(9),
                Token::comma(10),
                Token::opening_parenthesis(11),
                Token::number(1.0, 12, 1),
                Token::operator_symbol('+', 13),
                Token::number(2.0, 14, 1),
                Token::closing_parenthesis(15),
                Token::operator_symbol('/', 16),
                Token::opening_parenthesis(17),
                Token::number(2.0, 18, 1),
                Token::operator_symbol('+', 19),
                Token::number(3.0, 20, 1),
                Token::closing_parenthesis(21),
                Token::closing_parenthesis(22),
            ]
        );
    }

    #[test]
    fn test_lexer_stops_after_error() {
        let mut lexer = Lexer::new("1 $ 2");
        assert_eq!(lexer.next_token(), Some(Ok(Token::number(1.0, 0, 1))));
        assert!(matches!(lexer.next_token(), Some(Err(ExprError::Lexical { .. }))));
        assert_eq!(lexer.next_token(), None);
    }

    #[test]
    fn test_char_classes() {
        assert_eq!(CharClass::of('7'), CharClass::DIGIT);
        assert!(CharClass::NAME_CONTINUE.contains(CharClass::of('_')));
        assert!(CharClass::SINGLE.contains(CharClass::of('π')));
        assert!(CharClass::SINGLE.contains(CharClass::of('@')));
        assert!(!CharClass::of('$').is_legal());
        assert!(!CharClass::of('\n').is_legal());
    }
}
