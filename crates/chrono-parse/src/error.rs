use crate::token::{Token, TokenKind};
use chrono_ast::span::Position;
use std::fmt;

/// Errors raised by the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A token was requested after the source ran out.
    UnexpectedEndOfInput { pos: Position },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedEndOfInput { pos } => {
                write!(f, "unexpected end of input at {}", pos)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Errors raised while building the AST. All of them abort the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Lex(LexError),
    /// A token that does not fit the grammar at this point.
    UnexpectedToken {
        context: &'static str,
        received: Token,
        expected: Vec<TokenKind>,
    },
    /// A bit width that is not a non-negative integer.
    MalformedLiteral { token: Token },
    /// Postfix sequence that does not form a tree.
    MalformedExpression { pos: Position },
    /// Statements or expressions nested beyond the parser's limits.
    NestingTooDeep { pos: Position },
}

impl ParseError {
    pub(crate) fn unexpected(
        context: &'static str,
        received: Token,
        expected: &[TokenKind],
    ) -> Self {
        ParseError::UnexpectedToken {
            context,
            received,
            expected: expected.to_vec(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(LexError::UnexpectedEndOfInput { pos }) => *pos,
            ParseError::UnexpectedToken { received, .. } => received.pos,
            ParseError::MalformedLiteral { token } => token.pos,
            ParseError::MalformedExpression { pos } | ParseError::NestingTooDeep { pos } => *pos,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::UnexpectedToken {
                context,
                received,
                expected,
            } => {
                write!(f, "error parsing {}: received {}, expected ", context, received)?;
                for (i, kind) in expected.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{}", kind)?;
                }
                Ok(())
            }
            ParseError::MalformedLiteral { token } => {
                write!(f, "malformed bit width {}: expected a non-negative integer", token)
            }
            ParseError::MalformedExpression { pos } => {
                write!(f, "malformed expression at {}", pos)
            }
            ParseError::NestingTooDeep { pos } => {
                write!(f, "nesting depth limit exceeded at {}", pos)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}
