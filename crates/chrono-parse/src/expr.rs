//! Expression parsing.
//!
//! Infix tokens are reordered into a postfix (reverse-Polish) sequence with
//! the shunting-yard algorithm, and the tree is then built from that
//! sequence with an operand stack.

use crate::error::ParseError;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};
use chrono_ast::ast::{Expr, Ident, Literal, Operator};
use chrono_ast::span::Position;
use log::trace;

/// Deepest operator chain accepted when building the tree.
///
/// Emission walks the tree recursively, so this is kept low enough for a
/// thread with the default 2 MiB stack.
pub const MAX_EXPRESSION_DEPTH: usize = 256;

pub(crate) fn parse_expr(stream: &mut TokenStream<'_>) -> Result<Expr, ParseError> {
    let postfix = to_postfix(stream)?;
    trace!(
        "postfix: {}",
        postfix
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let start = postfix.first().map(|t| t.pos).unwrap_or_default();
    build_tree(postfix, start)
}

fn operator_of(tok: &Token) -> Result<Operator, ParseError> {
    Operator::from_symbol(&tok.text).ok_or(ParseError::MalformedExpression { pos: tok.pos })
}

/// Consume one expression from the stream and return it in postfix order.
///
/// Operands and operators alternate. After an operand or a closing paren the
/// expression only continues if the next token is an operator, or a `)`
/// closing a paren opened inside this expression.
///
/// When a group closes, its `(` is appended to the output as a marker: the
/// operand just before it was parenthesized and starts at the marker.
fn to_postfix(stream: &mut TokenStream<'_>) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::new();
    let mut ops: Vec<Token> = Vec::new();
    let mut open_parens = 0usize;
    let mut want_operand = true;

    loop {
        if want_operand {
            let tok = stream.next()?;
            match tok.kind {
                TokenKind::Identifier | TokenKind::Literal => {
                    output.push(tok);
                    want_operand = false;
                }
                TokenKind::LParen => {
                    open_parens += 1;
                    ops.push(tok);
                }
                _ => {
                    return Err(ParseError::unexpected(
                        "expression",
                        tok,
                        &[TokenKind::Identifier, TokenKind::Literal, TokenKind::LParen],
                    ))
                }
            }
            continue;
        }

        let next = stream.peek()?.kind;
        if next.is_operator() {
            let tok = stream.next()?;
            let incoming = operator_of(&tok)?.precedence();
            while let Some(top) = ops.last() {
                if top.is(TokenKind::LParen) || operator_of(top)?.precedence() < incoming {
                    break;
                }
                output.extend(ops.pop());
            }
            ops.push(tok);
            want_operand = true;
        } else if next == TokenKind::RParen && open_parens > 0 {
            let close = stream.next()?;
            loop {
                match ops.pop() {
                    Some(open) if open.is(TokenKind::LParen) => {
                        output.push(open);
                        break;
                    }
                    Some(op) => output.push(op),
                    None => return Err(ParseError::MalformedExpression { pos: close.pos }),
                }
            }
            open_parens -= 1;
        } else {
            break;
        }
    }

    while let Some(op) = ops.pop() {
        if op.is(TokenKind::LParen) {
            let received = stream.next()?;
            return Err(ParseError::unexpected(
                "parenthesized expression",
                received,
                &[TokenKind::RParen],
            ));
        }
        output.push(op);
    }
    Ok(output)
}

/// A finished subtree on the operand stack.
struct Operand {
    expr: Expr,
    /// Position of the subtree's leading token, including an enclosing `(`.
    lead: Position,
    /// Operators on the longest path down to a leaf.
    height: usize,
}

/// Build a tree from a postfix sequence.
fn build_tree(postfix: Vec<Token>, at: Position) -> Result<Expr, ParseError> {
    let mut stack: Vec<Operand> = Vec::new();

    for tok in postfix {
        match tok.kind {
            TokenKind::Identifier => stack.push(Operand {
                lead: tok.pos,
                height: 0,
                expr: Expr::Ident(Ident {
                    name: tok.text,
                    pos: tok.pos,
                }),
            }),
            TokenKind::Literal => stack.push(Operand {
                lead: tok.pos,
                height: 0,
                expr: Expr::Literal(Literal {
                    value: tok.text,
                    pos: tok.pos,
                }),
            }),
            TokenKind::LParen => {
                let group = stack
                    .last_mut()
                    .ok_or(ParseError::MalformedExpression { pos: tok.pos })?;
                group.lead = tok.pos;
            }
            _ => {
                let op = operator_of(&tok)?;
                let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                    return Err(ParseError::MalformedExpression { pos: tok.pos });
                };
                let height = lhs.height.max(rhs.height) + 1;
                if height > MAX_EXPRESSION_DEPTH {
                    return Err(ParseError::NestingTooDeep { pos: tok.pos });
                }
                stack.push(Operand {
                    lead: lhs.lead,
                    height,
                    expr: Expr::Math {
                        pos: lhs.lead,
                        lhs: Box::new(lhs.expr),
                        rhs: Box::new(rhs.expr),
                        op,
                    },
                });
            }
        }
    }

    let root = stack
        .pop()
        .ok_or(ParseError::MalformedExpression { pos: at })?;
    if let Some(extra) = stack.last() {
        return Err(ParseError::MalformedExpression { pos: extra.lead });
    }
    Ok(root.expr)
}
