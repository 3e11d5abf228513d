use crate::error::ParseError;
use crate::expr::parse_expr;
use crate::stream::{lex, TokenStream};
use crate::token::{Token, TokenKind};
use anyhow::Result;
use chrono_ast::ast::{
    AssignOp, Block, Clock, Decl, Direction, Expr, Ident, ModuleDecl, ParamDecl, SignalDecl,
    Stmt, Storage,
};
use log::debug;

/// Deepest statement nesting accepted before the parse is aborted.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parse every module in `stream`.
pub fn parse(stream: TokenStream<'_>) -> Result<Vec<ModuleDecl>, ParseError> {
    let mut p = Parser { stream, depth: 0 };
    p.parse_file()
}

/// Tokenize and parse `src`. The underlying [`ParseError`] can be recovered
/// with `downcast_ref`.
pub fn parse_str(file: &str, src: &str) -> Result<Vec<ModuleDecl>> {
    debug!("parsing {}", file);
    let modules = parse(lex(src))?;
    Ok(modules)
}

struct Parser<'a> {
    stream: TokenStream<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn at(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.stream.peek()?.is(kind))
    }

    fn eat(&mut self, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        if self.at(kind)? {
            Ok(Some(self.stream.next()?))
        } else {
            Ok(None)
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &'static str) -> Result<Token, ParseError> {
        let tok = self.stream.next()?;
        if tok.is(kind) {
            Ok(tok)
        } else {
            Err(ParseError::unexpected(context, tok, &[kind]))
        }
    }

    fn parse_ident(&mut self, context: &'static str) -> Result<Ident, ParseError> {
        let tok = self.expect(TokenKind::Identifier, context)?;
        Ok(Ident {
            name: tok.text,
            pos: tok.pos,
        })
    }

    // ======= modules / parameters =======

    fn parse_file(&mut self) -> Result<Vec<ModuleDecl>, ParseError> {
        let mut modules = Vec::new();
        // Modules are the only top-level declaration.
        while self.stream.has_more() {
            modules.push(self.parse_module()?);
        }
        Ok(modules)
    }

    fn parse_module(&mut self) -> Result<ModuleDecl, ParseError> {
        let name = self.parse_ident("module name")?;
        self.expect(TokenKind::LParen, "module parameter list")?;

        let mut params = Vec::new();
        if self.eat(TokenKind::RParen)?.is_none() {
            loop {
                params.push(self.parse_param()?);
                let tok = self.stream.next()?;
                match tok.kind {
                    TokenKind::Comma => continue,
                    TokenKind::RParen => break,
                    _ => {
                        return Err(ParseError::unexpected(
                            "module parameter list",
                            tok,
                            &[TokenKind::Comma, TokenKind::RParen],
                        ))
                    }
                }
            }
        }

        let body = self.parse_block()?;
        debug!(
            "parsed module `{}` ({} parameters, {} statements)",
            name.name,
            params.len(),
            body.stmts.len()
        );
        Ok(ModuleDecl { name, params, body })
    }

    /// `in|out|inout [wire|reg] ['[' width ']'] name [@ [!] clock]`
    fn parse_param(&mut self) -> Result<ParamDecl, ParseError> {
        let tok = self.stream.next()?;
        let direction = match tok.text.as_str() {
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            "inout" => Some(Direction::InOut),
            _ => None,
        };
        let Some(direction) = direction.filter(|_| tok.is(TokenKind::Direction)) else {
            return Err(ParseError::unexpected(
                "module parameter",
                tok,
                &[TokenKind::Direction],
            ));
        };
        let signal = self.parse_signal("module parameter")?;
        Ok(ParamDecl { signal, direction })
    }

    fn parse_signal(&mut self, context: &'static str) -> Result<SignalDecl, ParseError> {
        let storage = match self.eat(TokenKind::Storage)? {
            Some(tok) if tok.text == "reg" => Storage::Reg,
            _ => Storage::Wire,
        };
        let width = self.parse_width()?;
        let name = self.parse_ident(context)?;
        let clock = if self.at(TokenKind::AtMark)? {
            Some(self.parse_clock()?)
        } else {
            None
        };
        Ok(SignalDecl {
            name,
            width,
            storage,
            clock,
        })
    }

    /// Optional `[N]`; signals are one bit wide otherwise.
    fn parse_width(&mut self) -> Result<u32, ParseError> {
        if self.eat(TokenKind::LBracket)?.is_none() {
            return Ok(1);
        }
        let tok = self.expect(TokenKind::Literal, "bit width")?;
        let width = match tok.text.parse::<u32>() {
            Ok(w) => w,
            Err(_) => return Err(ParseError::MalformedLiteral { token: tok }),
        };
        self.expect(TokenKind::RBracket, "bit width")?;
        Ok(width)
    }

    /// `@clk` or `@!clk`
    fn parse_clock(&mut self) -> Result<Clock, ParseError> {
        self.expect(TokenKind::AtMark, "clock")?;
        let tok = self.stream.next()?;
        let (negated, name) = match tok.kind {
            TokenKind::Bang => (true, self.parse_ident("clock")?),
            TokenKind::Identifier => (
                false,
                Ident {
                    name: tok.text,
                    pos: tok.pos,
                },
            ),
            _ => {
                return Err(ParseError::unexpected(
                    "clock",
                    tok,
                    &[TokenKind::Bang, TokenKind::Identifier],
                ))
            }
        };
        Ok(Clock { name, negated })
    }

    // ======= blocks and statements =======

    /// Parse a block: `{ stmt* }`
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBrace, "block")?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace)? {
            stmts.push(self.parse_stmt()?);
        }
        let close = self.expect(TokenKind::RBrace, "block")?;
        Ok(Block {
            stmts,
            start: open.pos,
            end: close.pos,
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let (kind, pos) = {
            let tok = self.stream.peek()?;
            (tok.kind, tok.pos)
        };

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep { pos });
        }

        let stmt = match kind {
            TokenKind::Identifier => self.parse_assign(),
            TokenKind::If => self.parse_if(),
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Storage => self.parse_decl_stmt(),
            TokenKind::AtMark => self.parse_sequence(),
            _ => {
                let tok = self.stream.next()?;
                Err(ParseError::unexpected(
                    "statement",
                    tok,
                    &[
                        TokenKind::Identifier,
                        TokenKind::If,
                        TokenKind::LBrace,
                        TokenKind::Storage,
                        TokenKind::AtMark,
                    ],
                ))
            }
        };

        self.depth -= 1;
        stmt
    }

    /// `name = expr;` or `name <- expr;`
    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let lhs = self.parse_ident("assignment")?;
        let tok = self.expect(TokenKind::Assign, "assignment")?;
        let op = if tok.text == "<-" {
            AssignOp::Registered
        } else {
            AssignOp::Plain
        };
        let rhs = self.parse_expr()?;
        self.expect(TokenKind::EndOfStatement, "assignment")?;
        Ok(Stmt::Assign {
            op,
            pos: lhs.pos,
            lhs,
            rhs,
        })
    }

    /// `if cond stmt [else (if ... | { ... })]`
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let if_tok = self.expect(TokenKind::If, "if statement")?;
        let cond = self.parse_expr()?;
        let body = Box::new(self.parse_stmt()?);

        let else_ = if self.eat(TokenKind::Else)?.is_some() {
            if self.at(TokenKind::If)? || self.at(TokenKind::LBrace)? {
                Some(Box::new(self.parse_stmt()?))
            } else {
                let tok = self.stream.next()?;
                return Err(ParseError::unexpected(
                    "else branch",
                    tok,
                    &[TokenKind::If, TokenKind::LBrace],
                ));
            }
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            body,
            else_,
            pos: if_tok.pos,
        })
    }

    /// `wire|reg ['[' width ']'] name [@ [!] clock];`
    fn parse_decl_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.stream.peek()?.pos;
        let signal = self.parse_signal("signal declaration")?;
        self.expect(TokenKind::EndOfStatement, "signal declaration")?;
        Ok(Stmt::Decl {
            decl: Decl::Signal(signal),
            pos,
        })
    }

    /// `@clk stmt`
    fn parse_sequence(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.stream.peek()?.pos;
        let clock = self.parse_clock()?;
        let inner = Box::new(self.parse_stmt()?);
        Ok(Stmt::Sequence { clock, inner, pos })
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        parse_expr(&mut self.stream)
    }
}
