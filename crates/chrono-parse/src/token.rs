use chrono_ast::span::Position;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// `;`
    EndOfStatement,
    Identifier,
    Literal,
    // keywords
    Direction, // in / out / inout
    Storage,   // wire / reg
    If,
    Else,
    Switch,
    Default,
    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    AtMark, // @ ties a register to a clock
    Bang,   // ! negates a clock edge
    Comma,
    Colon,
    // operators
    Math,    // + - * / << >>
    Assign,  // = <-
    Compare, // == >= <= > <
    Unknown,
}

impl TokenKind {
    /// Classify a completed piece of source text.
    pub fn classify(text: &str) -> Self {
        match text {
            "in" | "out" | "inout" => TokenKind::Direction,
            "wire" | "reg" => TokenKind::Storage,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "switch" => TokenKind::Switch,
            "default" => TokenKind::Default,
            ";" => TokenKind::EndOfStatement,
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "{" => TokenKind::LBrace,
            "}" => TokenKind::RBrace,
            "[" => TokenKind::LBracket,
            "]" => TokenKind::RBracket,
            "@" => TokenKind::AtMark,
            "!" => TokenKind::Bang,
            "," => TokenKind::Comma,
            ":" => TokenKind::Colon,
            "+" | "-" | "*" | "/" | "<<" | ">>" => TokenKind::Math,
            "=" | "<-" => TokenKind::Assign,
            "==" | ">=" | "<=" | ">" | "<" => TokenKind::Compare,
            _ => match text.chars().next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => TokenKind::Identifier,
                Some(c) if c.is_ascii_digit() => TokenKind::Literal,
                _ => TokenKind::Unknown,
            },
        }
    }

    /// Binary operators that may continue an expression.
    pub fn is_operator(self) -> bool {
        matches!(self, TokenKind::Math | TokenKind::Compare)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::EndOfStatement => "';'",
            TokenKind::Identifier => "identifier",
            TokenKind::Literal => "literal",
            TokenKind::Direction => "direction (in/out/inout)",
            TokenKind::Storage => "storage class (wire/reg)",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Switch => "'switch'",
            TokenKind::Default => "'default'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::AtMark => "'@'",
            TokenKind::Bang => "'!'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Math => "arithmetic operator",
            TokenKind::Assign => "assignment ('=' or '<-')",
            TokenKind::Compare => "comparison operator",
            TokenKind::Unknown => "unknown token",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Position,
}

impl Token {
    pub fn new(text: String, pos: Position) -> Self {
        Self {
            kind: TokenKind::classify(&text),
            text,
            pos,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` at {}", self.text, self.pos)
    }
}
