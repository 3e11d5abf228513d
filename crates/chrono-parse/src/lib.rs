#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

mod error;
mod expr;
mod lexer;
mod parser;
mod stream;
mod token;

pub use error::{LexError, ParseError};
pub use expr::MAX_EXPRESSION_DEPTH;
pub use parser::{parse, parse_str, MAX_NESTING_DEPTH};
pub use stream::{lex, TokenStream};
pub use token::{Token, TokenKind};
