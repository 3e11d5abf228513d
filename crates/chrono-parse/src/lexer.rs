use crate::token::Token;
use chrono_ast::span::Position;
use log::trace;

/// Pull-based tokenizer over a source string.
///
/// Tokens are built one character at a time: a token keeps growing while
/// the last character read and the next one in the source belong together
/// (see [`continues`]).
pub struct Lexer<'a> {
    src: &'a str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn rest(&self) -> &'a str {
        let src: &'a str = self.src;
        &src[self.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            // always paired with a '\n', which does the line accounting
            '\r' => {}
            _ => self.column += 1,
        }
        Some(c)
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            // line comment: //
            if self.peek() == Some('/') && self.peek2() == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }
            break;
        }
    }

    /// Produce the next token, or `None` once the source is exhausted.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_ws_and_comments();
        let start = self.position();
        let first = self.bump()?;

        let mut text = String::from(first);
        let mut last = first;
        while let Some(next) = self.peek() {
            if !continues(last, next) {
                break;
            }
            self.bump();
            text.push(next);
            last = next;
        }

        let tok = Token::new(text, start);
        trace!("lexed {:?} {}", tok.kind, tok);
        Some(tok)
    }
}

/// Whether `next` extends a token whose most recent character is `last`.
fn continues(last: char, next: char) -> bool {
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let cmp = |c: char| matches!(c, '<' | '=' | '>');

    (word(last) && word(next)) || (cmp(last) && cmp(next)) || (last == '<' && next == '-')
}
