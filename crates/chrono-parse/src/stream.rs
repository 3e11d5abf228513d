use crate::error::LexError;
use crate::lexer::Lexer;
use crate::token::Token;

/// Tokenize `src` on demand.
pub fn lex(src: &str) -> TokenStream<'_> {
    TokenStream::new(src)
}

/// A token source with a single token of lookahead.
///
/// `peek` never advances the cursor and `next` always does. Asking for a
/// token after the source is exhausted is an error: the grammar has no
/// optional trailing constructs.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl<'a> TokenStream<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer::new(src),
            peeked: None,
        }
    }

    fn fill(&mut self) {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token();
        }
    }

    pub fn peek(&mut self) -> Result<&Token, LexError> {
        self.fill();
        let pos = self.lexer.position();
        self.peeked
            .as_ref()
            .ok_or(LexError::UnexpectedEndOfInput { pos })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Token, LexError> {
        self.fill();
        let pos = self.lexer.position();
        self.peeked
            .take()
            .ok_or(LexError::UnexpectedEndOfInput { pos })
    }

    pub fn has_more(&mut self) -> bool {
        self.fill();
        self.peeked.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn peek_does_not_advance() {
        let mut ts = lex("a b");
        assert_eq!(ts.peek().unwrap().text, "a");
        assert_eq!(ts.peek().unwrap().text, "a");
        assert_eq!(ts.next().unwrap().text, "a");
        assert_eq!(ts.next().unwrap().kind, TokenKind::Identifier);
        assert!(!ts.has_more());
    }

    #[test]
    fn exhausted_stream_is_an_error() {
        let mut ts = lex("x");
        ts.next().unwrap();
        assert!(matches!(
            ts.peek(),
            Err(LexError::UnexpectedEndOfInput { .. })
        ));
        assert!(matches!(
            ts.next(),
            Err(LexError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn empty_source_has_no_tokens() {
        let mut ts = lex("  // nothing here\n");
        assert!(!ts.has_more());
    }
}
