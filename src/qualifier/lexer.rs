//! Logos-based tokenizer for qualifier text.

use logos::Logos;

/// A token with its kind, text, and byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: QualifierToken,
    pub text: &'a str,
    pub offset: usize,
}

/// Lexer wrapping the logos-generated tokenizer
pub(crate) struct Lexer<'a> {
    inner: logos::Lexer<'a, QualifierToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: QualifierToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.inner.span().start;

        // Every character is covered by one of the rules, so an error can only
        // be an identifier the regex refused; treat it as one.
        let kind = logos_token.unwrap_or(QualifierToken::Ident);

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
#[allow(dead_code)]
pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QualifierToken {
    #[token("/")]
    Slash,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    #[token(";")]
    Semicolon,

    #[regex(r"[^/:.;]+")]
    Ident,
}
