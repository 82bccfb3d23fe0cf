//! Parser for the qualifier grammar:
//!
//! ```text
//! ["/" model "/"] [itemType ":"] [item] ["." objectPath]
//! ```
//!
//! The object path is taken verbatim to the end of the input.

use std::iter::Peekable;

use smol_str::SmolStr;

use super::Qualifier;
use super::lexer::{Lexer, QualifierToken, Token};
use crate::base::{RepositoryError, Result};

pub(crate) fn parse(text: &str) -> Result<Qualifier> {
    let mut qualifier = Qualifier::default();
    if text.is_empty() {
        return Ok(qualifier);
    }

    let mut tokens = Lexer::new(text).peekable();

    if matches!(tokens.peek(), Some(t) if t.kind == QualifierToken::Slash) {
        tokens.next();
        qualifier.model = Some(parse_model_segment(text, &mut tokens)?);
    }

    let mut segment: Option<&str> = None;
    while let Some(token) = tokens.next() {
        match token.kind {
            QualifierToken::Ident => segment = Some(token.text),
            QualifierToken::Colon => {
                if qualifier.item_type.is_some() {
                    return Err(RepositoryError::parse(text, "more than one type delimiter"));
                }
                let Some(item_type) = segment.take() else {
                    return Err(RepositoryError::parse(text, "type delimiter without type"));
                };
                qualifier.item_type = Some(SmolStr::new(item_type));
            }
            QualifierToken::Dot => {
                qualifier.item = segment.take().map(SmolStr::new);
                let rest = &text[token.offset + 1..];
                if !rest.is_empty() {
                    qualifier.object_path = Some(SmolStr::new(rest));
                }
                return Ok(qualifier);
            }
            QualifierToken::Slash => {
                return Err(RepositoryError::parse(text, "too many path delimiters"));
            }
            QualifierToken::Semicolon => {
                return Err(RepositoryError::parse(
                    text,
                    "';' is not allowed in an identifier",
                ));
            }
        }
    }

    qualifier.item = segment.map(SmolStr::new);
    Ok(qualifier)
}

/// Parse `model` and the optional closing `/` after the leading delimiter.
fn parse_model_segment<'a>(
    text: &str,
    tokens: &mut Peekable<impl Iterator<Item = Token<'a>>>,
) -> Result<SmolStr> {
    let model = match tokens.next() {
        Some(Token {
            kind: QualifierToken::Ident,
            text: name,
            ..
        }) => SmolStr::new(name),
        _ => return Err(RepositoryError::parse(text, "missing model name")),
    };

    match tokens.peek() {
        None => {}
        Some(t) if t.kind == QualifierToken::Slash => {
            tokens.next();
        }
        Some(t) => {
            return Err(RepositoryError::parse(
                text,
                format!("unexpected '{}' after model name", t.text),
            ));
        }
    }

    Ok(model)
}
