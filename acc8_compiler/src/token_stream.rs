//! Buffered stream of tokens for look ahead.
use crate::tokens::{Token, TokenKind};

use itertools::{multipeek, Itertools, MultiPeek};
use std::{error, fmt, iter::Iterator, vec};

/// Buffered stream of tokens with one token of look ahead.
///
/// The stream owns the tokens of one program and is consumed
/// destructively from the front. Both the syntax parser and the
/// semantic walker read a fresh stream over the same tokens.
///
/// Peeking always resets the internal `MultiPeek` cursor first, so
/// repeated calls see the same token.
pub struct TokenStream {
    tokens: MultiPeek<vec::IntoIter<Token>>,
}

impl TokenStream {
    #[inline]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: multipeek(tokens),
        }
    }

    /// Consumes the current token regardless of type.
    ///
    /// Returns `None` when the cursor is at the end of the token stream.
    #[inline]
    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    /// Consumes the current token if it matches the given token type.
    ///
    /// Returns true when matched. Returns false when token types
    /// do not match, or the token stream is at the end.
    ///
    /// Does not consume the token if the types do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        if self.peek_kind() == Some(token_kind) {
            self.tokens.next();
            true
        } else {
            false
        }
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// an error is returned and the token is left in the stream.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, TokenError> {
        self.consume_any(&[token_kind])
    }

    /// Return the current token and advance the cursor, if it
    /// matches any of the given token types.
    pub fn consume_any(&mut self, token_kinds: &[TokenKind]) -> Result<Token, TokenError> {
        // Ensure clean peek state.
        self.tokens.reset_peek();

        let encountered = self.tokens.peek().cloned().ok_or(TokenError::EndOfSource)?;
        self.tokens.reset_peek();

        if token_kinds.contains(&encountered.kind) {
            self.tokens.next();
            Ok(encountered)
        } else {
            Err(TokenError::Mismatch {
                expected: token_kinds.to_vec(),
                encountered,
            })
        }
    }

    /// Return the current token without advancing the cursor.
    ///
    /// Always looks at the token under the cursor, regardless
    /// of previous peeks.
    pub fn peek(&mut self) -> Result<&Token, TokenError> {
        self.tokens.reset_peek();
        self.tokens.peek().ok_or(TokenError::EndOfSource)
    }

    /// Kind of the token under the cursor.
    #[inline]
    pub fn peek_kind(&mut self) -> Option<TokenKind> {
        self.peek().ok().map(|token| token.kind)
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_err()
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Mismatch {
        expected: Vec<TokenKind>,
        encountered: Token,
    },
    EndOfSource,
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::Mismatch { expected, encountered } => write!(
                f,
                "expected [ {} ], found [ {} ] with value '{}' on line {}",
                expected.iter().join(" | "),
                encountered.kind,
                encountered.lexeme,
                encountered.span.line,
            ),
            E::EndOfSource => write!(f, "unexpected end of token stream"),
        }
    }
}
