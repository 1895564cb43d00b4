//! Syntax-only recursive descent parser.
//!
//! Accepts or rejects a program and records a concrete syntax tree.
//! Semantics are derived later by a second walk over the same tokens.
mod block;
mod expr;
mod stmts;

use crate::{
    token_stream::{TokenError, TokenStream},
    tokens::{Token, TokenKind},
    tree::{NodeId, Tree},
};
use itertools::Itertools;
use log::{debug, info};
use smol_str::SmolStr;
use std::{error::Error, fmt};

/// Node of the concrete syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CstNode {
    /// Grammar production.
    Production(&'static str),
    /// Matched token, labelled with its lexeme.
    Terminal(SmolStr),
}

impl fmt::Display for CstNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CstNode::Production(name) => write!(f, "<{}>", name),
            CstNode::Terminal(lexeme) => write!(f, "[{}]", lexeme),
        }
    }
}

pub type Cst = Tree<CstNode>;

/// Parse the tokens of one program, which must end with `EOP`.
pub fn parse_program(tokens: Vec<Token>) -> Result<Cst, ParseError> {
    let mut parser = Parser::new(tokens);
    parser.program()?;
    info!("Parse completed with {} CST nodes", parser.cst.len());
    Ok(parser.cst)
}

pub struct Parser {
    input: TokenStream,
    cst: Cst,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            input: TokenStream::new(tokens),
            cst: Tree::new(),
        }
    }

    #[inline]
    fn production(&mut self, parent: Option<NodeId>, name: &'static str) -> NodeId {
        debug!("parse {}", name);
        self.cst.insert(parent, CstNode::Production(name))
    }

    /// Consume a token of the expected kind and record it as a leaf.
    fn terminal(&mut self, parent: NodeId, kind: TokenKind) -> Result<Token, ParseError> {
        self.terminal_any(parent, &[kind])
    }

    fn terminal_any(&mut self, parent: NodeId, kinds: &[TokenKind]) -> Result<Token, ParseError> {
        let token = self.input.consume_any(kinds)?;
        self.cst.insert(Some(parent), CstNode::Terminal(token.lexeme.clone()));
        Ok(token)
    }

    fn peek_kind(&mut self) -> Option<TokenKind> {
        self.input.peek_kind()
    }

    /// Error for a token that starts none of the given alternatives.
    fn unexpected(&mut self, expected: &[TokenKind]) -> ParseError {
        ParseError {
            expected: expected.to_vec(),
            found: self.input.peek().ok().cloned(),
        }
    }
}

/// First syntax error of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub expected: Vec<TokenKind>,
    /// `None` when the stream ran out.
    pub found: Option<Token>,
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected [ {} ], ", self.expected.iter().join(" | "))?;
        match &self.found {
            Some(token) => write!(
                f,
                "found [ {} ] with value '{}' at ({}:{})",
                token.kind, token.lexeme, token.span.line, token.span.column
            ),
            None => write!(f, "found end of token stream"),
        }
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Mismatch { expected, encountered } => ParseError {
                expected,
                found: Some(encountered),
            },
            TokenError::EndOfSource => ParseError {
                expected: vec![],
                found: None,
            },
        }
    }
}
