//! Expression parsing.
use super::{ParseError, Parser};
use crate::{tokens::TokenKind, tree::NodeId};

/// Tokens that can start an expression.
const EXPR_START: &[TokenKind] = &[
    TokenKind::Digit,
    TokenKind::Quote,
    TokenKind::OpenParen,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Id,
];

const BOOL_OPS: &[TokenKind] = &[TokenKind::EqualityOp, TokenKind::InequalityOp];
const BOOL_VALUES: &[TokenKind] = &[TokenKind::True, TokenKind::False];

impl Parser {
    /// Expr ::= IntExpr | StringExpr | BooleanExpr | Id
    pub(super) fn expr(&mut self, parent: NodeId) -> Result<(), ParseError> {
        use TokenKind as T;

        let node = self.production(Some(parent), "Expression");

        match self.peek_kind() {
            Some(T::Digit) => self.int_expr(node),
            Some(T::Quote) => self.string_expr(node),
            Some(T::OpenParen | T::True | T::False) => self.boolean_expr(node),
            Some(T::Id) => self.id(node),
            _ => Err(self.unexpected(EXPR_START)),
        }
    }

    /// IntExpr ::= digit intop Expr | digit
    fn int_expr(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Int Expression");
        self.terminal(node, TokenKind::Digit)?;

        if self.peek_kind() == Some(TokenKind::AddOp) {
            self.terminal(node, TokenKind::AddOp)?;
            self.expr(node)?;
        }

        Ok(())
    }

    /// StringExpr ::= " CharList "
    fn string_expr(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "String Expression");
        self.terminal(node, TokenKind::Quote)?;
        self.char_list(node)?;
        self.terminal(node, TokenKind::Quote)?;
        Ok(())
    }

    /// CharList ::= char CharList | ε
    fn char_list(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Char List");

        if self.peek_kind() == Some(TokenKind::Char) {
            self.terminal(node, TokenKind::Char)?;
            self.char_list(node)?;
        }

        Ok(())
    }

    /// BooleanExpr ::= ( Expr boolop Expr ) | boolval
    pub(super) fn boolean_expr(&mut self, parent: NodeId) -> Result<(), ParseError> {
        use TokenKind as T;

        let node = self.production(Some(parent), "Boolean Expression");

        match self.peek_kind() {
            Some(T::OpenParen) => {
                self.terminal(node, T::OpenParen)?;
                self.expr(node)?;
                self.terminal_any(node, BOOL_OPS)?;
                self.expr(node)?;
                self.terminal(node, T::CloseParen)?;
                Ok(())
            }
            Some(T::True | T::False) => {
                self.terminal_any(node, BOOL_VALUES)?;
                Ok(())
            }
            _ => Err(self.unexpected(&[T::OpenParen, T::True, T::False])),
        }
    }

    pub(super) fn id(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Id");
        self.terminal(node, TokenKind::Id)?;
        Ok(())
    }
}
