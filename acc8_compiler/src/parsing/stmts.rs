//! Statement parsing.
use super::{ParseError, Parser};
use crate::{tokens::TokenKind, tree::NodeId};

/// Tokens that can start a statement.
const STATEMENT_START: &[TokenKind] = &[
    TokenKind::Print,
    TokenKind::Id,
    TokenKind::TypeInt,
    TokenKind::TypeString,
    TokenKind::TypeBoolean,
    TokenKind::While,
    TokenKind::If,
    TokenKind::OpenBlock,
];

const TYPES: &[TokenKind] = &[TokenKind::TypeInt, TokenKind::TypeString, TokenKind::TypeBoolean];

impl Parser {
    /// StatementList ::= Statement StatementList | ε
    pub(super) fn statement_list(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Statement List");

        match self.peek_kind() {
            Some(kind) if STATEMENT_START.contains(&kind) => {
                self.statement(node)?;
                self.statement_list(node)
            }
            // Empty production. The enclosing block checks for `}`.
            _ => Ok(()),
        }
    }

    fn statement(&mut self, parent: NodeId) -> Result<(), ParseError> {
        use TokenKind as T;

        let node = self.production(Some(parent), "Statement");

        match self.peek_kind() {
            Some(T::Print) => self.print_statement(node),
            Some(T::Id) => self.assignment_statement(node),
            Some(T::TypeInt | T::TypeString | T::TypeBoolean) => self.var_decl(node),
            Some(T::While) => self.while_statement(node),
            Some(T::If) => self.if_statement(node),
            Some(T::OpenBlock) => self.block(node),
            _ => Err(self.unexpected(STATEMENT_START)),
        }
    }

    /// PrintStatement ::= print ( Expr )
    fn print_statement(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Print Statement");
        self.terminal(node, TokenKind::Print)?;
        self.terminal(node, TokenKind::OpenParen)?;
        self.expr(node)?;
        self.terminal(node, TokenKind::CloseParen)?;
        Ok(())
    }

    /// AssignmentStatement ::= Id = Expr
    fn assignment_statement(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Assignment Statement");
        self.id(node)?;
        self.terminal(node, TokenKind::AssignOp)?;
        self.expr(node)
    }

    /// VarDecl ::= type Id
    fn var_decl(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Variable Declaration");
        let ty = self.production(Some(node), "Type");
        self.terminal_any(ty, TYPES)?;
        self.id(node)
    }

    /// WhileStatement ::= while BooleanExpr Block
    fn while_statement(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "While Statement");
        self.terminal(node, TokenKind::While)?;
        self.boolean_expr(node)?;
        self.block(node)
    }

    /// IfStatement ::= if BooleanExpr Block
    fn if_statement(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "If Statement");
        self.terminal(node, TokenKind::If)?;
        self.boolean_expr(node)?;
        self.block(node)
    }
}
