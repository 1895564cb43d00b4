use super::{ParseError, Parser};
use crate::{tokens::TokenKind, tree::NodeId};

impl Parser {
    /// Program ::= Block $
    pub(super) fn program(&mut self) -> Result<(), ParseError> {
        let root = self.production(None, "Program");
        self.block(root)?;
        self.terminal(root, TokenKind::Eop)?;
        Ok(())
    }

    /// Block ::= { StatementList }
    pub(super) fn block(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let node = self.production(Some(parent), "Block");
        self.terminal(node, TokenKind::OpenBlock)?;
        self.statement_list(node)?;
        self.terminal(node, TokenKind::CloseBlock)?;
        Ok(())
    }
}
