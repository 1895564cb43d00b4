//! Semantic analysis.
//!
//! A second recursive descent over the token stream of a program that
//! already parsed. Instead of recording syntax it builds the scope tree,
//! the symbol table and a pruned abstract syntax tree, and reports
//! scope and type problems.
mod ast;
mod scope;
mod symbol;

pub use ast::{Ast, AstNode};
pub use scope::{ScopeId, ScopeTree};
pub use symbol::{Symbol, SymbolId, SymbolTable, ValueType};

use crate::{
    diagnostic::{DiagnosticKind, Diagnostics, Phase},
    token_stream::{TokenError, TokenStream},
    tokens::{Span, Token, TokenKind},
    tree::{NodeId, Tree},
};
use log::{info, trace};
use smol_str::SmolStr;

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

const EXPR_START: &[TokenKind] = &[
    TokenKind::Digit,
    TokenKind::Quote,
    TokenKind::OpenParen,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Id,
];

const TYPES: &[TokenKind] = &[TokenKind::TypeInt, TokenKind::TypeString, TokenKind::TypeBoolean];

type WalkResult<T> = Result<T, TokenError>;

/// Everything the semantic walk produces for one program.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub ast: Ast,
    pub scopes: ScopeTree,
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    #[inline]
    pub fn success(&self) -> bool {
        self.diagnostics.success()
    }
}

pub struct Analyzer {
    input: TokenStream,
    ast: Ast,
    scopes: ScopeTree,
    symbols: SymbolTable,
    diagnostics: Diagnostics,
    /// Scope of the block currently being walked.
    scope: Option<ScopeId>,
}

impl Analyzer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            input: TokenStream::new(tokens),
            ast: Tree::new(),
            scopes: ScopeTree::new(),
            symbols: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
            scope: None,
        }
    }

    pub fn analyze(mut self) -> Analysis {
        info!("Semantic analysis started");

        match self.program() {
            Ok(()) => self.sweep_warnings(),
            Err(err) => self.diagnostics.report(
                DiagnosticKind::Internal,
                Phase::SemanticAnalyzer,
                format!("token stream does not follow the grammar: {}", err),
            ),
        }

        if self.diagnostics.success() {
            info!(
                "Semantic analysis completed with {} error(s) and {} warning(s)",
                self.diagnostics.error_count(),
                self.diagnostics.warning_count()
            );
        } else {
            info!(
                "Semantic analysis failed with {} error(s) and {} warning(s)",
                self.diagnostics.error_count(),
                self.diagnostics.warning_count()
            );
        }

        Analysis {
            ast: self.ast,
            scopes: self.scopes,
            symbols: self.symbols,
            diagnostics: self.diagnostics,
        }
    }

    /// Warnings for symbols that were never assigned, or never read.
    fn sweep_warnings(&mut self) {
        for (_, symbol) in self.symbols.iter() {
            if !symbol.initialized {
                self.diagnostics.report_at(
                    DiagnosticKind::Uninitialized,
                    Phase::SemanticAnalyzer,
                    symbol.span,
                    format!(
                        "variable [ {} ] of type {} in scope {} is never initialized, its default value is used",
                        symbol.name, symbol.ty, symbol.scope
                    ),
                );
            }
            if !symbol.used {
                self.diagnostics.report_at(
                    DiagnosticKind::Unused,
                    Phase::SemanticAnalyzer,
                    symbol.span,
                    format!(
                        "variable [ {} ] of type {} in scope {} is declared but never used",
                        symbol.name, symbol.ty, symbol.scope
                    ),
                );
            }
        }
    }

    fn error(&mut self, kind: DiagnosticKind, span: Span, message: String) {
        self.diagnostics.report_at(kind, Phase::SemanticAnalyzer, span, message);
    }

    #[inline]
    fn node(&mut self, parent: Option<NodeId>, value: AstNode) -> NodeId {
        self.ast.insert(parent, value)
    }

    /// Resolve an identifier from the current scope, reporting it when undeclared.
    fn resolve(&mut self, name: char, span: Span) -> Option<SymbolId> {
        let found = self
            .scope
            .and_then(|scope| self.symbols.lookup(name, scope, &self.scopes));

        if found.is_none() {
            self.error(
                DiagnosticKind::UndeclaredVariable,
                span,
                format!("variable [ {} ] is used before it is declared", name),
            );
        }

        found
    }

    fn mismatch(&mut self, expected: &[TokenKind]) -> TokenError {
        match self.input.peek() {
            Ok(token) => TokenError::Mismatch {
                expected: expected.to_vec(),
                encountered: token.clone(),
            },
            Err(err) => err,
        }
    }
}

/// Productions
impl Analyzer {
    /// Program ::= Block $
    fn program(&mut self) -> WalkResult<()> {
        self.block(None)?;
        self.input.consume(TokenKind::Eop)?;
        Ok(())
    }

    /// Block ::= { StatementList }
    fn block(&mut self, parent: Option<NodeId>) -> WalkResult<()> {
        self.input.consume(TokenKind::OpenBlock)?;

        let scope = self.scopes.enter(self.scope);
        trace!("enter scope {}", scope);
        let node = self.node(parent, AstNode::Block(scope));
        let outer = self.scope.replace(scope);

        self.statement_list(node)?;
        self.input.consume(TokenKind::CloseBlock)?;

        // The identifier itself is never handed out again.
        self.scope = outer;
        Ok(())
    }

    /// StatementList ::= Statement StatementList | ε
    fn statement_list(&mut self, parent: NodeId) -> WalkResult<()> {
        while let Some(kind) = self.input.peek_kind() {
            if !STATEMENT_START.contains(&kind) {
                break;
            }
            self.statement(parent)?;
        }
        Ok(())
    }

    fn statement(&mut self, parent: NodeId) -> WalkResult<()> {
        use TokenKind as T;

        match self.input.peek_kind() {
            Some(T::Print) => self.print_statement(parent),
            Some(T::Id) => self.assignment_statement(parent),
            Some(T::TypeInt | T::TypeString | T::TypeBoolean) => self.var_decl(parent),
            Some(T::While) => self.while_statement(parent),
            Some(T::If) => self.if_statement(parent),
            Some(T::OpenBlock) => self.block(Some(parent)),
            _ => Err(self.mismatch(STATEMENT_START)),
        }
    }

    /// PrintStatement ::= print ( Expr )
    fn print_statement(&mut self, parent: NodeId) -> WalkResult<()> {
        self.input.consume(TokenKind::Print)?;
        self.input.consume(TokenKind::OpenParen)?;
        let node = self.node(Some(parent), AstNode::PrintStatement);
        self.expr(node)?;
        self.input.consume(TokenKind::CloseParen)?;
        Ok(())
    }

    /// AssignmentStatement ::= Id = Expr
    fn assignment_statement(&mut self, parent: NodeId) -> WalkResult<()> {
        let id = self.input.consume(TokenKind::Id)?;
        let name = name_of(&id);
        let node = self.node(Some(parent), AstNode::AssignmentStatement);

        // Assignment target is not a read.
        let symbol = self.resolve(name, id.span);
        self.node(Some(node), AstNode::Id { name, symbol });

        self.input.consume(TokenKind::AssignOp)?;
        let value_ty = self.expr(node)?;

        if let (Some(symbol_id), Some(value_ty)) = (symbol, value_ty) {
            if let Some(symbol) = self.symbols.get_mut(symbol_id) {
                if symbol.ty == value_ty {
                    symbol.initialized = true;
                } else {
                    let message = format!(
                        "type mismatch, cannot assign {} to variable [ {} ] of type {}",
                        value_ty, symbol.name, symbol.ty
                    );
                    self.error(DiagnosticKind::TypeMismatch, id.span, message);
                }
            }
        }

        Ok(())
    }

    /// VarDecl ::= type Id
    fn var_decl(&mut self, parent: NodeId) -> WalkResult<()> {
        let type_token = self.input.consume_any(TYPES)?;
        let id = self.input.consume(TokenKind::Id)?;

        let ty = ValueType::from_token(type_token.kind).ok_or_else(|| TokenError::Mismatch {
            expected: TYPES.to_vec(),
            encountered: type_token.clone(),
        })?;
        let name = name_of(&id);
        let scope = self.scope.ok_or(TokenError::EndOfSource)?;

        let node = self.node(Some(parent), AstNode::VarDecl);
        self.node(Some(node), AstNode::Type(ty));

        let symbol = match self.symbols.find_in_scope(name, scope) {
            Some(_) => {
                self.error(
                    DiagnosticKind::Redeclaration,
                    id.span,
                    format!("variable [ {} ] is already declared in scope {}", name, scope),
                );
                None
            }
            None => Some(self.symbols.insert(Symbol::new(name, ty, scope, id.span))),
        };
        self.node(Some(node), AstNode::Id { name, symbol });

        Ok(())
    }

    /// WhileStatement ::= while BooleanExpr Block
    fn while_statement(&mut self, parent: NodeId) -> WalkResult<()> {
        self.input.consume(TokenKind::While)?;
        let node = self.node(Some(parent), AstNode::WhileStatement);
        self.boolean_expr(node)?;
        self.block(Some(node))
    }

    /// IfStatement ::= if BooleanExpr Block
    fn if_statement(&mut self, parent: NodeId) -> WalkResult<()> {
        self.input.consume(TokenKind::If)?;
        let node = self.node(Some(parent), AstNode::IfStatement);
        self.boolean_expr(node)?;
        self.block(Some(node))
    }

    /// Expr ::= IntExpr | StringExpr | BooleanExpr | Id
    ///
    /// Returns the type the expression evaluates to, or `None` when it
    /// refers to an undeclared variable.
    fn expr(&mut self, parent: NodeId) -> WalkResult<Option<ValueType>> {
        use TokenKind as T;

        match self.input.peek_kind() {
            Some(T::Digit) => self.int_expr(parent),
            Some(T::Quote) => self.string_expr(parent),
            Some(T::OpenParen | T::True | T::False) => self.boolean_expr(parent),
            Some(T::Id) => self.id_read(parent),
            _ => Err(self.mismatch(EXPR_START)),
        }
    }

    /// IntExpr ::= digit intop Expr | digit
    fn int_expr(&mut self, parent: NodeId) -> WalkResult<Option<ValueType>> {
        let digit = self.input.consume(TokenKind::Digit)?;
        let value = digit_of(&digit);

        if !self.input.match_token(TokenKind::AddOp) {
            self.node(Some(parent), AstNode::Digit(value));
            return Ok(Some(ValueType::Int));
        }

        let node = self.node(Some(parent), AstNode::Add);
        self.node(Some(node), AstNode::Digit(value));

        match self.expr(node)? {
            Some(ValueType::Int) | None => {}
            Some(other) => self.error(
                DiagnosticKind::TypeMismatch,
                digit.span,
                format!("type mismatch, cannot add {} to int", other),
            ),
        }

        Ok(Some(ValueType::Int))
    }

    /// StringExpr ::= " CharList "
    fn string_expr(&mut self, parent: NodeId) -> WalkResult<Option<ValueType>> {
        self.input.consume(TokenKind::Quote)?;

        let mut value = String::new();
        while self.input.peek_kind() == Some(TokenKind::Char) {
            let c = self.input.consume(TokenKind::Char)?;
            value.push_str(&c.lexeme);
        }

        self.input.consume(TokenKind::Quote)?;
        self.node(Some(parent), AstNode::Str(SmolStr::from(value)));

        Ok(Some(ValueType::String))
    }

    /// BooleanExpr ::= ( Expr boolop Expr ) | boolval
    fn boolean_expr(&mut self, parent: NodeId) -> WalkResult<Option<ValueType>> {
        use TokenKind as T;

        match self.input.peek_kind() {
            Some(T::True) | Some(T::False) => {
                let token = self.input.consume_any(&[T::True, T::False])?;
                self.node(Some(parent), AstNode::Bool(token.kind == T::True));
            }
            Some(T::OpenParen) => {
                let open = self.input.consume(T::OpenParen)?;

                // Operator comes after the left operand, so the node is
                // relabelled once it is known.
                let node = self.node(Some(parent), AstNode::IsEqual);
                let lhs = self.expr(node)?;
                let op = self.input.consume_any(&[T::EqualityOp, T::InequalityOp])?;
                if op.kind == T::InequalityOp {
                    if let Some(value) = self.ast.get_mut(node) {
                        *value = AstNode::IsNotEqual;
                    }
                }
                let rhs = self.expr(node)?;
                self.input.consume(T::CloseParen)?;

                if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
                    if lhs != rhs {
                        self.error(
                            DiagnosticKind::TypeMismatch,
                            open.span,
                            format!("type mismatch, cannot compare {} with {}", lhs, rhs),
                        );
                    }
                }
            }
            _ => return Err(self.mismatch(&[T::OpenParen, T::True, T::False])),
        }

        Ok(Some(ValueType::Boolean))
    }

    /// Identifier in a read position.
    fn id_read(&mut self, parent: NodeId) -> WalkResult<Option<ValueType>> {
        let id = self.input.consume(TokenKind::Id)?;
        let name = name_of(&id);
        let symbol = self.resolve(name, id.span);
        self.node(Some(parent), AstNode::Id { name, symbol });

        Ok(symbol.and_then(|symbol_id| {
            let symbol = self.symbols.get_mut(symbol_id)?;
            symbol.used = true;
            Some(symbol.ty)
        }))
    }
}

#[inline]
fn name_of(token: &Token) -> char {
    token.first_char().unwrap_or_default()
}

#[inline]
fn digit_of(token: &Token) -> u8 {
    token.first_char().and_then(|c| c.to_digit(10)).unwrap_or_default() as u8
}
