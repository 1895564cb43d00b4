use super::{scope::ScopeId, symbol::SymbolId, symbol::ValueType};
use crate::tree::Tree;
use smol_str::SmolStr;
use std::fmt;

pub type Ast = Tree<AstNode>;

/// Node of the abstract syntax tree.
///
/// Only semantically meaningful productions are kept. Child layout:
///
/// | node                  | children        |
/// |-----------------------|-----------------|
/// | `Block`               | statements      |
/// | `PrintStatement`      | expr            |
/// | `AssignmentStatement` | `Id`, expr      |
/// | `VarDecl`             | `Type`, `Id`    |
/// | `WhileStatement`      | guard, `Block`  |
/// | `IfStatement`         | guard, `Block`  |
/// | `Add`                 | `Digit`, expr   |
/// | `IsEqual`             | expr, expr      |
/// | `IsNotEqual`          | expr, expr      |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    Block(ScopeId),
    PrintStatement,
    AssignmentStatement,
    VarDecl,
    WhileStatement,
    IfStatement,
    Add,
    IsEqual,
    IsNotEqual,
    Type(ValueType),
    /// Identifier and the symbol it resolved to during the walk.
    Id {
        name: char,
        symbol: Option<SymbolId>,
    },
    Digit(u8),
    Bool(bool),
    Str(SmolStr),
}

impl fmt::Display for AstNode {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use AstNode as N;
        match self {
            N::Block(_)             => write!(f, "<Block>"),
            N::PrintStatement       => write!(f, "<Print Statement>"),
            N::AssignmentStatement  => write!(f, "<Assignment Statement>"),
            N::VarDecl              => write!(f, "<Variable Declaration>"),
            N::WhileStatement       => write!(f, "<While Statement>"),
            N::IfStatement          => write!(f, "<If Statement>"),
            N::Add                  => write!(f, "<Add>"),
            N::IsEqual              => write!(f, "<IsEqual>"),
            N::IsNotEqual           => write!(f, "<IsNotEqual>"),
            N::Type(ty)             => write!(f, "[{}]", ty),
            N::Id { name, .. }      => write!(f, "[{}]", name),
            N::Digit(digit)         => write!(f, "[{}]", digit),
            N::Bool(value)          => write!(f, "[{}]", value),
            N::Str(s)               => write!(f, "[\"{}\"]", s),
        }
    }
}
