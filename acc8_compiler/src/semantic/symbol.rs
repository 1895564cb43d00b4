use super::scope::{ScopeId, ScopeTree};
use crate::tokens::{Span, TokenKind};
use std::fmt;

/// Declared type of a variable, or the type an expression evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    String,
    Boolean,
}

impl ValueType {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::TypeInt => Some(ValueType::Int),
            TokenKind::TypeString => Some(ValueType::String),
            TokenKind::TypeBoolean => Some(ValueType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueType::Int => f.write_str("int"),
            ValueType::String => f.write_str("string"),
            ValueType::Boolean => f.write_str("boolean"),
        }
    }
}

/// Index of a symbol in its [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(usize);

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: char,
    pub ty: ValueType,
    /// Scope of the block the declaration appears in.
    pub scope: ScopeId,
    pub initialized: bool,
    pub used: bool,
    /// Location of the declared identifier.
    pub span: Span,
}

impl Symbol {
    pub fn new(name: char, ty: ValueType, scope: ScopeId, span: Span) -> Self {
        Self {
            name,
            ty,
            scope,
            initialized: false,
            used: false,
            span,
        }
    }
}

/// Flat list of every declaration in a program.
///
/// Symbols are never removed. Shadowing is resolved through the
/// scope identifiers, not through table structure.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0)
    }

    /// Symbol declared with the name directly in the given scope.
    pub fn find_in_scope(&self, name: char, scope: ScopeId) -> Option<SymbolId> {
        self.symbols
            .iter()
            .position(|symbol| symbol.name == name && symbol.scope == scope)
            .map(SymbolId)
    }

    /// Resolve a name as seen from `scope`.
    ///
    /// Scopes are searched innermost first, so an inner declaration
    /// shadows an outer one with the same name.
    pub fn lookup(&self, name: char, scope: ScopeId, scopes: &ScopeTree) -> Option<SymbolId> {
        scopes.ancestors(scope).find_map(|ancestor| self.find_in_scope(name, ancestor))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(index, symbol)| (SymbolId(index), symbol))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const RULE: &str = "+------+---------+-------+--------+--------+";

        writeln!(f, "{}", RULE)?;
        writeln!(f, "| Name | Type    | Scope | isInit | isUsed |")?;
        writeln!(f, "{}", RULE)?;
        for symbol in &self.symbols {
            writeln!(
                f,
                "| {:<4} | {:<7} | {:<5} | {:<6} | {:<6} |",
                symbol.name,
                symbol.ty.to_string(),
                symbol.scope.to_string(),
                symbol.initialized,
                symbol.used
            )?;
        }
        writeln!(f, "{}", RULE)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup_prefers_inner_scope() {
        let mut scopes = ScopeTree::new();
        let outer = scopes.enter(None);
        let inner = scopes.enter(Some(outer));
        let sibling = scopes.enter(Some(outer));

        let mut symbols = SymbolTable::new();
        let outer_x = symbols.insert(Symbol::new('x', ValueType::Int, outer, Span::default()));
        let inner_x = symbols.insert(Symbol::new('x', ValueType::String, inner, Span::default()));

        assert_eq!(symbols.lookup('x', inner, &scopes), Some(inner_x));
        assert_eq!(symbols.lookup('x', sibling, &scopes), Some(outer_x));
        assert_eq!(symbols.lookup('x', outer, &scopes), Some(outer_x));
        assert_eq!(symbols.lookup('y', inner, &scopes), None);
    }

    #[test]
    fn test_render() {
        let mut scopes = ScopeTree::new();
        let scope = scopes.enter(None);
        let mut symbols = SymbolTable::new();
        symbols.insert(Symbol::new('a', ValueType::Boolean, scope, Span::default()));

        let table = symbols.to_string();
        assert!(table.contains("| a    | boolean | 0     | false  | false  |"));
    }
}
