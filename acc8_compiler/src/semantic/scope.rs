use crate::tree::{NodeId, Tree};
use std::fmt;

/// Identifier minted once per block entry.
///
/// Identifiers increase monotonically over the whole program and are
/// never reused, so sibling blocks never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub usize);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nesting of block scopes, keyed by scope identifier.
#[derive(Debug, Default, Clone)]
pub struct ScopeTree {
    tree: Tree<ScopeId>,
    /// Tree node of each scope, indexed by identifier.
    nodes: Vec<NodeId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new scope nested in `parent`.
    ///
    /// The first scope minted is `0` and becomes the root.
    pub fn enter(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let scope = ScopeId(self.nodes.len());
        let parent_node = parent.and_then(|parent| self.nodes.get(parent.0).copied());
        let node = self.tree.insert(parent_node, scope);
        self.nodes.push(node);
        scope
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        let node = self.nodes.get(scope.0)?;
        let parent = self.tree.parent(*node)?;
        self.tree.get(parent).copied()
    }

    /// Scopes from `scope` outward to the root, starting with `scope` itself.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        self.nodes
            .get(scope.0)
            .into_iter()
            .flat_map(move |node| self.tree.ancestors(*node))
            .filter_map(move |node| self.tree.get(node).copied())
    }

    pub fn depth(&self, scope: ScopeId) -> usize {
        self.nodes.get(scope.0).map(|node| self.tree.depth(*node)).unwrap_or(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for ScopeTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (node, depth) in self.tree.iter_depth_first() {
            if let Some(scope) = self.tree.get(node) {
                writeln!(f, "{}<Scope {}>", "-".repeat(depth), scope)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sibling_scopes_are_distinct() {
        let mut scopes = ScopeTree::new();
        let root = scopes.enter(None);
        let first = scopes.enter(Some(root));
        let nested = scopes.enter(Some(first));
        let second = scopes.enter(Some(root));

        assert_eq!(root, ScopeId(0));
        assert_eq!(second, ScopeId(3));
        assert_eq!(scopes.parent(second), Some(root));
        assert_eq!(scopes.parent(root), None);
        assert_eq!(scopes.ancestors(nested).collect::<Vec<_>>(), vec![nested, first, root]);
        assert_eq!(scopes.depth(nested), 2);
    }

    #[test]
    fn test_render() {
        let mut scopes = ScopeTree::new();
        let root = scopes.enter(None);
        scopes.enter(Some(root));
        assert_eq!(scopes.to_string(), "<Scope 0>\n-<Scope 1>\n");
    }
}
