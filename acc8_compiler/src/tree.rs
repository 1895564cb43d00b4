//! Arena backed tree shared by the concrete syntax tree, the abstract
//! syntax tree and the scope tree.
//!
//! Nodes are owned by the arena and refer to each other by [`NodeId`],
//! so the parent back-reference never implies ownership.
use std::fmt;

/// Handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Node<T> {
    pub value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<T> Node<T> {
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            root: None,
        }
    }

    /// Add a node as the last child of `parent`.
    ///
    /// Passing `None` makes the node the root. Trees built by the
    /// compiler have exactly one root, so the first parentless node wins
    /// and later ones are detached.
    pub fn insert(&mut self, parent: Option<NodeId>, value: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent,
            children: vec![],
        });

        match parent {
            Some(parent_id) => self.nodes[parent_id.0].children.push(id),
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }

        id
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0).map(|node| &node.value)
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0).map(|node| &mut node.value)
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// Children of the node in insertion order.
    ///
    /// Unknown nodes have no children.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Number of edges between the node and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count().saturating_sub(1)
    }

    /// Walk from the node up to the root, starting with the node itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, T> {
        Ancestors {
            tree: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// Pre-order depth first traversal from the root, yielding each
    /// node with its depth.
    pub fn iter_depth_first(&self) -> DepthFirst<'_, T> {
        DepthFirst {
            tree: self,
            stack: self.root.map(|id| (id, 0)).into_iter().collect(),
        }
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

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::new()
    }
}

pub struct Ancestors<'a, T> {
    tree: &'a Tree<T>,
    next: Option<NodeId>,
}

impl<'a, T> Iterator for Ancestors<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct DepthFirst<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<(NodeId, usize)>,
}

impl<'a, T> Iterator for DepthFirst<'a, T> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;

        // Reversed so the first child is popped first.
        for child in self.tree.children(id).iter().rev() {
            self.stack.push((*child, depth + 1));
        }

        Some((id, depth))
    }
}

/// Renders one node per line, prefixed with a dash per level of depth.
impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, depth) in self.iter_depth_first() {
            if let Some(value) = self.get(id) {
                writeln!(f, "{}{}", "-".repeat(depth), value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> (Tree<&'static str>, [NodeId; 4]) {
        let mut tree = Tree::new();
        let root = tree.insert(None, "root");
        let a = tree.insert(Some(root), "a");
        let b = tree.insert(Some(a), "b");
        let c = tree.insert(Some(root), "c");
        (tree, [root, a, b, c])
    }

    #[test]
    fn test_depth_and_ancestors() {
        let (tree, [root, a, b, c]) = sample();
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.depth(root), 0);
        assert_eq!(tree.depth(b), 2);
        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![b, a, root]);
        assert_eq!(tree.parent(c), Some(root));
        assert_eq!(tree.children(root), &[a, c]);
    }

    #[test]
    fn test_depth_first_order() {
        let (tree, [root, a, b, c]) = sample();
        let order: Vec<_> = tree.iter_depth_first().collect();
        assert_eq!(order, vec![(root, 0), (a, 1), (b, 2), (c, 1)]);
    }

    #[test]
    fn test_render() {
        let (tree, _) = sample();
        assert_eq!(tree.to_string(), "root\n-a\n--b\n-c\n");
    }

    #[test]
    fn test_get_mut() {
        let (mut tree, [_, a, _, _]) = sample();
        if let Some(value) = tree.get_mut(a) {
            *value = "changed";
        }
        assert_eq!(tree.get(a), Some(&"changed"));
    }
}
