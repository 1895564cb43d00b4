use super::backpatch::{VarId, VarOwner, VariableTable};
use std::fmt;

/// Compiler-owned storage cells for intermediate values.
///
/// One cell exists per nesting depth of expression evaluation. An
/// expression acquires the cell at the current depth, and releases it
/// once the value has been consumed, so cells are reused across
/// statements without clobbering values still held by an outer
/// expression.
#[derive(Default)]
pub struct ScratchPool {
    cells: Vec<VarId>,
    /// Number of cells currently held.
    depth: usize,
}

impl ScratchPool {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the cell for the next depth, creating it on first use.
    pub fn acquire(&mut self, variables: &mut VariableTable) -> VarId {
        let depth = self.depth;
        if depth == self.cells.len() {
            self.cells.push(variables.add(VarOwner::Scratch(depth)));
        }
        self.depth += 1;
        self.cells[depth]
    }

    /// Free the most recently acquired cell.
    #[inline]
    pub fn release(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl fmt::Debug for ScratchPool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ScratchPool({}/{})", self.depth, self.cells.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cells_reused_per_depth() {
        let mut variables = VariableTable::new();
        let mut pool = ScratchPool::new();

        let outer = pool.acquire(&mut variables);
        let inner = pool.acquire(&mut variables);
        assert_ne!(outer, inner);
        pool.release();
        pool.release();

        assert_eq!(pool.acquire(&mut variables), outer);
        assert_eq!(variables.len(), 2);
    }
}
