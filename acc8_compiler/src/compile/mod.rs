//! Code generation.
//!
//! Emits a placeholder cell stream from the abstract syntax tree,
//! backpatches it, and splices it with the string heap into the final
//! executable image.
mod backpatch;
mod codegen;
mod heap;
mod image;
mod scratch;

pub use backpatch::{render_cells, Cell, JumpEntry, JumpId, JumpTable, VarId, VarOwner, VariableEntry, VariableTable};
pub use codegen::{CodeGen, Generated};
pub use heap::{Heap, FALSE_ADDRESS, TRUE_ADDRESS};
pub use image::Image;

use smol_str::SmolStr;
use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Code and variable storage run into the heap.
    ImageOverflow {
        code: usize,
        variables: usize,
        heap_start: usize,
    },
    /// A string literal doesn't fit into the image.
    HeapOverflow { string: SmolStr },
    /// Identifier without a resolved symbol, or a symbol without storage.
    UnresolvedSymbol(char),
    /// Jump placeholder whose distance was never recorded.
    UnresolvedJump(SmolStr),
    /// Abstract syntax tree is not shaped the way the semantic walk builds it.
    MalformedTree(&'static str),
}

impl CompileError {
    /// Whether the error is caused by the program being too large.
    pub fn is_overflow(&self) -> bool {
        matches!(self, CompileError::ImageOverflow { .. } | CompileError::HeapOverflow { .. })
    }
}

impl error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use CompileError as E;
        match self {
            E::ImageOverflow {
                code,
                variables,
                heap_start,
            } => write!(
                f,
                "image overflow, {} bytes of code and {} variable(s) run into the heap at {:#04X}",
                code, variables, heap_start
            ),
            E::HeapOverflow { string } => write!(f, "image overflow, string \"{}\" does not fit on the heap", string),
            E::UnresolvedSymbol(name) => write!(f, "identifier [ {} ] has no resolved storage", name),
            E::UnresolvedJump(placeholder) => write!(f, "jump {} has no recorded distance", placeholder),
            E::MalformedTree(reason) => write!(f, "malformed syntax tree: {}", reason),
        }
    }
}
