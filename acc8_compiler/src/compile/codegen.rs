use super::{
    backpatch::{into_bytes, patch_addresses, patch_jumps, Cell, JumpId, JumpTable, VarId, VarOwner, VariableTable},
    heap::{Heap, FALSE_ADDRESS, TRUE_ADDRESS},
    image::Image,
    scratch::ScratchPool,
    CompileError,
};
use crate::{
    diagnostic::{DiagnosticKind, Diagnostics, Phase},
    semantic::{Analysis, Ast, AstNode, SymbolTable, ValueType},
    tree::NodeId,
};
use acc8_core::{Opcode, IMAGE_SIZE, PRINT_INT, PRINT_STRING, STRING_SENTINEL};
use log::{debug, info, trace};
use std::convert::TryFrom;

/// Output of code generation, kept whole for diagnostics.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Final image, when generation succeeded.
    pub image: Option<Image>,
    /// Emitted code before backpatching.
    pub cells: Vec<Cell>,
    pub variables: VariableTable,
    pub jumps: JumpTable,
    pub heap: Heap,
    /// Length of the code including the final halt.
    pub code_len: usize,
    pub diagnostics: Diagnostics,
}

impl Generated {
    #[inline]
    pub fn success(&self) -> bool {
        self.image.is_some() && self.diagnostics.success()
    }

    #[inline]
    pub fn heap_start(&self) -> usize {
        self.heap.start()
    }
}

/// Code generator.
///
/// Walks the abstract syntax tree depth first in construction order.
/// Storage addresses and forward branch distances are emitted as
/// placeholders and resolved once the whole program is generated.
pub struct CodeGen<'a> {
    ast: &'a Ast,
    symbols: &'a SymbolTable,
    cells: Vec<Cell>,
    heap: Heap,
    variables: VariableTable,
    jumps: JumpTable,
    scratch: ScratchPool,
    diagnostics: Diagnostics,
}

impl<'a> CodeGen<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            ast: &analysis.ast,
            symbols: &analysis.symbols,
            cells: vec![],
            heap: Heap::new(),
            variables: VariableTable::new(),
            jumps: JumpTable::new(),
            scratch: ScratchPool::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn generate(mut self) -> Generated {
        info!("Code generation started");

        let result = self.emit_program().and_then(|()| self.finish());
        let image = match result {
            Ok(image) => {
                info!(
                    "Code generation completed with {} bytes of code, {} variable(s) and heap at {:#04X}",
                    self.cells.len(),
                    self.variables.len(),
                    self.heap.start()
                );
                Some(image)
            }
            Err(err) => {
                let kind = if err.is_overflow() {
                    DiagnosticKind::ImageOverflow
                } else {
                    DiagnosticKind::Internal
                };
                self.diagnostics.report(kind, Phase::CodeGenerator, err.to_string());
                info!("Code generation failed with {} error(s)", self.diagnostics.error_count());
                None
            }
        };

        Generated {
            image,
            code_len: self.cells.len(),
            cells: self.cells,
            variables: self.variables,
            jumps: self.jumps,
            heap: self.heap,
            diagnostics: self.diagnostics,
        }
    }

    fn emit_program(&mut self) -> Result<(), CompileError> {
        let root = self.ast.root().ok_or(CompileError::MalformedTree("empty tree"))?;
        self.emit_stmt(root)?;
        self.emit(Opcode::Break);
        Ok(())
    }

    /// Backpatch both placeholder classes and splice the heap in.
    fn finish(&mut self) -> Result<Image, CompileError> {
        let code_len = self.cells.len();
        let heap_start = self.heap.start();
        if code_len + self.variables.len() > heap_start {
            return Err(CompileError::ImageOverflow {
                code: code_len,
                variables: self.variables.len(),
                heap_start,
            });
        }

        let mut patched = self.cells.clone();
        patch_addresses(&mut patched, &self.variables)?;
        patch_jumps(&mut patched, &self.jumps)?;
        let code = into_bytes(&patched)?;

        Image::assemble(&code, &self.heap)
    }
}

/// Tree access
impl<'a> CodeGen<'a> {
    fn value(&self, node: NodeId) -> Result<&'a AstNode, CompileError> {
        let ast = self.ast;
        ast.get(node).ok_or(CompileError::MalformedTree("dangling node"))
    }

    fn children(&self, node: NodeId) -> &'a [NodeId] {
        let ast = self.ast;
        ast.children(node)
    }

    /// The two children of a binary node.
    fn pair(&self, node: NodeId) -> Result<(NodeId, NodeId), CompileError> {
        match self.children(node) {
            [first, second] => Ok((*first, *second)),
            _ => Err(CompileError::MalformedTree("expected two children")),
        }
    }

    /// Storage of the variable an identifier resolved to.
    fn storage(&self, id: NodeId) -> Result<VarId, CompileError> {
        match self.value(id)? {
            AstNode::Id { name, symbol } => symbol
                .and_then(|symbol| self.variables.find_symbol(symbol))
                .ok_or(CompileError::UnresolvedSymbol(*name)),
            _ => Err(CompileError::MalformedTree("expected identifier")),
        }
    }

    fn symbol_type(&self, id: NodeId) -> Result<ValueType, CompileError> {
        match self.value(id)? {
            AstNode::Id { name, symbol } => symbol
                .and_then(|symbol| self.symbols.get(symbol))
                .map(|symbol| symbol.ty)
                .ok_or(CompileError::UnresolvedSymbol(*name)),
            _ => Err(CompileError::MalformedTree("expected identifier")),
        }
    }

    fn overflow(&self) -> CompileError {
        CompileError::ImageOverflow {
            code: self.cells.len(),
            variables: self.variables.len(),
            heap_start: self.heap.start(),
        }
    }
}

/// Instruction encoding
impl<'a> CodeGen<'a> {
    #[inline]
    fn emit(&mut self, opcode: Opcode) {
        self.cells.push(Cell::Byte(opcode.byte()));
    }

    fn emit_const(&mut self, opcode: Opcode, value: u8) {
        self.emit(opcode);
        self.cells.push(Cell::Byte(value));
    }

    fn emit_var(&mut self, opcode: Opcode, var: VarId) {
        self.emit(opcode);
        self.cells.push(Cell::Var(var));
        self.cells.push(Cell::VarHigh(var));
    }

    fn emit_addr(&mut self, opcode: Opcode, address: u8) {
        self.emit(opcode);
        self.cells.push(Cell::Byte(address));
        self.cells.push(Cell::Byte(0x00));
    }

    fn emit_branch(&mut self, jump: JumpId) {
        self.emit(Opcode::BranchNotEqual);
        self.cells.push(Cell::Jump(jump));
    }

    /// Branch over the next two byte instruction when not equal.
    fn emit_skip(&mut self) {
        self.emit_const(Opcode::BranchNotEqual, 2);
    }

    fn emit_syscall(&mut self, tag: u8) {
        self.emit_const(Opcode::LoadXConst, tag);
        self.emit(Opcode::System);
    }
}

/// Statements
impl<'a> CodeGen<'a> {
    fn emit_stmt(&mut self, node: NodeId) -> Result<(), CompileError> {
        match self.value(node)? {
            AstNode::Block(scope) => {
                trace!("block of scope {}", scope);
                for child in self.children(node) {
                    self.emit_stmt(*child)?;
                }
                Ok(())
            }
            AstNode::VarDecl => self.emit_var_decl(node),
            AstNode::AssignmentStatement => {
                let (id, expr) = self.pair(node)?;
                let var = self.storage(id)?;
                self.load_acc(expr)?;
                self.emit_var(Opcode::StoreAcc, var);
                Ok(())
            }
            AstNode::PrintStatement => match self.children(node) {
                [expr] => self.emit_print(*expr),
                _ => Err(CompileError::MalformedTree("print without argument")),
            },
            AstNode::IfStatement => self.emit_if(node),
            AstNode::WhileStatement => self.emit_while(node),
            _ => Err(CompileError::MalformedTree("expression in statement position")),
        }
    }

    /// Store the type's default value in fresh storage.
    ///
    /// Every type emits the same five bytes, `LDA #nn; STA addr`. Strings
    /// start out as `#FF`, the address of the empty sentinel byte at the
    /// end of the image, so nothing is allocated on the heap.
    fn emit_var_decl(&mut self, node: NodeId) -> Result<(), CompileError> {
        let (ty_node, id_node) = self.pair(node)?;
        let ty = match self.value(ty_node)? {
            AstNode::Type(ty) => *ty,
            _ => return Err(CompileError::MalformedTree("declaration without type")),
        };
        let (name, symbol) = match self.value(id_node)? {
            AstNode::Id { name, symbol } => (*name, symbol.ok_or(CompileError::UnresolvedSymbol(*name))?),
            _ => return Err(CompileError::MalformedTree("declaration without identifier")),
        };
        let scope = self
            .symbols
            .get(symbol)
            .map(|symbol| symbol.scope)
            .ok_or(CompileError::UnresolvedSymbol(name))?;

        let var = self.variables.add(VarOwner::Symbol { symbol, name, scope });
        let default = match ty {
            ValueType::String => STRING_SENTINEL,
            ValueType::Int | ValueType::Boolean => 0,
        };
        debug!("declare {} {} in scope {} as T{}XX", ty, name, scope, self.variables.len() - 1);

        self.emit_const(Opcode::LoadAccConst, default);
        self.emit_var(Opcode::StoreAcc, var);
        Ok(())
    }

    fn emit_print(&mut self, expr: NodeId) -> Result<(), CompileError> {
        use Opcode as O;

        match self.value(expr)? {
            AstNode::Digit(digit) => {
                self.emit_const(O::LoadYConst, *digit);
                self.emit_syscall(PRINT_INT);
            }
            AstNode::Bool(value) => {
                self.emit_const(O::LoadYConst, bool_string(*value));
                self.emit_syscall(PRINT_STRING);
            }
            AstNode::Str(value) => {
                let address = self.heap.allocate(value)?;
                self.emit_const(O::LoadYConst, address);
                self.emit_syscall(PRINT_STRING);
            }
            AstNode::Id { .. } => {
                let var = self.storage(expr)?;
                match self.symbol_type(expr)? {
                    ValueType::Int => {
                        self.emit_var(O::LoadYMem, var);
                        self.emit_syscall(PRINT_INT);
                    }
                    ValueType::String => {
                        self.emit_var(O::LoadYMem, var);
                        self.emit_syscall(PRINT_STRING);
                    }
                    ValueType::Boolean => {
                        // Select the heap string for the stored 0 or 1.
                        self.emit_const(O::LoadYConst, FALSE_ADDRESS);
                        self.emit_const(O::LoadXConst, 1);
                        self.emit_var(O::CompareX, var);
                        self.emit_skip();
                        self.emit_const(O::LoadYConst, TRUE_ADDRESS);
                        self.emit_syscall(PRINT_STRING);
                    }
                }
            }
            AstNode::Add => {
                self.emit_add(expr)?;
                let scratch = self.scratch.acquire(&mut self.variables);
                self.emit_var(O::StoreAcc, scratch);
                self.emit_var(O::LoadYMem, scratch);
                self.scratch.release();
                self.emit_syscall(PRINT_INT);
            }
            AstNode::IsEqual | AstNode::IsNotEqual => {
                let equal = matches!(self.value(expr)?, AstNode::IsEqual);
                self.emit_compare(expr)?;
                self.emit_const(O::LoadYConst, bool_string(!equal));
                self.emit_skip();
                self.emit_const(O::LoadYConst, bool_string(equal));
                self.emit_syscall(PRINT_STRING);
            }
            _ => return Err(CompileError::MalformedTree("statement in expression position")),
        }

        Ok(())
    }

    fn emit_if(&mut self, node: NodeId) -> Result<(), CompileError> {
        let (guard, body) = self.pair(node)?;

        match self.static_guard(guard)? {
            Some(true) => self.emit_stmt(body),
            Some(false) => {
                self.dead_code("if", body);
                Ok(())
            }
            None => {
                let jump = self.emit_guard(guard)?;
                let start = self.cells.len();
                self.emit_stmt(body)?;
                self.resolve_forward(jump, start)
            }
        }
    }

    fn emit_while(&mut self, node: NodeId) -> Result<(), CompileError> {
        let (guard, body) = self.pair(node)?;

        match self.static_guard(guard)? {
            Some(false) => {
                self.dead_code("while", body);
                Ok(())
            }
            Some(true) => {
                let scope = self.block_scope(body);
                self.diagnostics.report(
                    DiagnosticKind::InfiniteLoop,
                    Phase::CodeGenerator,
                    format!("while loop guarded by true never terminates, block of scope {}", scope),
                );
                let start = self.cells.len();
                self.emit_stmt(body)?;
                self.emit_back_branch(start)
            }
            None => {
                let start = self.cells.len();
                let jump = self.emit_guard(guard)?;
                let body_start = self.cells.len();
                self.emit_stmt(body)?;
                self.emit_back_branch(start)?;
                // Skips the body and the branch back.
                self.resolve_forward(jump, body_start)
            }
        }
    }

    fn dead_code(&mut self, statement: &str, body: NodeId) {
        let scope = self.block_scope(body);
        self.diagnostics.report(
            DiagnosticKind::DeadCode,
            Phase::CodeGenerator,
            format!(
                "{} statement guarded by false is dead code, block of scope {} is not generated",
                statement, scope
            ),
        );
    }

    fn block_scope(&self, block: NodeId) -> String {
        match self.value(block) {
            Ok(AstNode::Block(scope)) => scope.to_string(),
            _ => "?".to_string(),
        }
    }

    /// Record the distance from `start` to the current position.
    fn resolve_forward(&mut self, jump: JumpId, start: usize) -> Result<(), CompileError> {
        let distance = u8::try_from(self.cells.len() - start).map_err(|_| self.overflow())?;
        self.jumps.set_distance(jump, distance);
        Ok(())
    }

    /// Unconditional branch back to `target`.
    ///
    /// Register X is zero and the compared byte is the first character
    /// of `"true"`, so the zero flag is always clear.
    fn emit_back_branch(&mut self, target: usize) -> Result<(), CompileError> {
        self.emit_const(Opcode::LoadXConst, 0);
        self.emit_addr(Opcode::CompareX, TRUE_ADDRESS);
        let jump = self.jumps.add();
        self.emit_branch(jump);

        // Relative to the address after the operand, wrapping around memory.
        let span = self.cells.len() - target;
        if span >= IMAGE_SIZE {
            return Err(self.overflow());
        }
        let distance = u8::try_from((IMAGE_SIZE - span) % IMAGE_SIZE).map_err(|_| self.overflow())?;
        self.jumps.set_distance(jump, distance);
        Ok(())
    }
}

/// Expressions
impl<'a> CodeGen<'a> {
    fn static_guard(&self, guard: NodeId) -> Result<Option<bool>, CompileError> {
        match self.value(guard)? {
            AstNode::Bool(value) => Ok(Some(*value)),
            _ => Ok(None),
        }
    }

    /// Evaluate a comparison guard and branch over the guarded block
    /// when it doesn't hold.
    fn emit_guard(&mut self, guard: NodeId) -> Result<JumpId, CompileError> {
        use Opcode as O;

        match self.value(guard)? {
            AstNode::IsEqual => self.emit_compare(guard)?,
            AstNode::IsNotEqual => {
                // Materialise equality, then test it against zero so the
                // zero flag is set exactly when the operands differ.
                self.emit_compare(guard)?;
                self.materialise(true);
                let scratch = self.scratch.acquire(&mut self.variables);
                self.emit_var(O::StoreAcc, scratch);
                self.emit_const(O::LoadXConst, 0);
                self.emit_var(O::CompareX, scratch);
                self.scratch.release();
            }
            _ => return Err(CompileError::MalformedTree("guard is not a comparison")),
        }

        let jump = self.jumps.add();
        self.emit_branch(jump);
        Ok(jump)
    }

    /// Evaluate an expression into the accumulator.
    fn load_acc(&mut self, node: NodeId) -> Result<(), CompileError> {
        use Opcode as O;

        match self.value(node)? {
            AstNode::Digit(digit) => self.emit_const(O::LoadAccConst, *digit),
            AstNode::Bool(value) => self.emit_const(O::LoadAccConst, *value as u8),
            AstNode::Str(value) => {
                let address = self.heap.allocate(value)?;
                self.emit_const(O::LoadAccConst, address);
            }
            AstNode::Id { .. } => {
                let var = self.storage(node)?;
                self.emit_var(O::LoadAccMem, var);
            }
            AstNode::Add => self.emit_add(node)?,
            AstNode::IsEqual => {
                self.emit_compare(node)?;
                self.materialise(true);
            }
            AstNode::IsNotEqual => {
                self.emit_compare(node)?;
                self.materialise(false);
            }
            _ => return Err(CompileError::MalformedTree("statement in expression position")),
        }

        Ok(())
    }

    /// Sum of a digit and an integer expression into the accumulator.
    fn emit_add(&mut self, node: NodeId) -> Result<(), CompileError> {
        use Opcode as O;

        let (digit_node, rhs) = self.pair(node)?;
        let digit = match self.value(digit_node)? {
            AstNode::Digit(digit) => *digit,
            _ => return Err(CompileError::MalformedTree("addition without digit")),
        };

        if let AstNode::Id { .. } = self.value(rhs)? {
            let var = self.storage(rhs)?;
            self.emit_const(O::LoadAccConst, digit);
            self.emit_var(O::AddWithCarry, var);
        } else {
            self.load_acc(rhs)?;
            let scratch = self.scratch.acquire(&mut self.variables);
            self.emit_var(O::StoreAcc, scratch);
            self.emit_const(O::LoadAccConst, digit);
            self.emit_var(O::AddWithCarry, scratch);
            self.scratch.release();
        }

        Ok(())
    }

    /// Compare two operands, leaving the zero flag set when they are equal.
    ///
    /// The right operand goes to memory, the left one to register X.
    fn emit_compare(&mut self, node: NodeId) -> Result<(), CompileError> {
        use Opcode as O;

        let (lhs, rhs) = self.pair(node)?;

        let (rhs_var, rhs_scratch) = match self.value(rhs)? {
            AstNode::Id { .. } => (self.storage(rhs)?, false),
            _ => {
                self.load_acc(rhs)?;
                let scratch = self.scratch.acquire(&mut self.variables);
                self.emit_var(O::StoreAcc, scratch);
                (scratch, true)
            }
        };

        match self.value(lhs)? {
            AstNode::Digit(digit) => self.emit_const(O::LoadXConst, *digit),
            AstNode::Bool(value) => self.emit_const(O::LoadXConst, *value as u8),
            AstNode::Str(value) => {
                let address = self.heap.allocate(value)?;
                self.emit_const(O::LoadXConst, address);
            }
            AstNode::Id { .. } => {
                let var = self.storage(lhs)?;
                self.emit_var(O::LoadXMem, var);
            }
            _ => {
                self.load_acc(lhs)?;
                let scratch = self.scratch.acquire(&mut self.variables);
                self.emit_var(O::StoreAcc, scratch);
                self.emit_var(O::LoadXMem, scratch);
                self.scratch.release();
            }
        }

        self.emit_var(O::CompareX, rhs_var);
        if rhs_scratch {
            self.scratch.release();
        }

        Ok(())
    }

    /// Turn the zero flag into a boolean in the accumulator.
    ///
    /// With `equal` the result is 1 when the flag is set, otherwise
    /// the result is inverted.
    fn materialise(&mut self, equal: bool) {
        self.emit_const(Opcode::LoadAccConst, (!equal) as u8);
        self.emit_skip();
        self.emit_const(Opcode::LoadAccConst, equal as u8);
    }
}

#[inline]
fn bool_string(value: bool) -> u8 {
    if value {
        TRUE_ADDRESS
    } else {
        FALSE_ADDRESS
    }
}
