//! Convenience helpers for extracting operands from encoded instructions.

/// Extract the one byte operand following the opcode at the cursor.
#[inline(always)]
pub fn op_nn(bytecode: &[u8], cursor: usize) -> u8 {
    bytecode[cursor + 1]
}

/// Extract the little-endian address operand following the opcode at the cursor.
#[inline(always)]
pub fn op_addr(bytecode: &[u8], cursor: usize) -> u16 {
    bytecode[cursor + 1] as u16 | ((bytecode[cursor + 2] as u16) << 8)
}
