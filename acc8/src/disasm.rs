//! Disassembler.
use std::{
    convert::TryFrom,
    fmt::{self, Write as FmtWrite},
};

use acc8_core::{
    utils::{op_addr, op_nn},
    Opcode, IMAGE_SIZE,
};

/// Lists the instructions of an image, from address zero up to and
/// including the first `BRK`.
///
/// Everything after the halt is data: variables and the string heap.
pub struct Disassembler<'a> {
    bytecode: &'a [u8],
    cursor: usize,
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self {
            bytecode,
            cursor: 0,
        }
    }

    /// Write every instruction to the given writer, one per line.
    pub fn disassemble<W: FmtWrite>(&mut self, w: &mut W) -> fmt::Result {
        self.cursor = 0;

        while self.cursor < self.bytecode.len() {
            match self.instruction() {
                Some(Opcode::Break) => {
                    self.dis_simple(w, Opcode::Break)?;
                    break;
                }
                Some(op) => {
                    self.dis_instruction(w, op)?;
                    self.cursor += op.size();
                }
                None => {
                    self.dis_data(w)?;
                    self.cursor += 1;
                }
            }
        }

        Ok(())
    }

    /// Decoded instruction under the cursor.
    ///
    /// Bytes that are not an opcode, or an opcode whose operand is cut
    /// off by the end of the bytecode, decode to `None`.
    fn instruction(&self) -> Option<Opcode> {
        let op = Opcode::try_from(self.bytecode[self.cursor]).ok()?;
        if self.cursor + op.size() <= self.bytecode.len() {
            Some(op)
        } else {
            None
        }
    }

    fn dis_instruction<W: FmtWrite>(&self, w: &mut W, op: Opcode) -> fmt::Result {
        use Opcode as O;

        match op {
            O::NoOp | O::Break | O::System => self.dis_simple(w, op),
            O::BranchNotEqual => self.dis_branch(w),
            O::LoadAccConst | O::LoadXConst | O::LoadYConst => self.dis_nn(w, op),
            _ => self.dis_addr(w, op),
        }
    }

    fn dis_simple<W: FmtWrite>(&self, w: &mut W, op: Opcode) -> fmt::Result {
        writeln!(w, "{:02X}: {:02X}        {}", self.cursor, op.byte(), op)
    }

    fn dis_nn<W: FmtWrite>(&self, w: &mut W, op: Opcode) -> fmt::Result {
        let nn = op_nn(self.bytecode, self.cursor);
        writeln!(w, "{:02X}: {:02X} {:02X}     {} #${:02X}", self.cursor, op.byte(), nn, op, nn)
    }

    fn dis_addr<W: FmtWrite>(&self, w: &mut W, op: Opcode) -> fmt::Result {
        let addr = op_addr(self.bytecode, self.cursor);
        writeln!(
            w,
            "{:02X}: {:02X} {:02X} {:02X}  {} ${:02X}",
            self.cursor,
            op.byte(),
            addr & 0xFF,
            addr >> 8,
            op,
            addr
        )
    }

    /// Branches also show the address they land on.
    fn dis_branch<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        let dd = op_nn(self.bytecode, self.cursor);
        let target = (self.cursor + Opcode::BranchNotEqual.size() + dd as usize) % IMAGE_SIZE;
        writeln!(
            w,
            "{:02X}: {:02X} {:02X}     {} ${:02X} ; -> {:02X}",
            self.cursor,
            Opcode::BranchNotEqual.byte(),
            dd,
            Opcode::BranchNotEqual,
            dd,
            target
        )
    }

    fn dis_data<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        let byte = self.bytecode[self.cursor];
        writeln!(w, "{:02X}: {:02X}        DB ${:02X}", self.cursor, byte, byte)
    }
}
