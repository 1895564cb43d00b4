//! Instruction set.
use std::{convert::TryFrom, fmt};

/// Every instruction understood by the machine.
///
/// The discriminant is the encoded byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// `A9 nn` Load the accumulator with a constant.
    LoadAccConst = 0xA9,
    /// `AD ll hh` Load the accumulator from memory.
    LoadAccMem = 0xAD,
    /// `8D ll hh` Store the accumulator in memory.
    StoreAcc = 0x8D,
    /// `6D ll hh` Add memory to the accumulator.
    AddWithCarry = 0x6D,
    /// `A2 nn` Load register X with a constant.
    LoadXConst = 0xA2,
    /// `AE ll hh` Load register X from memory.
    LoadXMem = 0xAE,
    /// `A0 nn` Load register Y with a constant.
    LoadYConst = 0xA0,
    /// `AC ll hh` Load register Y from memory.
    LoadYMem = 0xAC,
    NoOp = 0xEA,
    /// `00` Halt.
    Break = 0x00,
    /// `EC ll hh` Compare memory with register X, setting the zero flag when equal.
    CompareX = 0xEC,
    /// `D0 dd` Branch forward `dd` bytes when the zero flag is clear.
    ///
    /// The distance wraps around the end of memory, which is how
    /// backward branches are encoded.
    BranchNotEqual = 0xD0,
    /// `EE ll hh` Increment a byte in memory.
    Increment = 0xEE,
    /// `FF` System call, selected by register X.
    System = 0xFF,
}

impl Opcode {
    /// Encoded byte.
    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_size(self) -> usize {
        use Opcode as O;
        match self {
            O::NoOp | O::Break | O::System => 0,
            O::LoadAccConst | O::LoadXConst | O::LoadYConst | O::BranchNotEqual => 1,
            O::LoadAccMem | O::StoreAcc | O::AddWithCarry | O::LoadXMem | O::LoadYMem | O::CompareX | O::Increment => 2,
        }
    }

    /// Total encoded size of the instruction.
    #[inline]
    pub fn size(self) -> usize {
        1 + self.operand_size()
    }

    #[rustfmt::skip]
    pub fn mnemonic(self) -> &'static str {
        use Opcode as O;
        match self {
            O::LoadAccConst | O::LoadAccMem => "LDA",
            O::StoreAcc                     => "STA",
            O::AddWithCarry                 => "ADC",
            O::LoadXConst | O::LoadXMem     => "LDX",
            O::LoadYConst | O::LoadYMem     => "LDY",
            O::NoOp                         => "NOP",
            O::Break                        => "BRK",
            O::CompareX                     => "CPX",
            O::BranchNotEqual               => "BNE",
            O::Increment                    => "INC",
            O::System                       => "SYS",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    #[rustfmt::skip]
    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        use Opcode as O;
        match byte {
            0xA9 => Ok(O::LoadAccConst),
            0xAD => Ok(O::LoadAccMem),
            0x8D => Ok(O::StoreAcc),
            0x6D => Ok(O::AddWithCarry),
            0xA2 => Ok(O::LoadXConst),
            0xAE => Ok(O::LoadXMem),
            0xA0 => Ok(O::LoadYConst),
            0xAC => Ok(O::LoadYMem),
            0xEA => Ok(O::NoOp),
            0x00 => Ok(O::Break),
            0xEC => Ok(O::CompareX),
            0xD0 => Ok(O::BranchNotEqual),
            0xEE => Ok(O::Increment),
            0xFF => Ok(O::System),
            _    => Err(byte),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_opcode_byte_roundtrip() {
        for byte in 0..=u8::MAX {
            if let Ok(opcode) = Opcode::try_from(byte) {
                assert_eq!(opcode.byte(), byte);
            }
        }
    }

    #[test]
    fn test_instruction_sizes() {
        assert_eq!(Opcode::LoadAccConst.size(), 2);
        assert_eq!(Opcode::StoreAcc.size(), 3);
        assert_eq!(Opcode::BranchNotEqual.size(), 2);
        assert_eq!(Opcode::System.size(), 1);
    }
}
