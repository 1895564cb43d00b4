//! Core facts about the acc8 target machine, shared by the compiler and the VM.
pub mod ascii;
mod opcode;
pub mod utils;

pub use opcode::Opcode;

pub mod prelude {
    pub use super::{Address, Opcode, IMAGE_SIZE};
}

/// Size in bytes of an executable image, and of the machine's whole memory.
pub const IMAGE_SIZE: usize = 0x100; // 256

/// Highest valid address.
pub const MAX_ADDRESS: usize = IMAGE_SIZE - 1;

/// System call tag in register X that prints register Y as a decimal number.
pub const PRINT_INT: u8 = 0x01;

/// System call tag in register X that prints the null-terminated string
/// at the address held in register Y.
pub const PRINT_STRING: u8 = 0x02;

/// Address of the last heap byte.
///
/// It is always the terminator of the topmost heap string, so pointing
/// at it yields the empty string. Used as the default string value.
pub const STRING_SENTINEL: u8 = MAX_ADDRESS as u8;

/// Type for one-byte memory addresses.
///
/// Instructions encode addresses in two little-endian bytes, but the
/// high byte is always zero in a 256 byte image.
pub type Address = u8;
