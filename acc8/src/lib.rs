//! Virtual machine for 256 byte acc8 images.
mod cpu;
mod disasm;
mod error;
mod vm;

pub use self::vm::Flow;

pub mod prelude {
    pub use super::{
        cpu::Acc8Cpu,
        disasm::Disassembler,
        error::{Acc8Error, Acc8Result},
        vm::{Acc8Conf, Acc8Vm, Flow},
    };
}
