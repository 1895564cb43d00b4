//! CPU and memory state.
use acc8_core::{
    utils::{op_addr, op_nn},
    MAX_ADDRESS, IMAGE_SIZE,
};

/// Core state for an acc8 interpreter.
pub struct Acc8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter pointing to the current instruction.
    pub(crate) pc: usize,
    /// Accumulator, the only register arithmetic happens in.
    pub(crate) acc: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    /// Set by `CPX` when register X equals the compared byte.
    ///
    /// No other instruction touches it.
    pub(crate) zero: bool,

    // ------------------------------------------------------------------------
    // Memory
    /// Code, variables and heap share the one address space.
    pub(crate) ram: Box<[u8; IMAGE_SIZE]>,

    // ------------------------------------------------------------------------
    // Control
    /// Set by `BRK` to stop the VM loop.
    pub(crate) trap: bool,
    /// Error message if the VM is in an error state.
    pub(crate) error: Option<&'static str>,
}

impl Default for Acc8Cpu {
    fn default() -> Self {
        Self {
            pc: 0,
            acc: 0,
            x: 0,
            y: 0,
            zero: false,
            ram: Box::new([0; IMAGE_SIZE]),
            trap: false,
            error: None,
        }
    }
}

impl Acc8Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear registers and flags, leaving memory untouched.
    pub(crate) fn reset_registers(&mut self) {
        self.pc = 0;
        self.acc = 0;
        self.x = 0;
        self.y = 0;
        self.zero = false;
        self.trap = false;
        self.error = None;
    }

    #[inline(always)]
    pub(crate) fn set_error(&mut self, message: &'static str) {
        self.error = Some(message);
    }

    #[inline(always)]
    pub fn pc(&self) -> usize {
        self.pc
    }

    #[inline(always)]
    pub fn acc(&self) -> u8 {
        self.acc
    }

    #[inline(always)]
    pub fn x(&self) -> u8 {
        self.x
    }

    #[inline(always)]
    pub fn y(&self) -> u8 {
        self.y
    }

    #[inline(always)]
    pub fn zero(&self) -> bool {
        self.zero
    }

    #[inline]
    pub fn memory(&self) -> &[u8] {
        self.ram.as_slice()
    }

    /// Constant operand of the current instruction.
    #[inline(always)]
    pub(crate) fn op_nn(&self) -> u8 {
        op_nn(self.ram.as_slice(), self.pc)
    }

    /// Address operand of the current instruction.
    ///
    /// Fails when the high byte is set, as it points outside memory.
    #[inline(always)]
    pub(crate) fn op_addr(&self) -> Result<usize, &'static str> {
        let address = op_addr(self.ram.as_slice(), self.pc) as usize;
        if address > MAX_ADDRESS {
            Err("address out of range")
        } else {
            Ok(address)
        }
    }
}
