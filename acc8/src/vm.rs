//! Virtual machine.
use std::convert::TryFrom;

use acc8_core::{ascii, Opcode, IMAGE_SIZE, PRINT_INT, PRINT_STRING};
use log::{debug, trace};

use crate::{
    cpu::Acc8Cpu,
    error::{Acc8Error, Acc8Result},
};

pub struct Acc8Vm {
    cpu: Acc8Cpu,
    /// Pristine copy of the loaded image, restored on every reset.
    image: Box<[u8; IMAGE_SIZE]>,
    /// Text written by system calls.
    output: String,
    conf: Acc8Conf,
}

impl Acc8Vm {
    pub fn new(conf: Acc8Conf) -> Self {
        Acc8Vm {
            cpu: Acc8Cpu::new(),
            image: Box::new([0; IMAGE_SIZE]),
            output: String::new(),
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Acc8Conf {
        &self.conf
    }

    pub fn load_image(&mut self, image: &[u8]) -> Acc8Result<()> {
        if image.len() != IMAGE_SIZE {
            return Err(Acc8Error::ImageSize(image.len()));
        }

        self.image.copy_from_slice(image);
        self.reset();

        Ok(())
    }

    pub fn cpu(&self) -> &Acc8Cpu {
        &self.cpu
    }

    /// Everything printed since the last reset.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    Ok,
    Error,
    /// Machine executed `BRK`.
    Interrupt,
    /// Branch was taken.
    ///
    /// Lets the caller notice long running loops.
    Jump,
    /// System call wrote to the output.
    Output,
}

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Acc8Conf {
    /// Abort execution after this many instructions.
    ///
    /// Programs with an infinite loop never halt on their own.
    pub max_steps: Option<usize>,
}

/// Interpreter
impl Acc8Vm {
    /// Clear internal state in preparation for a fresh startup.
    fn reset(&mut self) {
        self.cpu.reset_registers();
        self.cpu.ram.copy_from_slice(self.image.as_slice());
        self.output.clear();
    }

    /// Run the loaded image from the start until it halts.
    ///
    /// Returns the number of executed instructions, including the
    /// final `BRK`.
    pub fn execute(&mut self) -> Acc8Result<usize> {
        self.reset();

        let mut steps = 0;
        loop {
            if let Some(limit) = self.conf.max_steps {
                if steps >= limit {
                    return Err(Acc8Error::StepLimit(limit));
                }
            }

            steps += 1;
            match self.step() {
                Flow::Error => return Err(self.runtime_error()),
                Flow::Interrupt => break,
                _ => {}
            }
        }

        debug!("halted after {} steps", steps);
        Ok(steps)
    }

    /// Execute a single instruction from the current state.
    pub fn tick(&mut self) -> Acc8Result<Flow> {
        match self.step() {
            Flow::Error => Err(self.runtime_error()),
            flow => Ok(flow),
        }
    }

    fn runtime_error(&self) -> Acc8Error {
        Acc8Error::Runtime(self.cpu.error.unwrap_or("unspecified VM error"))
    }

    fn step(&mut self) -> Flow {
        if self.cpu.trap {
            // Already halted.
            return Flow::Interrupt;
        }

        // Falling off the last byte without halting.
        if self.cpu.pc >= IMAGE_SIZE {
            self.cpu.set_error("program counter ran past the end of memory");
            return Flow::Error;
        }

        let op = match Opcode::try_from(self.cpu.ram[self.cpu.pc]) {
            Ok(op) => op,
            Err(_) => {
                self.cpu.set_error("unsupported opcode");
                return Flow::Error;
            }
        };

        let next = self.cpu.pc + op.size();
        if next > IMAGE_SIZE {
            self.cpu.set_error("instruction runs past the end of memory");
            return Flow::Error;
        }

        #[cfg(feature = "op_trace")]
        op_trace(op, &self.cpu);

        match self.exec(op) {
            Ok(Some(target)) => {
                self.cpu.pc = target;
                Flow::Jump
            }
            Ok(None) => match op {
                // Program counter stays on the halt.
                Opcode::Break => Flow::Interrupt,
                Opcode::System => {
                    self.cpu.pc = next;
                    Flow::Output
                }
                _ => {
                    self.cpu.pc = next;
                    Flow::Ok
                }
            },
            Err(message) => {
                self.cpu.set_error(message);
                Flow::Error
            }
        }
    }

    /// Apply the effect of one instruction.
    ///
    /// Returns the branch target when the program counter must jump.
    fn exec(&mut self, op: Opcode) -> Result<Option<usize>, &'static str> {
        use Opcode as O;

        let cpu = &mut self.cpu;

        match op {
            // A9 nn (LDA #nn)
            O::LoadAccConst => cpu.acc = cpu.op_nn(),
            // AD ll hh (LDA addr)
            O::LoadAccMem => cpu.acc = cpu.ram[cpu.op_addr()?],
            // 8D ll hh (STA addr)
            O::StoreAcc => {
                let address = cpu.op_addr()?;
                cpu.ram[address] = cpu.acc;
            }
            // 6D ll hh (ADC addr)
            //
            // There is no carry flag, the sum wraps.
            O::AddWithCarry => cpu.acc = cpu.acc.wrapping_add(cpu.ram[cpu.op_addr()?]),
            // A2 nn (LDX #nn)
            O::LoadXConst => cpu.x = cpu.op_nn(),
            // AE ll hh (LDX addr)
            O::LoadXMem => cpu.x = cpu.ram[cpu.op_addr()?],
            // A0 nn (LDY #nn)
            O::LoadYConst => cpu.y = cpu.op_nn(),
            // AC ll hh (LDY addr)
            O::LoadYMem => cpu.y = cpu.ram[cpu.op_addr()?],
            O::NoOp => {}
            // 00 (BRK)
            O::Break => {
                trace!("break at {:02X}", cpu.pc);
                cpu.trap = true;
            }
            // EC ll hh (CPX addr)
            O::CompareX => cpu.zero = cpu.x == cpu.ram[cpu.op_addr()?],
            // D0 dd (BNE dd)
            //
            // Distance is relative to the byte after the operand, and
            // wraps around memory to branch backwards.
            O::BranchNotEqual => {
                if !cpu.zero {
                    let target = (cpu.pc + O::BranchNotEqual.size() + cpu.op_nn() as usize) % IMAGE_SIZE;
                    return Ok(Some(target));
                }
            }
            // EE ll hh (INC addr)
            O::Increment => {
                let address = cpu.op_addr()?;
                cpu.ram[address] = cpu.ram[address].wrapping_add(1);
            }
            // FF (SYS)
            O::System => match cpu.x {
                PRINT_INT => self.output.push_str(&cpu.y.to_string()),
                PRINT_STRING => {
                    let text = ascii::decode(&cpu.ram[cpu.y as usize..]);
                    self.output.push_str(&text);
                }
                _ => return Err("invalid system call"),
            },
        }

        Ok(None)
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(op: Opcode, cpu: &Acc8Cpu) {
    match op.operand_size() {
        0 => println!("{:02X}: {:4}", cpu.pc, op),
        1 => println!("{:02X}: {:4} {:02X}", cpu.pc, op, cpu.op_nn()),
        _ => println!(
            "{:02X}: {:4} {:02X}{:02X}",
            cpu.pc,
            op,
            cpu.ram[cpu.pc + 2],
            cpu.ram[cpu.pc + 1]
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn image(code: &[u8]) -> Vec<u8> {
        let mut image = vec![0; IMAGE_SIZE];
        image[..code.len()].copy_from_slice(code);
        image
    }

    fn vm_with(code: &[u8]) -> Acc8Vm {
        let mut vm = Acc8Vm::new(Acc8Conf::default());
        vm.load_image(&image(code)).unwrap();
        vm
    }

    #[test]
    fn test_image_must_fill_memory() {
        let mut vm = Acc8Vm::new(Acc8Conf::default());
        assert!(matches!(vm.load_image(&[0x00; 10]), Err(Acc8Error::ImageSize(10))));
        assert!(vm.load_image(&[0x00; IMAGE_SIZE]).is_ok());
    }

    #[test]
    #[rustfmt::skip]
    fn test_add_wraps() {
        let mut vm = vm_with(&[
            0xA9, 0xFF,       // LDA #FF
            0x8D, 0x20, 0x00, // STA 20
            0xA9, 0x02,       // LDA #02
            0x6D, 0x20, 0x00, // ADC 20
            0x8D, 0x21, 0x00, // STA 21
            0xEE, 0x20, 0x00, // INC 20
            0x00,
        ]);
        assert_eq!(vm.execute().unwrap(), 7);
        assert_eq!(vm.cpu.acc, 0x01);
        assert_eq!(vm.cpu.ram[0x21], 0x01);
        assert_eq!(vm.cpu.ram[0x20], 0x00);
    }

    #[test]
    #[rustfmt::skip]
    fn test_compare_sets_zero_flag() {
        let mut vm = vm_with(&[
            0xA2, 0x07,       // LDX #07
            0xEC, 0x10, 0x00, // CPX 10
            0x00,
        ]);
        vm.execute().unwrap();
        assert!(!vm.cpu.zero);

        let mut vm = vm_with(&[
            0xA2, 0x00,       // LDX #00
            0xEC, 0x10, 0x00, // CPX 10
            0xA9, 0x05,       // LDA #05 does not touch Z
            0x00,
        ]);
        vm.execute().unwrap();
        assert!(vm.cpu.zero);
    }

    #[test]
    #[rustfmt::skip]
    fn test_branch_forward_and_back() {
        let mut vm = vm_with(&[
            0xA2, 0x01,       // 00: LDX #01
            0xEC, 0x10, 0x00, // 02: CPX 10      ; mem[10] is 0
            0xD0, 0x02,       // 05: BNE +2
            0xA0, 0x09,       // 07: LDY #09     ; skipped
            0x00,             // 09: BRK
        ]);
        vm.execute().unwrap();
        assert_eq!(vm.cpu.y, 0x00);
        assert_eq!(vm.cpu.pc, 0x09);

        // Count down from three by branching backwards.
        let mut vm = vm_with(&[
            0xEE, 0x20, 0x00, // 00: INC 20
            0xA2, 0x03,       // 03: LDX #03
            0xEC, 0x20, 0x00, // 05: CPX 20
            0xD0, 0xF6,       // 08: BNE -10
            0x00,             // 0A: BRK
        ]);
        vm.execute().unwrap();
        assert_eq!(vm.cpu.ram[0x20], 3);
    }

    #[test]
    #[rustfmt::skip]
    fn test_system_calls() {
        let mut code = vec![
            0xA0, 0x2A,       // LDY #2A
            0xA2, 0x01,       // LDX #01
            0xFF,             // SYS
            0xA0, 0xF0,       // LDY #F0
            0xA2, 0x02,       // LDX #02
            0xFF,             // SYS
            0x00,
        ];
        code.resize(0xF0, 0x00);
        code.extend_from_slice(b"ok\0");

        let mut vm = vm_with(&code);
        vm.execute().unwrap();
        assert_eq!(vm.output(), "42ok");
    }

    #[test]
    fn test_runtime_errors() {
        let mut vm = vm_with(&[0x42]);
        assert!(matches!(vm.execute(), Err(Acc8Error::Runtime("unsupported opcode"))));

        let mut vm = vm_with(&[0xAD, 0x00, 0x01]);
        assert!(matches!(vm.execute(), Err(Acc8Error::Runtime("address out of range"))));

        let mut vm = vm_with(&[0xA2, 0x03, 0xFF]);
        assert!(matches!(vm.execute(), Err(Acc8Error::Runtime("invalid system call"))));

        // Instruction at the last address has no room for its operand.
        let mut code = vec![0xEA; IMAGE_SIZE];
        code[IMAGE_SIZE - 1] = 0xA9;
        let mut vm = vm_with(&code);
        assert!(matches!(vm.execute(), Err(Acc8Error::Runtime(_))));
    }

    #[test]
    fn test_running_off_the_end() {
        let mut vm = vm_with(&[0xEA; IMAGE_SIZE]);
        assert!(matches!(
            vm.execute(),
            Err(Acc8Error::Runtime("program counter ran past the end of memory"))
        ));
        assert_eq!(vm.cpu.pc, IMAGE_SIZE);
    }

    #[test]
    fn test_step_limit() {
        // BNE to itself, with Z clear.
        let mut vm = Acc8Vm::new(Acc8Conf { max_steps: Some(100) });
        vm.load_image(&image(&[0xD0, 0xFE])).unwrap();
        assert!(matches!(vm.execute(), Err(Acc8Error::StepLimit(100))));
    }

    #[test]
    fn test_execute_is_repeatable() {
        let mut vm = vm_with(&[0xEE, 0x20, 0x00, 0xAC, 0x20, 0x00, 0xA2, 0x01, 0xFF, 0x00]);
        vm.execute().unwrap();
        assert_eq!(vm.output(), "1");
        vm.execute().unwrap();
        assert_eq!(vm.output(), "1");
    }

    #[test]
    fn test_halt_stays_halted() {
        let mut vm = vm_with(&[0x00]);
        assert_eq!(vm.tick().unwrap(), Flow::Interrupt);
        assert_eq!(vm.tick().unwrap(), Flow::Interrupt);
        assert_eq!(vm.cpu.pc, 0);
    }
}
