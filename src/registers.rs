use crate::error::FaultKind;
use crate::memory::CHIP8_PROGRAM_ADDR;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// VF doubles as the carry / borrow / collision flag
pub const FLAG: usize = 0xf;

/// the program-visible CPU state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    /// back to power-on: everything zero, PC at the program start
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG] = flag as u8;
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG]
    }

    /// push a return address
    pub fn push(&mut self, addr: u16) -> Result<(), FaultKind> {
        if self.sp >= STACK_DEPTH {
            return Err(FaultKind::StackOverflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    /// pop a return address
    pub fn pop(&mut self) -> Result<u16, FaultKind> {
        if self.sp == 0 {
            return Err(FaultKind::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// how many return addresses are on the stack
    pub fn stack_depth(&self) -> usize {
        self.sp
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
