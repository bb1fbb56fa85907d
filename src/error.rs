use thiserror::Error;

/// failure to touch the address space
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("access of {len} byte(s) at {address:#05x} is outside the address space")]
    OutOfRange { address: usize, len: usize },
}

/// what went wrong while executing an instruction. every one of these stops
/// the current run
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    #[error("unknown opcode")]
    UnknownOpcode,
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("key index {0} is out of range")]
    InvalidKey(u8),
}

/// a runtime fault, tagged with the instruction that raised it
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("fault at {pc:#05x} executing {opcode:#06x}: {kind}")]
pub struct Fault {
    pub pc: u16,
    pub opcode: u16,
    pub kind: FaultKind,
}

/// rejected before anything runs; nothing is mutated
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("ROM is {size} bytes but only {max} bytes are available")]
    RomTooLarge { size: usize, max: usize },
    #[error("the ROM catalog is empty")]
    EmptyCatalog,
}

/// bad input from the host; logged and discarded
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid key index {0}")]
    InvalidKey(usize),
}
