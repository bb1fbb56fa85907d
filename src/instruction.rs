//! # instruction
//!
//! Decoded CHIP-8 instructions. Opcodes are 16 bits, big-endian; the high
//! nibble picks the family and families 0, 8, E and F pick again on the low
//! nibble or low byte. Field names follow the usual notation:
//!
//! ```text
//!   NNN  12-bit address      NN  8-bit immediate     N  4-bit height
//!   X    register (bits 8-11)                         Y  register (bits 4-7)
//! ```

/// register-register arithmetic selected by the low nibble of 8XY?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

impl AluOp {
    fn from_nibble(n: u16) -> Option<AluOp> {
        Some(match n {
            0x0 => AluOp::Assign,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::ShiftRight,
            0x7 => AluOp::SubReverse,
            0xe => AluOp::ShiftLeft,
            _ => return None,
        })
    }

    fn nibble(self) -> u16 {
        match self {
            AluOp::Assign => 0x0,
            AluOp::Or => 0x1,
            AluOp::And => 0x2,
            AluOp::Xor => 0x3,
            AluOp::Add => 0x4,
            AluOp::Sub => 0x5,
            AluOp::ShiftRight => 0x6,
            AluOp::SubReverse => 0x7,
            AluOp::ShiftLeft => 0xe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN: machine code routine; ignored
    Sys(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm { x: u8, nn: u8 },
    /// 4XNN
    SkipNeImm { x: u8, nn: u8 },
    /// 5XY0
    SkipEqReg { x: u8, y: u8 },
    /// 6XNN
    LoadImm { x: u8, nn: u8 },
    /// 7XNN, no carry
    AddImm { x: u8, nn: u8 },
    /// 8XY?
    Alu { op: AluOp, x: u8, y: u8 },
    /// 9XY0
    SkipNeReg { x: u8, y: u8 },
    /// ANNN
    SetIndex(u16),
    /// BNNN: jump to NNN + V0
    JumpOffset(u16),
    /// CXNN
    Random { x: u8, mask: u8 },
    /// DXYN
    Draw { x: u8, y: u8, height: u8 },
    /// EX9E
    SkipKeyPressed { x: u8 },
    /// EXA1
    SkipKeyNotPressed { x: u8 },
    /// FX07
    LoadDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddIndex { x: u8 },
    /// FX29
    FontGlyph { x: u8 },
    /// FX33
    StoreBcd { x: u8 },
    /// FX55
    StoreRegisters { x: u8 },
    /// FX65
    LoadRegisters { x: u8 },
}

impl Instruction {
    /// decode an opcode; None for encodings that aren't assigned
    pub fn decode(opcode: u16) -> Option<Instruction> {
        let nnn = opcode & 0x0fff;
        let nn = (opcode & 0x00ff) as u8;
        let n = opcode & 0x000f;
        let x = ((opcode & 0x0f00) >> 8) as u8;
        let y = ((opcode & 0x00f0) >> 4) as u8;

        use Instruction::*;
        Some(match opcode >> 12 {
            0x0 => match opcode {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => Sys(nnn),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipEqImm { x, nn },
            0x4 => SkipNeImm { x, nn },
            0x5 if n == 0 => SkipEqReg { x, y },
            0x6 => LoadImm { x, nn },
            0x7 => AddImm { x, nn },
            0x8 => Alu {
                op: AluOp::from_nibble(n)?,
                x,
                y,
            },
            0x9 if n == 0 => SkipNeReg { x, y },
            0xa => SetIndex(nnn),
            0xb => JumpOffset(nnn),
            0xc => Random { x, mask: nn },
            0xd => Draw {
                x,
                y,
                height: n as u8,
            },
            0xe => match nn {
                0x9e => SkipKeyPressed { x },
                0xa1 => SkipKeyNotPressed { x },
                _ => return None,
            },
            0xf => match nn {
                0x07 => LoadDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => FontGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return None,
            },
            // 5XY? and 9XY? with a non-zero low nibble
            _ => return None,
        })
    }

    /// the opcode this instruction decodes from
    pub fn encode(&self) -> u16 {
        fn xnn(family: u16, x: u8, nn: u8) -> u16 {
            family << 12 | (x as u16) << 8 | nn as u16
        }
        fn xyn(family: u16, x: u8, y: u8, n: u16) -> u16 {
            family << 12 | (x as u16) << 8 | (y as u16) << 4 | n
        }

        use Instruction::*;
        match *self {
            Sys(nnn) => nnn,
            ClearScreen => 0x00e0,
            Return => 0x00ee,
            Jump(nnn) => 0x1000 | nnn,
            Call(nnn) => 0x2000 | nnn,
            SkipEqImm { x, nn } => xnn(0x3, x, nn),
            SkipNeImm { x, nn } => xnn(0x4, x, nn),
            SkipEqReg { x, y } => xyn(0x5, x, y, 0),
            LoadImm { x, nn } => xnn(0x6, x, nn),
            AddImm { x, nn } => xnn(0x7, x, nn),
            Alu { op, x, y } => xyn(0x8, x, y, op.nibble()),
            SkipNeReg { x, y } => xyn(0x9, x, y, 0),
            SetIndex(nnn) => 0xa000 | nnn,
            JumpOffset(nnn) => 0xb000 | nnn,
            Random { x, mask } => xnn(0xc, x, mask),
            Draw { x, y, height } => xyn(0xd, x, y, height as u16),
            SkipKeyPressed { x } => xnn(0xe, x, 0x9e),
            SkipKeyNotPressed { x } => xnn(0xe, x, 0xa1),
            LoadDelay { x } => xnn(0xf, x, 0x07),
            WaitKey { x } => xnn(0xf, x, 0x0a),
            SetDelay { x } => xnn(0xf, x, 0x15),
            SetSound { x } => xnn(0xf, x, 0x18),
            AddIndex { x } => xnn(0xf, x, 0x1e),
            FontGlyph { x } => xnn(0xf, x, 0x29),
            StoreBcd { x } => xnn(0xf, x, 0x33),
            StoreRegisters { x } => xnn(0xf, x, 0x55),
            LoadRegisters { x } => xnn(0xf, x, 0x65),
        }
    }
}
