//! # interpreter
//!
//! The fetch-decode-execute engine. One call to `cycle` runs exactly one
//! instruction; the host decides how many cycles go in each 60Hz `tick`.
//!
//! The engine owns all of the program-visible machine:
//!  * 4K address space, font at 0x000, program at 0x200
//!  * V0-VF, I, PC and a 16-deep return stack
//!  * delay and sound timers
//!  * the 16-key input latch
//!  * the 64x32 framebuffer
//!
//! Nothing here blocks. FX0A parks the engine in `ExecState::WaitingForKey`
//! and `cycle` is a no-op until `set_key` delivers a press.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::display::Framebuffer;
use crate::error::{Fault, FaultKind, LoadError, MemoryError};
use crate::input::{InputLatch, KEY_COUNT};
use crate::instruction::{AluOp, Instruction};
use crate::memory::{
    AddressSpace, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_RAM_SIZE_BYTES,
};
use crate::observer::Observer;
use crate::registers::Registers;
use crate::timer::Timers;

/// where the engine is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    /// fetching and executing instructions
    Executing,
    /// parked on FX0A until a key goes down; the key lands in V[register]
    WaitingForKey { register: u8 },
    /// nothing loaded, or PC ran past the end of the program
    Halted,
    /// stopped by a fault; only loading a program gets out of here
    Faulted(Fault),
}

pub struct Chip8Interpreter<O: Observer> {
    memory: AddressSpace,
    registers: Registers,
    timers: Timers,
    keys: InputLatch,
    framebuffer: Framebuffer,
    state: ExecState,
    rng: StdRng,
    observer: O,
}

impl<O: Observer> Chip8Interpreter<O> {
    pub fn new(observer: O) -> Self {
        Self::with_rng(observer, StdRng::from_entropy())
    }

    /// deterministic CXNN, for tests and replays
    pub fn with_seed(observer: O, seed: u64) -> Self {
        Self::with_rng(observer, StdRng::seed_from_u64(seed))
    }

    fn with_rng(observer: O, rng: StdRng) -> Self {
        Chip8Interpreter {
            memory: AddressSpace::new(),
            registers: Registers::new(),
            timers: Timers::new(),
            keys: InputLatch::new(),
            framebuffer: Framebuffer::new(),
            state: ExecState::Halted,
            rng,
            observer,
        }
    }

    /// load a chip8 program and get ready to run it from 0x200. an oversize
    /// program is rejected and leaves everything as it was
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.memory.load_program(program)?;
        self.registers.reset();
        self.reset_timers();
        self.keys.release_all();
        self.framebuffer.clear();
        self.state = ExecState::Executing;
        log::debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// throw away the running program and everything it touched
    pub fn reset(&mut self) {
        self.memory.clear_program();
        self.registers.reset();
        self.reset_timers();
        self.keys.release_all();
        self.framebuffer.clear();
        self.state = ExecState::Halted;
    }

    /// advance by one instruction, if there is anything to do
    pub fn cycle(&mut self) -> Result<(), Fault> {
        if self.state != ExecState::Executing {
            return Ok(());
        }

        let pc = self.registers.pc;
        if pc as usize >= self.memory.program_end() {
            log::info!("halted: PC {:#05x} is past the end of the program", pc);
            self.state = ExecState::Halted;
            return Ok(());
        }

        let opcode = self
            .memory
            .get_word(pc)
            .map_err(|e| self.fail(pc, 0, e.into()))?;
        self.registers.pc = pc.wrapping_add(2);

        let result = match Instruction::decode(opcode) {
            Some(instruction) => self.execute(instruction),
            None => Err(FaultKind::UnknownOpcode),
        };
        result.map_err(|kind| self.fail(pc, opcode, kind))
    }

    /// one 60Hz time slice for the timers
    pub fn tick(&mut self) {
        if let Some(on) = self.timers.tick() {
            self.observer.on_sound_state_changed(on);
        }
    }

    /// a key went up or down. bad indexes are reported to the observer and
    /// otherwise ignored
    pub fn set_key(&mut self, key: usize, pressed: bool) {
        let rising = match self.keys.set_key(key, pressed) {
            Ok(rising) => rising,
            Err(e) => {
                self.observer.on_log(&format!("set_key: {}", e));
                return;
            }
        };
        if let (true, ExecState::WaitingForKey { register }) = (rising, self.state) {
            self.registers.v[register as usize] = key as u8;
            self.state = ExecState::Executing;
            log::debug!("key {:#x} delivered to V{:X}", key, register);
        }
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn fault(&self) -> Option<Fault> {
        match self.state {
            ExecState::Faulted(f) => Some(f),
            _ => None,
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    fn reset_timers(&mut self) {
        if let Some(on) = self.timers.reset() {
            self.observer.on_sound_state_changed(on);
        }
    }

    fn fail(&mut self, pc: u16, opcode: u16, kind: FaultKind) -> Fault {
        let fault = Fault { pc, opcode, kind };
        log::error!("{}", fault);
        self.state = ExecState::Faulted(fault);
        fault
    }

    fn v(&self, x: u8) -> u8 {
        self.registers.v[x as usize]
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc = self.registers.pc.wrapping_add(2);
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), FaultKind> {
        use Instruction::*;
        match instruction {
            Sys(_) => {}
            ClearScreen => self.framebuffer.clear(),
            Return => self.registers.pc = self.registers.pop()?,
            Jump(nnn) => self.registers.pc = nnn,
            Call(nnn) => {
                self.registers.push(self.registers.pc)?;
                self.registers.pc = nnn;
            }
            SkipEqImm { x, nn } => self.skip_if(self.v(x) == nn),
            SkipNeImm { x, nn } => self.skip_if(self.v(x) != nn),
            SkipEqReg { x, y } => self.skip_if(self.v(x) == self.v(y)),
            SkipNeReg { x, y } => self.skip_if(self.v(x) != self.v(y)),
            LoadImm { x, nn } => self.registers.v[x as usize] = nn,
            AddImm { x, nn } => {
                self.registers.v[x as usize] = self.v(x).wrapping_add(nn);
            }
            Alu { op, x, y } => self.alu(op, x, y),
            SetIndex(nnn) => self.registers.i = nnn,
            JumpOffset(nnn) => {
                let target = nnn as usize + self.v(0) as usize;
                if target >= CHIP8_RAM_SIZE_BYTES {
                    return Err(MemoryError::OutOfRange {
                        address: target,
                        len: 2,
                    }
                    .into());
                }
                self.registers.pc = target as u16;
            }
            Random { x, mask } => {
                self.registers.v[x as usize] = self.rng.gen::<u8>() & mask;
            }
            Draw { x, y, height } => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.registers.set_flag(false);
                let sprite = self
                    .memory
                    .get_ro_slice(self.registers.i, height as usize)?;
                let collision = self.framebuffer.draw_sprite(vx, vy, sprite);
                self.registers.set_flag(collision);
            }
            SkipKeyPressed { x } => {
                let key = self.key_index(x)?;
                self.skip_if(self.keys.is_pressed(key));
            }
            SkipKeyNotPressed { x } => {
                let key = self.key_index(x)?;
                self.skip_if(!self.keys.is_pressed(key));
            }
            LoadDelay { x } => self.registers.v[x as usize] = self.timers.delay(),
            WaitKey { x } => self.state = ExecState::WaitingForKey { register: x },
            SetDelay { x } => self.timers.set_delay(self.v(x)),
            SetSound { x } => {
                if let Some(on) = self.timers.set_sound(self.v(x)) {
                    self.observer.on_sound_state_changed(on);
                }
            }
            AddIndex { x } => {
                self.registers.i = self.registers.i.wrapping_add(self.v(x) as u16) & 0x0fff;
            }
            FontGlyph { x } => {
                self.registers.i = CHIP8_FONT_ADDR + self.v(x) as u16 * CHIP8_FONT_GLYPH_BYTES;
            }
            StoreBcd { x } => {
                let v = self.v(x);
                self.memory
                    .write(&[v / 100, v / 10 % 10, v % 10], self.registers.i)?;
            }
            StoreRegisters { x } => {
                let n = x as usize + 1;
                self.memory
                    .write(&self.registers.v[..n], self.registers.i)?;
            }
            LoadRegisters { x } => {
                let n = x as usize + 1;
                let src = self.memory.get_ro_slice(self.registers.i, n)?;
                self.registers.v[..n].copy_from_slice(src);
            }
        }
        Ok(())
    }

    /// VF is written before the result, so 8FY? keeps the result
    fn alu(&mut self, op: AluOp, x: u8, y: u8) {
        let (vx, vy) = (self.v(x), self.v(y));
        let (result, flag) = match op {
            AluOp::Assign => (vy, None),
            AluOp::Or => (vx | vy, None),
            AluOp::And => (vx & vy, None),
            AluOp::Xor => (vx ^ vy, None),
            AluOp::Add => {
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(carry))
            }
            AluOp::Sub => (vx.wrapping_sub(vy), Some(vx >= vy)),
            AluOp::SubReverse => (vy.wrapping_sub(vx), Some(vy >= vx)),
            AluOp::ShiftRight => (vx >> 1, Some(vx & 0x01 != 0)),
            AluOp::ShiftLeft => (vx << 1, Some(vx & 0x80 != 0)),
        };
        if let Some(flag) = flag {
            self.registers.set_flag(flag);
        }
        self.registers.v[x as usize] = result;
    }

    fn key_index(&self, x: u8) -> Result<u8, FaultKind> {
        let key = self.v(x);
        if key as usize >= KEY_COUNT {
            return Err(FaultKind::InvalidKey(key));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::Recorder;

    fn machine(program: &[u8]) -> Chip8Interpreter<Recorder> {
        let mut m = Chip8Interpreter::with_seed(Recorder::default(), 8);
        m.load_program(program).unwrap();
        m
    }

    fn run(m: &mut Chip8Interpreter<Recorder>, cycles: usize) -> Result<(), Fault> {
        for _ in 0..cycles {
            m.cycle()?;
        }
        Ok(())
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut i = Chip8Interpreter::new(Recorder::default());
        assert_eq!(i.state(), ExecState::Halted);
        i.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(i.state(), ExecState::Executing);
        assert_eq!(i.registers().pc, 0x200);
        Ok(())
    }

    #[test]
    fn test_add_sub_clear_end_to_end() -> Result<(), Fault> {
        // V0 = 5; V1 = 5; V0 += V1; CLS
        let mut m = machine(&[0x60, 0x05, 0x61, 0x05, 0x80, 0x14, 0x00, 0xe0]);
        m.framebuffer_mut().set(5, 5, true);
        run(&mut m, 4)?;
        assert_eq!(m.registers().v[0], 10);
        assert_eq!(m.registers().flag(), 0);
        assert!(m.framebuffer().is_blank());
        assert_eq!(m.state(), ExecState::Executing);
        m.cycle()?;
        assert_eq!(m.state(), ExecState::Halted);
        Ok(())
    }

    #[test]
    fn test_halted_cycles_are_noops() -> Result<(), Fault> {
        let mut m = machine(&[0x60, 0x01]);
        run(&mut m, 10)?;
        assert_eq!(m.state(), ExecState::Halted);
        assert_eq!(m.registers().pc, 0x202);
        Ok(())
    }

    #[test]
    fn test_add_with_carry_all_pairs() {
        let mut m = machine(&[]);
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                m.registers.v[1] = a;
                m.registers.v[2] = b;
                m.alu(AluOp::Add, 1, 2);
                let sum = a as u16 + b as u16;
                assert_eq!(m.registers.v[1] as u16, sum % 256);
                assert_eq!(m.registers.flag(), (sum > 255) as u8);
            }
        }
    }

    #[test]
    fn test_sub_with_borrow_all_pairs() {
        let mut m = machine(&[]);
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                m.registers.v[1] = a;
                m.registers.v[2] = b;
                m.alu(AluOp::Sub, 1, 2);
                assert_eq!(m.registers.v[1], a.wrapping_sub(b));
                assert_eq!(m.registers.flag(), (a >= b) as u8);

                m.registers.v[1] = a;
                m.alu(AluOp::SubReverse, 1, 2);
                assert_eq!(m.registers.v[1], b.wrapping_sub(a));
                assert_eq!(m.registers.flag(), (b >= a) as u8);
            }
        }
    }

    #[test]
    fn test_shifts_only_use_vx() {
        let mut m = machine(&[]);
        m.registers.v[3] = 0b1000_0001;
        m.registers.v[4] = 0xff;
        m.alu(AluOp::ShiftRight, 3, 4);
        assert_eq!(m.registers.v[3], 0b0100_0000);
        assert_eq!(m.registers.flag(), 1);
        m.alu(AluOp::ShiftRight, 3, 4);
        assert_eq!(m.registers.flag(), 0);

        m.registers.v[3] = 0b1000_0001;
        m.alu(AluOp::ShiftLeft, 3, 4);
        assert_eq!(m.registers.v[3], 0b0000_0010);
        assert_eq!(m.registers.flag(), 1);
        m.alu(AluOp::ShiftLeft, 3, 4);
        assert_eq!(m.registers.flag(), 0);
    }

    #[test]
    fn test_flag_register_as_destination_keeps_result() {
        let mut m = machine(&[]);
        m.registers.v[0xf] = 200;
        m.registers.v[1] = 100;
        m.alu(AluOp::Add, 0xf, 1);
        assert_eq!(m.registers.v[0xf], 44);
    }

    #[test]
    fn test_bitwise_ops() {
        let mut m = machine(&[]);
        m.registers.v[1] = 0b1100;
        m.registers.v[2] = 0b1010;
        m.registers.v[0xf] = 7;
        m.alu(AluOp::Or, 1, 2);
        assert_eq!(m.registers.v[1], 0b1110);
        m.registers.v[1] = 0b1100;
        m.alu(AluOp::And, 1, 2);
        assert_eq!(m.registers.v[1], 0b1000);
        m.registers.v[1] = 0b1100;
        m.alu(AluOp::Xor, 1, 2);
        assert_eq!(m.registers.v[1], 0b0110);
        m.alu(AluOp::Assign, 1, 2);
        assert_eq!(m.registers.v[1], 0b1010);
        // logic ops leave VF alone
        assert_eq!(m.registers.v[0xf], 7);
    }

    #[test]
    fn test_skips() -> Result<(), Fault> {
        // V0 = 3; V1 = 3; skip if V0 == 3; (skipped); skip if V0 != V1; V2 = 1
        let mut m = machine(&[
            0x60, 0x03, 0x61, 0x03, 0x30, 0x03, 0x62, 0xff, 0x90, 0x10, 0x62, 0x01, 0x50, 0x10,
            0x63, 0xff, 0x40, 0x03, 0x64, 0x01,
        ]);
        run(&mut m, 8)?;
        assert_eq!(m.registers().v[2], 1);
        assert_eq!(m.registers().v[3], 0);
        assert_eq!(m.registers().v[4], 1);
        assert_eq!(m.registers().pc, 0x214);
        Ok(())
    }

    #[test]
    fn test_skip_with_nonzero_low_nibble_faults() {
        let mut m = machine(&[0x50, 0x11]);
        let f = m.cycle().unwrap_err();
        assert_eq!(f.kind, FaultKind::UnknownOpcode);
        assert_eq!(f.opcode, 0x5011);
        assert_eq!(f.pc, 0x200);
        assert_eq!(m.fault(), Some(f));
        // later cycles don't do anything
        assert_eq!(m.cycle(), Ok(()));
        assert_eq!(m.registers().pc, 0x202);
    }

    #[test]
    fn test_draw_wraps_at_right_edge() -> Result<(), Fault> {
        // I = 0x206; V0 = 63; draw 1 row at (V0, V1); data: 0xff
        let mut m = machine(&[0xa2, 0x06, 0x60, 0x3f, 0xd0, 0x11, 0xff]);
        run(&mut m, 3)?;
        let fb = m.framebuffer();
        assert!(fb.get(63, 0));
        for x in 0..7 {
            assert!(fb.get(x, 0));
        }
        assert_eq!(fb.lit_count(), 8);
        assert_eq!(m.registers().flag(), 0);
        Ok(())
    }

    #[test]
    fn test_draw_twice_collides() -> Result<(), Fault> {
        // I = font 0 glyph; draw it twice at (V0, V0)
        let mut m = machine(&[0xa0, 0x00, 0xd0, 0x05, 0xd0, 0x05]);
        run(&mut m, 2)?;
        assert_eq!(m.registers().flag(), 0);
        assert!(!m.framebuffer().is_blank());
        m.cycle()?;
        assert_eq!(m.registers().flag(), 1);
        assert!(m.framebuffer().is_blank());
        Ok(())
    }

    #[test]
    fn test_collision_flag_sticks_within_draw() -> Result<(), Fault> {
        // two rows: first erases a lit pixel, second lights a fresh one
        let mut m = machine(&[0xa2, 0x04, 0xd0, 0x02, 0x80, 0x40]);
        m.framebuffer_mut().set(0, 0, true);
        m.registers.v[0xf] = 1;
        run(&mut m, 2)?;
        assert_eq!(m.registers().flag(), 1);
        assert!(!m.framebuffer().get(0, 0));
        assert!(m.framebuffer().get(1, 1));
        Ok(())
    }

    #[test]
    fn test_draw_out_of_memory_faults() {
        // I = 0xffe; draw 4 rows
        let mut m = machine(&[0xaf, 0xfe, 0xd0, 0x04]);
        m.cycle().unwrap();
        let f = m.cycle().unwrap_err();
        assert_eq!(
            f.kind,
            FaultKind::Memory(MemoryError::OutOfRange {
                address: 0xffe,
                len: 4
            })
        );
        assert!(m.framebuffer().is_blank());
    }

    #[test]
    fn test_bcd_of_255() -> Result<(), Box<dyn std::error::Error>> {
        // V5 = 255; I = 0x300; BCD V5
        let mut m = machine(&[0x65, 0xff, 0xa3, 0x00, 0xf5, 0x33]);
        run(&mut m, 3)?;
        assert_eq!(m.memory().get_ro_slice(0x300, 3)?, &[2, 5, 5]);
        Ok(())
    }

    #[test]
    fn test_bcd_past_end_faults() {
        let mut m = machine(&[0xaf, 0xfe, 0xf0, 0x33]);
        m.cycle().unwrap();
        assert!(matches!(
            m.cycle(),
            Err(Fault {
                kind: FaultKind::Memory(_),
                ..
            })
        ));
    }

    #[test]
    fn test_store_and_load_registers() -> Result<(), Box<dyn std::error::Error>> {
        // V0..V2 = 1,2,3; I = 0x400; store V0..V2; V0..V2 = 0; load V0..V1
        let mut m = machine(&[
            0x60, 0x01, 0x61, 0x02, 0x62, 0x03, 0xa4, 0x00, 0xf2, 0x55, 0x60, 0x00, 0x61, 0x00,
            0x62, 0x00, 0xf1, 0x65,
        ]);
        run(&mut m, 9)?;
        assert_eq!(m.memory().get_ro_slice(0x400, 4)?, &[1, 2, 3, 0]);
        assert_eq!(&m.registers().v[..3], &[1, 2, 0]);
        assert_eq!(m.registers().i, 0x400);
        Ok(())
    }

    #[test]
    fn test_bulk_transfer_bounds_checked() {
        // I = 0xff8; store V0..VF
        let mut m = machine(&[0xaf, 0xf8, 0xff, 0x55]);
        m.cycle().unwrap();
        let f = m.cycle().unwrap_err();
        assert_eq!(
            f.kind,
            FaultKind::Memory(MemoryError::OutOfRange {
                address: 0xff8,
                len: 16
            })
        );
        // I = 0xff8; load V0..VF
        let mut m = machine(&[0xaf, 0xf8, 0xff, 0x65]);
        m.cycle().unwrap();
        assert!(m.cycle().is_err());
    }

    #[test]
    fn test_call_and_return() -> Result<(), Fault> {
        // call 0x206; V1 = 1 (after return); halt; sub: V0 = 9; ret
        let mut m = machine(&[0x22, 0x06, 0x61, 0x01, 0x12, 0x0a, 0x60, 0x09, 0x00, 0xee]);
        m.cycle()?;
        assert_eq!(m.registers().pc, 0x206);
        assert_eq!(m.registers().stack_depth(), 1);
        run(&mut m, 3)?;
        assert_eq!(m.registers().v[0], 9);
        assert_eq!(m.registers().v[1], 1);
        assert_eq!(m.registers().stack_depth(), 0);
        Ok(())
    }

    #[test]
    fn test_17th_call_overflows() {
        // call 0x200 forever
        let mut m = machine(&[0x22, 0x00]);
        run(&mut m, 16).unwrap();
        assert_eq!(m.registers().stack_depth(), 16);
        let f = m.cycle().unwrap_err();
        assert_eq!(f.kind, FaultKind::StackOverflow);
        assert_eq!(m.state(), ExecState::Faulted(f));
    }

    #[test]
    fn test_return_on_empty_stack_underflows() {
        let mut m = machine(&[0x00, 0xee]);
        assert_eq!(
            m.cycle(),
            Err(Fault {
                pc: 0x200,
                opcode: 0x00ee,
                kind: FaultKind::StackUnderflow
            })
        );
    }

    #[test]
    fn test_jump_offset() -> Result<(), Fault> {
        // V0 = 4; jump 0x202 + V0, over V1 = 1
        let mut m = machine(&[0x60, 0x04, 0xb2, 0x02, 0x61, 0x01, 0x62, 0x02]);
        run(&mut m, 3)?;
        assert_eq!(m.registers().v[1], 0);
        assert_eq!(m.registers().v[2], 2);
        Ok(())
    }

    #[test]
    fn test_jump_offset_out_of_range_faults() {
        // V0 = 0xff; jump 0xfff + V0
        let mut m = machine(&[0x60, 0xff, 0xbf, 0xff]);
        m.cycle().unwrap();
        assert_eq!(
            m.cycle().unwrap_err().kind,
            FaultKind::Memory(MemoryError::OutOfRange {
                address: 0x10fe,
                len: 2
            })
        );
    }

    #[test]
    fn test_random_respects_mask() {
        let mut m = machine(&[]);
        for _ in 0..200 {
            m.execute(Instruction::Random { x: 2, mask: 0x0f }).unwrap();
            assert!(m.registers.v[2] <= 0x0f);
            m.execute(Instruction::Random { x: 3, mask: 0x00 }).unwrap();
            assert_eq!(m.registers.v[3], 0);
        }
    }

    #[test]
    fn test_index_ops() {
        let mut m = machine(&[]);
        m.registers.i = 0x0ffe;
        m.registers.v[1] = 4;
        m.execute(Instruction::AddIndex { x: 1 }).unwrap();
        assert_eq!(m.registers.i, 0x0002);
        m.registers.v[2] = 0xa;
        m.execute(Instruction::FontGlyph { x: 2 }).unwrap();
        assert_eq!(m.registers.i, 50);
        assert_eq!(m.memory.read_byte(50), Ok(0xf0));
    }

    #[test]
    fn test_add_immediate_wraps_without_flag() {
        let mut m = machine(&[]);
        m.registers.v[1] = 0xff;
        m.execute(Instruction::AddImm { x: 1, nn: 2 }).unwrap();
        assert_eq!(m.registers.v[1], 1);
        assert_eq!(m.registers.flag(), 0);
    }

    #[test]
    fn test_key_wait_suspends_until_press() -> Result<(), Fault> {
        // wait for key into V3; V4 = 1; V5 = 1
        let mut m = machine(&[0xf3, 0x0a, 0x64, 0x01, 0x65, 0x01]);
        m.cycle()?;
        assert_eq!(m.state(), ExecState::WaitingForKey { register: 3 });
        run(&mut m, 20)?;
        assert_eq!(m.registers().pc, 0x202);
        assert_eq!(m.registers().v[4], 0);

        // a release isn't a press
        m.set_key(7, false);
        assert_eq!(m.state(), ExecState::WaitingForKey { register: 3 });

        m.set_key(7, true);
        assert_eq!(m.state(), ExecState::Executing);
        assert_eq!(m.registers().v[3], 7);
        m.cycle()?;
        assert_eq!(m.registers().v[4], 1);
        assert_eq!(m.registers().v[5], 0);
        assert_eq!(m.registers().pc, 0x204);
        Ok(())
    }

    #[test]
    fn test_key_held_before_wait_needs_fresh_press() -> Result<(), Fault> {
        let mut m = machine(&[0xf0, 0x0a]);
        m.set_key(2, true);
        m.cycle()?;
        m.set_key(2, true);
        assert_eq!(m.state(), ExecState::WaitingForKey { register: 0 });
        m.set_key(2, false);
        m.set_key(2, true);
        assert_eq!(m.state(), ExecState::Executing);
        assert_eq!(m.registers().v[0], 2);
        Ok(())
    }

    #[test]
    fn test_key_skips() -> Result<(), Fault> {
        // V0 = 5; skip if key V0 down; V1 = 1; skip if key V0 up; V2 = 1
        let program = [0x60, 0x05, 0xe0, 0x9e, 0x61, 0x01, 0xe0, 0xa1, 0x62, 0x01];
        let mut m = machine(&program);
        m.set_key(5, true);
        run(&mut m, 4)?;
        assert_eq!(m.registers().v[1], 0);
        assert_eq!(m.registers().v[2], 1);

        let mut m = machine(&program);
        run(&mut m, 5)?;
        assert_eq!(m.registers().v[1], 1);
        assert_eq!(m.registers().v[2], 0);
        Ok(())
    }

    #[test]
    fn test_key_skip_with_bad_index_faults() {
        let mut m = machine(&[0x60, 0x10, 0xe0, 0x9e]);
        m.cycle().unwrap();
        assert_eq!(m.cycle().unwrap_err().kind, FaultKind::InvalidKey(0x10));
    }

    #[test]
    fn test_invalid_key_is_logged_not_fatal() {
        let mut m = machine(&[0xf0, 0x0a]);
        m.cycle().unwrap();
        m.set_key(16, true);
        assert_eq!(m.state(), ExecState::WaitingForKey { register: 0 });
        assert_eq!(m.observer().logs, vec!["set_key: invalid key index 16"]);
    }

    #[test]
    fn test_timers_and_sound_edges() -> Result<(), Fault> {
        // V0 = 2; delay = V0; sound = V0; V1 = delay
        let mut m = machine(&[0x60, 0x02, 0xf0, 0x15, 0xf0, 0x18, 0xf1, 0x07]);
        run(&mut m, 3)?;
        assert_eq!(m.observer().sound, vec![true]);
        m.tick();
        m.cycle()?;
        assert_eq!(m.registers().v[1], 1);
        m.tick();
        assert_eq!(m.observer().sound, vec![true, false]);
        m.tick();
        assert_eq!(m.observer().sound, vec![true, false]);
        assert_eq!(m.timers().delay(), 0);
        Ok(())
    }

    #[test]
    fn test_unknown_opcode_faults() {
        let mut m = machine(&[0xf0, 0xff]);
        assert_eq!(
            m.cycle(),
            Err(Fault {
                pc: 0x200,
                opcode: 0xf0ff,
                kind: FaultKind::UnknownOpcode
            })
        );
    }

    #[test]
    fn test_sys_is_ignored() -> Result<(), Fault> {
        let mut m = machine(&[0x01, 0x23, 0x60, 0x01]);
        run(&mut m, 2)?;
        assert_eq!(m.registers().v[0], 1);
        Ok(())
    }

    #[test]
    fn test_load_resets_state() -> Result<(), Box<dyn std::error::Error>> {
        let mut m = machine(&[0x60, 0x09, 0xf0, 0x18, 0x22, 0x00]);
        run(&mut m, 3)?;
        m.framebuffer_mut().set(1, 1, true);
        m.load_program(&[0x00, 0xe0])?;
        assert_eq!(m.registers(), &Registers::new());
        assert_eq!(m.timers().sound(), 0);
        assert_eq!(m.observer().sound, vec![true, false]);
        assert!(m.framebuffer().is_blank());
        assert_eq!(m.memory().read_byte(0), Ok(0xf0));
        Ok(())
    }

    #[test]
    fn test_oversize_load_leaves_machine_alone() {
        let mut m = machine(&[0x60, 0x01]);
        m.cycle().unwrap();
        let before = m.registers().clone();
        assert!(m.load_program(&vec![0u8; 0xe01]).is_err());
        assert_eq!(m.registers(), &before);
        assert_eq!(m.state(), ExecState::Executing);
    }

    #[test]
    fn test_reset_halts() {
        let mut m = machine(&[0x60, 0x01, 0x12, 0x00]);
        m.cycle().unwrap();
        m.reset();
        assert_eq!(m.state(), ExecState::Halted);
        assert_eq!(m.registers().v[0], 0);
        assert_eq!(m.cycle(), Ok(()));
        assert_eq!(m.registers().pc, 0x200);
    }
}
