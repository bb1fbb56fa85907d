use crate::error::{LoadError, MemoryError};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

type Result<T> = std::result::Result<T, MemoryError>;

/// Represents the memory map: anything the interpreter can read or write by
/// address. Every access is bounds-checked; out of range is an error, never a
/// panic.
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn read_byte(&self, addr: u16) -> Result<u8> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit font lives; glyph n is at n * 5
pub const CHIP8_FONT_ADDR: u16 = 0x0000;

/// bytes per hex digit glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// The CHIP-8 address space:
///   0x0000-0x004f  hex digit font
///   0x0050-0x01ff  unused (interpreter on real hardware)
///   0x0200-0x0fff  program
pub struct AddressSpace {
    bytes: Box<[u8]>,
    program_end: usize,
}

impl MemoryMap for AddressSpace {
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let a = addr as usize;
        self.bytes.get(a..a + len).ok_or(MemoryError::OutOfRange {
            address: a,
            len,
        })
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let a = addr as usize;
        self.bytes.get_mut(a..a + len).ok_or(MemoryError::OutOfRange {
            address: a,
            len,
        })
    }
}

impl AddressSpace {
    /// initialises memory with the font baked in and no program
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        AddressSpace {
            bytes,
            program_end: CHIP8_PROGRAM_ADDR as usize,
        }
    }

    /// largest ROM that fits above the program address
    pub const fn max_program_size() -> usize {
        CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize
    }

    /// load a CHIP-8 program at 0x200. the program area is zeroed first; the
    /// font is left alone. oversize programs are rejected without touching
    /// memory
    pub fn load_program(&mut self, program: &[u8]) -> std::result::Result<(), LoadError> {
        let max = Self::max_program_size();
        if program.len() > max {
            return Err(LoadError::RomTooLarge {
                size: program.len(),
                max,
            });
        }
        let start = CHIP8_PROGRAM_ADDR as usize;
        self.bytes[start..].fill(0);
        self.bytes[start..start + program.len()].copy_from_slice(program);
        self.program_end = start + program.len();
        Ok(())
    }

    /// forget the loaded program and zero the program area
    pub fn clear_program(&mut self) {
        let start = CHIP8_PROGRAM_ADDR as usize;
        self.bytes[start..].fill(0);
        self.program_end = start;
    }

    /// one past the last byte of the loaded program
    pub fn program_end(&self) -> usize {
        self.program_end
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
