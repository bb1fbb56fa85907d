//! # chip8-console
//!
//! A CHIP-8 interpreter with a built-in ROM launcher.
//!
//! ## Design
//!
//! * the core owns all machine state: memory, registers, timers, keypad,
//!   framebuffer. nothing global
//! * the host drives everything: `cycle()` as often as it likes, `tick()` at
//!   60Hz, key events as they arrive. nothing in the core blocks or sleeps
//! * FX0A is an explicit engine state, not a PC trick
//! * faults (bad opcode, stack over/underflow, out of range memory) stop the
//!   run and come back as values; bad host input is only logged
//! * display, keyboard and audio sit behind traits so a variety of hosts
//!   would work; the bundled one is a terminal
//!
//! ## Model
//!
//! ```text
//! Environment (host loop)
//!  |-- display, input, config
//!  `-- Chip8 (mode: launcher | running)
//!       |-- catalog (borrowed), menu state
//!       `-- Chip8Interpreter
//!            |-- memory, registers, timers, keypad, framebuffer
//!            `-- observer (logs, sound on/off)
//! ```
//!
//! ## Example
//!
//! ```
//! use chip8_console::launcher::{Chip8, RomEntry};
//! use chip8_console::sound::Mute;
//!
//! // V0 = 5; V1 = 5; V0 += V1; CLS
//! let roms = vec![RomEntry::new("add.ch8", vec![0x60, 0x05, 0x61, 0x05, 0x80, 0x14, 0x00, 0xe0])];
//! let mut chip8 = Chip8::new(&roms, Mute::new());
//! chip8.menu_select().unwrap();
//! for _ in 0..4 {
//!     chip8.cycle().unwrap();
//! }
//! assert_eq!(chip8.interpreter().registers().v[0], 10);
//! assert!(chip8.frame().is_blank());
//! ```
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod launcher;
pub mod memory;
pub mod menu;
pub mod observer;
pub mod registers;
pub mod sound;
pub mod timer;

pub use error::{Fault, FaultKind, InputError, LoadError, MemoryError};
pub use interpreter::{Chip8Interpreter, ExecState};
pub use launcher::{Chip8, Mode, RomCatalog, RomEntry};
pub use observer::Observer;
