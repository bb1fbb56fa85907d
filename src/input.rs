use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::error::InputError;

pub const KEY_COUNT: usize = 16;

/// the state of the 16-key hex keypad, as last reported by the host
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputLatch {
    keys: [bool; KEY_COUNT],
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// record a key event. returns true when the key went from released to
    /// pressed
    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<bool, InputError> {
        let slot = self.keys.get_mut(key).ok_or(InputError::InvalidKey(key))?;
        let rising = pressed && !*slot;
        *slot = pressed;
        Ok(rising)
    }

    /// unknown keys read as not pressed; callers validate the index first
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

/// the 4x4 keypad laid over the left-hand side of a qwerty keyboard:
/// 1234 / qwer / asdf / zxcv
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// what the host saw since the last poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Key { index: usize, pressed: bool },
    Up,
    Down,
    Enter,
    Escape,
    Quit,
}

/// reads keypresses
pub trait Input {
    /// drain everything that happened since the last call
    fn poll(&mut self) -> Result<Vec<HostEvent>, io::Error>;
}

/// simple implementation of Input, using the terminal in raw mode.
///
/// terminals only report key-down, so a mapped key is held for
/// `hold_frames` polls after its last press and then released
pub struct StdinInput {
    keymap: HashMap<char, usize>,
    held: [u8; KEY_COUNT],
    hold_frames: u8,
}

impl StdinInput {
    pub fn new(hold_frames: u8) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: CHIP8_CONVENTIONAL_KEYMAP
                .iter()
                .map(|&(c, k)| (c, k as usize))
                .collect(),
            held: [0; KEY_COUNT],
            hold_frames: hold_frames.max(1),
        })
    }

    fn read_stdin(&mut self, events: &mut Vec<HostEvent>) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(HostEvent::Quit)
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&index) => {
                            if self.held[index] == 0 {
                                events.push(HostEvent::Key {
                                    index,
                                    pressed: true,
                                });
                            }
                            self.held[index] = self.hold_frames;
                        }
                        None => {
                            log::debug!("can't map {:?} to a COSMAC key", key);
                        }
                    },
                    KeyCode::Up => events.push(HostEvent::Up),
                    KeyCode::Down => events.push(HostEvent::Down),
                    KeyCode::Enter => events.push(HostEvent::Enter),
                    KeyCode::Esc => events.push(HostEvent::Escape),
                    _ => {
                        log::debug!("unknown key event received");
                    }
                },
                _ => {
                    log::trace!("ignoring non-key terminal event");
                }
            }
        }
        Ok(())
    }

    fn release_expired(&mut self, events: &mut Vec<HostEvent>) {
        for (index, frames) in self.held.iter_mut().enumerate() {
            if *frames == 0 {
                continue;
            }
            *frames -= 1;
            if *frames == 0 {
                events.push(HostEvent::Key {
                    index,
                    pressed: false,
                });
            }
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("failed to leave raw mode: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn poll(&mut self) -> Result<Vec<HostEvent>, io::Error> {
        let mut events = Vec::new();
        self.release_expired(&mut events);
        self.read_stdin(&mut events)?;
        Ok(events)
    }
}

/// dummy Input implementation for testing: each poll hands out the next
/// scripted batch of events
pub struct DummyInput {
    frames: VecDeque<Vec<HostEvent>>,
}

impl DummyInput {
    pub fn new(frames: Vec<Vec<HostEvent>>) -> Self {
        DummyInput {
            frames: frames.into(),
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<Vec<HostEvent>, io::Error> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_reports_rising_edge() {
        let mut l = InputLatch::new();
        assert_eq!(l.set_key(0xa, true), Ok(true));
        assert_eq!(l.set_key(0xa, true), Ok(false));
        assert!(l.is_pressed(0xa));
        assert_eq!(l.set_key(0xa, false), Ok(false));
        assert!(!l.is_pressed(0xa));
    }

    #[test]
    fn test_latch_rejects_bad_index() {
        let mut l = InputLatch::new();
        assert_eq!(l.set_key(16, true), Err(InputError::InvalidKey(16)));
        assert_eq!(l, InputLatch::new());
        assert!(!l.is_pressed(200));
    }

    #[test]
    fn test_release_all() {
        let mut l = InputLatch::new();
        l.set_key(3, true).unwrap();
        l.release_all();
        assert!(!l.is_pressed(3));
    }

    #[test]
    fn test_dummy_input_replays_frames() -> Result<(), io::Error> {
        let mut i = DummyInput::new(vec![vec![HostEvent::Up], vec![]]);
        assert_eq!(i.poll()?, vec![HostEvent::Up]);
        assert_eq!(i.poll()?, vec![]);
        assert_eq!(i.poll()?, vec![]);
        Ok(())
    }

    #[test]
    fn test_conventional_keymap_covers_keypad() {
        let mut seen = [false; KEY_COUNT];
        for (_, k) in CHIP8_CONVENTIONAL_KEYMAP {
            seen[k as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
