use beep::beep;

use crate::observer::Observer;

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// plays a square-ish tone through the PC speaker while the sound timer runs
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }

    pub fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for SimpleBeep {
    fn on_sound_state_changed(&mut self, on: bool) {
        let pitch = if on { SIMPLEBEEP_PITCH } else { 0 };
        match beep(pitch) {
            Ok(()) => self.is_beeping = on,
            Err(e) => log::error!("beep failed: {}", e),
        }
    }
}

/// no sound; diagnostics still go to the log
#[derive(Default)]
pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Observer for Mute {}
