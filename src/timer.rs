/// The delay and sound countdown timers. Both only ever move down when the
/// host calls `tick` (nominally 60Hz) and stop at zero.
///
/// Sound is reported as edges: every mutator returns `Some(true)` when the
/// tone should start and `Some(false)` when it should stop, `None` otherwise.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timers {
    delay: u8,
    sound: u8,
    sounding: bool,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn set_sound(&mut self, value: u8) -> Option<bool> {
        self.sound = value;
        self.edge()
    }

    /// one 60Hz time slice
    pub fn tick(&mut self) -> Option<bool> {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        self.edge()
    }

    pub fn reset(&mut self) -> Option<bool> {
        self.delay = 0;
        self.sound = 0;
        self.edge()
    }

    fn edge(&mut self) -> Option<bool> {
        let on = self.sound > 0;
        if on == self.sounding {
            return None;
        }
        self.sounding = on;
        Some(on)
    }
}
