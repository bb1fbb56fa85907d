/// Hooks the host can plug in to hear about things the core can't act on
/// itself. Both methods have defaults, so implement only what you need.
pub trait Observer {
    /// a non-fatal anomaly, e.g. a key index out of range
    fn on_log(&mut self, message: &str) {
        log::warn!("{}", message);
    }

    /// the sound timer became non-zero (true) or ran out (false). only
    /// called on a change
    fn on_sound_state_changed(&mut self, _on: bool) {}
}

/// records everything it is told; handy for tests and headless hosts
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Recorder {
    pub logs: Vec<String>,
    pub sound: Vec<bool>,
}

impl Observer for Recorder {
    fn on_log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }

    fn on_sound_state_changed(&mut self, on: bool) {
        self.sound.push(on);
    }
}
