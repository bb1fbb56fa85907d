use std::io;
use std::time::{Duration, Instant};

use crate::display::Display;
use crate::error::Fault;
use crate::input::{HostEvent, Input};
use crate::launcher::{Chip8, Mode};
use crate::observer::Observer;

/// keypad keys that double as launcher navigation (w, s, e on qwerty)
const NAV_UP_KEY: usize = 0x5;
const NAV_DOWN_KEY: usize = 0x8;
const NAV_SELECT_KEY: usize = 0x6;

/// host loop settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// instructions per 60Hz frame
    pub cycles_per_frame: usize,
    /// timer ticks (and frames) per second
    pub frame_rate: f64,
    /// how long a terminal keypress counts as held
    pub key_hold_frames: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_frame: 10,
            frame_rate: 60.0,
            key_hold_frames: 6,
        }
    }
}

/// The host side: pumps input into the console, runs a frame's worth of
/// cycles, ticks the timers once and puts the picture on the display.
pub struct Environment<D: Display, I: Input> {
    display: D,
    input: I,
    config: Config,
    last_fault: Option<Fault>,
}

impl<D: Display, I: Input> Environment<D, I> {
    pub fn new(display: D, input: I, config: Config) -> Self {
        Environment {
            display,
            input,
            config,
            last_fault: None,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// the most recent fault a ROM hit, if any
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    /// run frames at `frame_rate` until the user quits
    pub fn run<O: Observer>(&mut self, chip8: &mut Chip8<'_, O>) -> Result<(), io::Error> {
        let frame_time = Duration::from_secs_f64(1.0 / self.config.frame_rate.max(1.0));
        loop {
            let started = Instant::now();
            if !self.step_frame(chip8)? {
                return Ok(());
            }
            if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
    }

    /// one frame. returns false once the user has asked to quit
    pub fn step_frame<O: Observer>(&mut self, chip8: &mut Chip8<'_, O>) -> Result<bool, io::Error> {
        for event in self.input.poll()? {
            if !Self::dispatch(chip8, event) {
                return Ok(false);
            }
        }

        for _ in 0..self.config.cycles_per_frame {
            if let Err(fault) = chip8.cycle() {
                // the interpreter is stopped; leave the screen up until the
                // user backs out to the launcher
                log::error!("ROM stopped: {}", fault);
                self.last_fault = Some(fault);
                break;
            }
        }
        chip8.tick();

        let frame = chip8.frame().to_packed();
        self.display.draw(&frame)?;
        Ok(true)
    }

    fn dispatch<O: Observer>(chip8: &mut Chip8<'_, O>, event: HostEvent) -> bool {
        match (chip8.mode(), event) {
            (_, HostEvent::Quit) | (Mode::Launcher, HostEvent::Escape) => return false,
            (Mode::Running, HostEvent::Escape) => chip8.enter_launcher(),
            (Mode::Launcher, HostEvent::Up)
            | (Mode::Launcher, HostEvent::Key { index: NAV_UP_KEY, pressed: true }) => {
                chip8.menu_up()
            }
            (Mode::Launcher, HostEvent::Down)
            | (Mode::Launcher, HostEvent::Key { index: NAV_DOWN_KEY, pressed: true }) => {
                chip8.menu_down()
            }
            (Mode::Launcher, HostEvent::Enter)
            | (Mode::Launcher, HostEvent::Key { index: NAV_SELECT_KEY, pressed: true }) => {
                if let Err(e) = chip8.menu_select() {
                    log::error!("can't start ROM: {}", e);
                }
            }
            (_, HostEvent::Key { index, pressed }) => chip8.set_key(index, pressed),
            (Mode::Running, HostEvent::Up | HostEvent::Down | HostEvent::Enter) => {}
        }
        true
    }
}
