use crate::display::Framebuffer;
use crate::error::{Fault, InputError, LoadError};
use crate::input::KEY_COUNT;
use crate::interpreter::Chip8Interpreter;
use crate::menu::{self, MenuState};
use crate::observer::Observer;

/// what the cycle / input calls are routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Launcher,
    Running,
}

/// a ROM the launcher can offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl RomEntry {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        RomEntry {
            name: name.into(),
            data,
        }
    }
}

/// the list of ROMs, owned by whoever found them
pub type RomCatalog = Vec<RomEntry>;

/// The whole console: a ROM picker in front of the interpreter. Starts in
/// the launcher; selecting a ROM runs it and a reset request comes back.
pub struct Chip8<'a, O: Observer> {
    interpreter: Chip8Interpreter<O>,
    catalog: &'a [RomEntry],
    menu: MenuState,
    mode: Mode,
}

impl<'a, O: Observer> Chip8<'a, O> {
    pub fn new(catalog: &'a [RomEntry], observer: O) -> Self {
        Self::with_interpreter(catalog, Chip8Interpreter::new(observer))
    }

    pub fn with_interpreter(catalog: &'a [RomEntry], interpreter: Chip8Interpreter<O>) -> Self {
        Chip8 {
            interpreter,
            catalog,
            menu: MenuState::default(),
            mode: Mode::Launcher,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn catalog(&self) -> &'a [RomEntry] {
        self.catalog
    }

    pub fn selected_index(&self) -> usize {
        self.menu.selected()
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn interpreter(&self) -> &Chip8Interpreter<O> {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Chip8Interpreter<O> {
        &mut self.interpreter
    }

    /// swap in a new list of ROMs; the selection goes back to the top
    pub fn set_catalog(&mut self, catalog: &'a [RomEntry]) {
        self.catalog = catalog;
        self.menu.reset();
    }

    pub fn menu_up(&mut self) {
        if self.mode == Mode::Launcher {
            self.menu.move_up(self.catalog.len());
        }
    }

    pub fn menu_down(&mut self) {
        if self.mode == Mode::Launcher {
            self.menu.move_down(self.catalog.len());
        }
    }

    /// run the highlighted ROM. does nothing while a ROM is running
    pub fn menu_select(&mut self) -> Result<(), LoadError> {
        if self.mode != Mode::Launcher {
            return Ok(());
        }
        let catalog = self.catalog;
        let entry = catalog
            .get(self.menu.selected())
            .ok_or(LoadError::EmptyCatalog)?;
        log::debug!("launching {}", entry.name);
        self.start_rom(&entry.data)
    }

    /// load a ROM and run it straight away, from either mode
    pub fn start_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.interpreter.load_program(rom)?;
        self.mode = Mode::Running;
        Ok(())
    }

    /// abandon whatever is running and go back to the menu
    pub fn enter_launcher(&mut self) {
        self.interpreter.reset();
        self.mode = Mode::Launcher;
        log::debug!("back to launcher");
    }

    pub fn cycle(&mut self) -> Result<(), Fault> {
        match self.mode {
            Mode::Running => self.interpreter.cycle(),
            Mode::Launcher => Ok(()),
        }
    }

    pub fn tick(&mut self) {
        self.interpreter.tick();
    }

    /// keypad events only reach a running ROM, but bad indexes are always
    /// reported
    pub fn set_key(&mut self, key: usize, pressed: bool) {
        match self.mode {
            Mode::Running => self.interpreter.set_key(key, pressed),
            Mode::Launcher if key >= KEY_COUNT => {
                let e = InputError::InvalidKey(key);
                self.interpreter.observer_mut().on_log(&format!("set_key: {}", e));
            }
            Mode::Launcher => log::trace!("key {:#x} ignored in launcher", key),
        }
    }

    /// the current picture. in the launcher this repaints the menu first
    pub fn frame(&mut self) -> &Framebuffer {
        if self.mode == Mode::Launcher {
            menu::render(self.interpreter.framebuffer_mut(), self.catalog, &self.menu);
        }
        self.interpreter.framebuffer()
    }
}
