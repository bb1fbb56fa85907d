use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use chip8_console::display::{MonoTermDisplay, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8_console::environment::{Config, Environment};
use chip8_console::input::StdinInput;
use chip8_console::launcher::{Chip8, RomCatalog, RomEntry};
use chip8_console::observer::Observer;
use chip8_console::sound::{Mute, SimpleBeep};

#[derive(Parser, Debug)]
#[command(name = "chip8-console", about = "CHIP-8 interpreter with a ROM launcher")]
struct Args {
    /// directory to list in the launcher
    #[arg(long, value_name = "DIR", default_value = "roms")]
    rom_dir: PathBuf,

    /// extra ROM files to list
    #[arg(value_name = "FILE")]
    roms: Vec<PathBuf>,

    /// boot straight into this ROM, skipping the launcher
    #[arg(long, value_name = "FILE")]
    rom: Option<PathBuf>,

    /// instructions per 60Hz frame
    #[arg(long, default_value_t = Config::default().cycles_per_frame)]
    cycles_per_frame: usize,

    /// no beeping
    #[arg(long)]
    mute: bool,
}

/// every regular file in `dir` plus `extra`, sorted by file name. a missing
/// directory just means an empty launcher
fn load_catalog(dir: &Path, extra: &[PathBuf]) -> Result<RomCatalog, Box<dyn Error>> {
    let mut paths: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            log::warn!("can't read ROM directory {}: {}", dir.display(), e);
            Vec::new()
        }
    };
    paths.extend(extra.iter().cloned());
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut catalog = RomCatalog::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        catalog.push(RomEntry::new(name, fs::read(&path)?));
    }
    Ok(catalog)
}

fn run<O: Observer>(args: &Args, catalog: &RomCatalog, observer: O) -> Result<(), Box<dyn Error>> {
    let config = Config {
        cycles_per_frame: args.cycles_per_frame,
        ..Config::default()
    };
    let mut chip8 = Chip8::new(catalog, observer);
    if let Some(path) = &args.rom {
        chip8.start_rom(&fs::read(path)?)?;
    }

    // initialise
    let display = MonoTermDisplay::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)?;
    let input = StdinInput::new(config.key_hold_frames)?;
    let mut environment = Environment::new(display, input, config);
    environment.run(&mut chip8)?;

    if let Some(fault) = environment.last_fault() {
        log::info!("last fault: {}", fault);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let catalog = load_catalog(&args.rom_dir, &args.roms)?;
    log::debug!("{} ROM(s) in catalog", catalog.len());

    if args.mute {
        run(&args, &catalog, Mute::new())?;
    } else {
        run(&args, &catalog, SimpleBeep::new())?;
    }

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..DISPLAY_HEIGHT / 2 {
        println!();
    }
    Ok(())
}
