use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The monochrome 64x32 bitmap. The draw instruction XORs sprites into it
/// while a ROM runs; the launcher repaints it from scratch every frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    cells: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            cells: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// read a pixel; anything off-screen is dark
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.cells[y * DISPLAY_WIDTH + x]
    }

    /// set a pixel directly; off-screen writes are dropped
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT {
            self.cells[y * DISPLAY_WIDTH + x] = on;
        }
    }

    /// XOR an 8-pixel-wide sprite in at (x, y), one byte per row, MSB on the
    /// left. both axes wrap around the edges. returns true if any lit pixel
    /// was switched off
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collision = false;
        for (row, bits) in rows.iter().enumerate() {
            let py = (y as usize + row) % DISPLAY_HEIGHT;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (x as usize + col) % DISPLAY_WIDTH;
                let cell = &mut self.cells[py * DISPLAY_WIDTH + px];
                collision |= *cell;
                *cell ^= true;
            }
        }
        collision
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&c| !c)
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// pack rows into bytes, MSB first; this is what a Display draws
    pub fn to_packed(&self) -> Vec<u8> {
        self.cells
            .chunks(8)
            .map(|px| px.iter().fold(0u8, |acc, &on| (acc << 1) | on as u8))
            .collect()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(DISPLAY_WIDTH) {
            let line: String = row.iter().map(|&on| if on { 'X' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Display is used by the host to put frames on a screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw data based on internal resolution of display
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&mut self) -> usize;
}

/// canvas coordinates for a packed 1bpp frame. tui's canvas has y going up,
/// so row 0 of the frame sits at y = 0 and the rest go negative
struct CanvasGeometry {
    width: usize,
    height: usize,
}

impl CanvasGeometry {
    fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    fn byte_count(&self) -> usize {
        (self.pixel_count() + 7) / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.width - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-((self.height - 1) as f64), 0.0]
    }

    /// split a frame into (lit, dark) point lists in one pass
    fn points(&self, data: &[u8]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
        let mut lit = Vec::new();
        let mut dark = Vec::new();
        for n in 0..self.pixel_count() {
            let point = ((n % self.width) as f64, -((n / self.width) as f64));
            if data[n / 8] & (0x80 >> (n % 8)) != 0 {
                lit.push(point);
            } else {
                dark.push(point);
            }
        }
        (lit, dark)
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    geometry: CanvasGeometry,
}

impl MonoTermDisplay {
    pub fn new(width: usize, height: usize) -> Result<MonoTermDisplay, io::Error> {
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            geometry: CanvasGeometry { width, height },
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        let expected = self.geometry.byte_count();
        if data.len() != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("expected a {} byte frame, got {}", expected, data.len()),
            ));
        }

        let geometry = &self.geometry;
        let (lit, dark) = geometry.points(data);
        self.terminal.draw(|f| {
            // one terminal cell per pixel, plus the border
            let screen = f.size();
            let area = Rect::new(
                0,
                0,
                screen.width.min(geometry.width as u16 + 2),
                screen.height.min(geometry.height as u16 + 2),
            );
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(geometry.x_bounds())
                .y_bounds(geometry.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &dark,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, area);
        })?;
        Ok(())
    }

    fn get_display_size_bytes(&mut self) -> usize {
        self.geometry.byte_count()
    }
}

/// useful for testing non-display routines; keeps every frame it is given
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: Vec<Vec<u8>>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(|f| f.as_slice())
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.frames.push(data.to_vec());
        Ok(())
    }

    fn get_display_size_bytes(&mut self) -> usize {
        DISPLAY_WIDTH * DISPLAY_HEIGHT / 8
    }
}
