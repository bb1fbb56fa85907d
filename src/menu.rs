use std::ops::Range;

use crate::display::{Framebuffer, DISPLAY_WIDTH};
use crate::launcher::RomEntry;

/// entries per launcher page
pub const PAGE_SIZE: usize = 5;

const GLYPH_ROWS: usize = 5;
const GLYPH_COLS: usize = 5;
/// glyph plus one pixel of spacing
const GLYPH_ADVANCE: usize = 6;
const LINE_STEP: usize = GLYPH_ROWS + 1;
const MENU_LEFT: usize = 2;
const MENU_TOP: usize = 2;
const EMPTY_MESSAGE: &str = "NO ROMS FOUND";
const EMPTY_MESSAGE_TOP: usize = 12;

/// which catalog entry is highlighted and which page is on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    selected: usize,
    offset: usize,
    page_size: usize,
}

impl MenuState {
    pub fn new(page_size: usize) -> Self {
        MenuState {
            selected: 0,
            offset: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// first entry on the visible page
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn move_up(&mut self, len: usize) {
        self.select(self.selected.saturating_sub(1), len);
    }

    pub fn move_down(&mut self, len: usize) {
        self.select(self.selected + 1, len);
    }

    /// jump to an entry, clamped to the catalog; no wraparound
    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = index.min(len.saturating_sub(1));
        self.offset = self.selected / self.page_size * self.page_size;
    }

    pub fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    /// catalog indexes on the current page
    pub fn visible(&self, len: usize) -> Range<usize> {
        self.offset.min(len)..(self.offset + self.page_size).min(len)
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

/// Repaint the whole framebuffer from the menu state. Nothing from the
/// previous frame survives, so calling this twice gives the same picture.
pub fn render(fb: &mut Framebuffer, catalog: &[RomEntry], menu: &MenuState) {
    fb.clear();

    if catalog.is_empty() {
        draw_text(fb, EMPTY_MESSAGE, MENU_LEFT, EMPTY_MESSAGE_TOP, false);
        return;
    }

    for (line, idx) in menu.visible(catalog.len()).enumerate() {
        let y = MENU_TOP + line * LINE_STEP;
        let selected = idx == menu.selected();
        if selected {
            draw_highlight_bar(fb, y);
        }
        draw_text(fb, label(&catalog[idx].name), MENU_LEFT, y, selected);
    }
}

/// what the launcher shows for a ROM: its name without a .ch8 extension
pub fn label(name: &str) -> &str {
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(".ch8") => &name[..cut],
        _ => name,
    }
}

/// uppercase text in the 5x5 font; characters without a glyph are skipped
/// but still take up space
pub fn draw_text(fb: &mut Framebuffer, text: &str, x: usize, y: usize, inverted: bool) {
    for (i, c) in text.chars().enumerate() {
        draw_char(fb, c.to_ascii_uppercase(), x + i * GLYPH_ADVANCE, y, inverted);
    }
}

fn draw_char(fb: &mut Framebuffer, c: char, x: usize, y: usize, inverted: bool) {
    let Some(rows) = glyph(c) else {
        return;
    };
    for (dy, bits) in rows.iter().enumerate() {
        let bits = if inverted { !bits } else { *bits };
        for dx in 0..GLYPH_COLS {
            let on = bits & (1 << (GLYPH_COLS - 1 - dx)) != 0;
            fb.set(x + dx, y + dy, on);
        }
    }
}

fn draw_highlight_bar(fb: &mut Framebuffer, y: usize) {
    for row in y..y + GLYPH_ROWS {
        for x in 0..DISPLAY_WIDTH {
            fb.set(x, row, true);
        }
    }
}

/// 5x5 launcher font, one row per byte, low five bits used
#[rustfmt::skip]
fn glyph(c: char) -> Option<[u8; GLYPH_ROWS]> {
    Some(match c {
        'A' => [0b01110, 0b10001, 0b11111, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000],
        'G' => [0b01110, 0b10000, 0b10111, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b11111, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => [0b00111, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b11100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10101, 0b01111],
        'R' => [0b11110, 0b10001, 0b11110, 0b10100, 0b10010],
        'S' => [0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        'Y' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00010, 0b00100, 0b11111],
        '3' => [0b01110, 0b10001, 0b00110, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b11111, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b11110],
        '6' => [0b01110, 0b10000, 0b11110, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000],
        '8' => [0b01110, 0b10001, 0b01110, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b01111, 0b00001, 0b01110],
        ' ' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b11111, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
        _ => return None,
    })
}
