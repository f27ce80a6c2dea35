//! Off-screen character-cell windows
//!
//! A `Window` draws into its own cell buffer. Nothing reaches the screen
//! until `update` copies the buffer (or its interior) in one block.

use crate::console::{Backend, Console, Rect, Result};
use crate::core::{codepage, Attr, Cell, Style};

/// The six glyphs of a box outline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BoxGlyphs {
    pub const SINGLE: BoxGlyphs = BoxGlyphs {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    pub const DOUBLE: BoxGlyphs = BoxGlyphs {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
    };

    pub const ROUNDED: BoxGlyphs = BoxGlyphs {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
    };

    /// Glyph set by name, single line for anything unknown
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "double" => Self::DOUBLE,
            "rounded" | "round" => Self::ROUNDED,
            _ => Self::SINGLE,
        }
    }
}

impl Default for BoxGlyphs {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// A rectangular off-screen cell buffer placed on the screen.
///
/// Windows keep no cursor of their own; `set_cursor` moves the single
/// device cursor.
pub struct Window {
    /// Row-major, `width * height` cells
    cells: Vec<Cell>,
    /// Screen position of the top-left cell
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    /// Attribute for subsequent writes
    attr: Attr,
}

impl Window {
    /// Create a window at screen position (x, y), fully cleared.
    pub fn new(x: u16, y: u16, width: u16, height: u16, style: Style) -> Self {
        let mut window = Self {
            cells: Vec::new(),
            x,
            y,
            width: 0,
            height: 0,
            attr: style.attr(),
        };
        window.resize(width, height);
        window
    }

    /// Change the window size and clear it.
    ///
    /// The buffer is only reallocated when the size actually changes.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (self.width, self.height) != (width, height) {
            self.width = width;
            self.height = height;
            self.cells = vec![Cell::blank(self.attr); width as usize * height as usize];
        }
        self.clear();
    }

    /// Fill the window with spaces in the current attribute
    pub fn clear(&mut self) {
        let blank = Cell::blank(self.attr);
        self.cells.fill(blank);
    }

    /// Draw a box outline with its top-left corner at local (x, y).
    ///
    /// Only the outline is written; the interior is left alone.
    pub fn draw_box(&mut self, x: u16, y: u16, width: u16, height: u16, glyphs: &BoxGlyphs) {
        assert!(
            width > 1 && height > 1,
            "box must be at least 2x2, got {}x{}",
            width,
            height
        );
        let right = x + width - 1;
        let bottom = y + height - 1;

        self.set(x, y, glyphs.top_left);
        self.set(right, y, glyphs.top_right);
        self.set(x, bottom, glyphs.bottom_left);
        self.set(right, bottom, glyphs.bottom_right);

        for col in x + 1..right {
            self.set(col, y, glyphs.horizontal);
            self.set(col, bottom, glyphs.horizontal);
        }
        for row in y + 1..bottom {
            self.set(x, row, glyphs.vertical);
            self.set(right, row, glyphs.vertical);
        }
    }

    /// Single-line border around the whole window
    pub fn border(&mut self) {
        self.border_with(&BoxGlyphs::SINGLE);
    }

    pub fn border_with(&mut self, glyphs: &BoxGlyphs) {
        self.draw_box(0, 0, self.width, self.height, glyphs);
    }

    /// Write CP437 text starting at local (x, y).
    ///
    /// Stops at the first NUL byte or the end of `text`. Text is not
    /// wrapped or clipped: it continues into the next row and panics past
    /// the end of the buffer.
    pub fn put(&mut self, x: u16, y: u16, text: &[u8]) {
        let len = text.iter().position(|&b| b == 0).unwrap_or(text.len());
        let start = self.index(x, y);
        let attr = self.attr;
        for (cell, &byte) in self.cells[start..start + len].iter_mut().zip(text) {
            *cell = Cell::new(codepage::decode(byte), attr);
        }
    }

    /// Write one CP437 character `count` times starting at local (x, y)
    pub fn put_char(&mut self, x: u16, y: u16, ch: u8, count: u16) {
        let cell = Cell::new(codepage::decode(ch), self.attr);
        let start = self.index(x, y);
        self.cells[start..start + count as usize].fill(cell);
    }

    /// Recolor `count` cells starting at local (x, y), keeping their glyphs
    pub fn put_attribs(&mut self, x: u16, y: u16, style: Style, count: u16) {
        let attr = style.attr();
        let start = self.index(x, y);
        for cell in &mut self.cells[start..start + count as usize] {
            cell.attr = attr;
        }
    }

    /// Set the attribute used by later writes
    pub fn set_attribs(&mut self, style: Style) {
        self.attr = style.attr();
    }

    /// Move the device cursor to local (x, y) of this window
    pub fn set_cursor<B: Backend>(&self, console: &mut Console<B>, x: u16, y: u16) -> Result<()> {
        assert!(
            x < self.width && y < self.height,
            "cursor ({}, {}) outside {}x{} window",
            x,
            y,
            self.width,
            self.height
        );
        console.set_cursor_position(self.x + x, self.y + y)
    }

    /// Copy the window to the screen.
    ///
    /// `margin` cells are skipped on every side, so a static border can be
    /// left in place while the interior is redrawn.
    pub fn update<B: Backend>(&self, console: &mut Console<B>, margin: u16) -> Result<()> {
        let inset = u32::from(margin) * 2;
        if inset >= u32::from(self.width) || inset >= u32::from(self.height) {
            return Ok(());
        }
        let region = Rect {
            left: self.x + margin,
            top: self.y + margin,
            right: self.x + self.width - 1 - margin,
            bottom: self.y + self.height - 1 - margin,
        };
        tracing::trace!(?region, "update window");
        console.write_output(
            &self.cells,
            (self.width, self.height),
            (margin, margin),
            region,
        )
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Screen position of the top-left cell
    pub fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    pub fn attr(&self) -> Attr {
        self.attr
    }

    pub fn cell(&self, x: u16, y: u16) -> Cell {
        self.cells[self.cell_index(x, y)]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn set(&mut self, x: u16, y: u16, ch: char) {
        let i = self.cell_index(x, y);
        self.cells[i] = Cell::new(ch, self.attr);
    }

    /// Start of a run of cells; a run may begin just past the last column
    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        debug_assert!(
            x <= self.width && y < self.height,
            "run start ({}, {}) outside {}x{} window",
            x,
            y,
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn cell_index(&self, x: u16, y: u16) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "cell ({}, {}) outside {}x{} window",
            x,
            y,
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}
