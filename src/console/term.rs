//! Portable terminal backend using crossterm
//!
//! Emulates the console screen buffer with the terminal's alternate screen
//! and raw mode. Key events are translated into virtual key records so the
//! rest of the crate sees the same input model on every platform.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, SetCursorStyle, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use unicode_width::UnicodeWidthChar;

use super::backend::{
    vk, Backend, ConsoleMode, CursorInfo, DeviceClaim, InputRecord, KeyRecord, Rect, Result,
};
use crate::core::{codepage, Attr, Cell};

/// Cursors smaller than this are drawn as an underscore
const BLOCK_CURSOR_MIN_SIZE: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermHandle {
    Input,
    Screen,
}

/// Terminal driven through escape sequences
pub struct TermBackend {
    screen_open: bool,
    alternate: bool,
    cursor: CursorInfo,
    cursor_position: (u16, u16),
    _claim: DeviceClaim,
}

impl TermBackend {
    /// Claim the process terminal
    pub fn new() -> Result<Self> {
        Ok(Self {
            screen_open: false,
            alternate: false,
            cursor: CursorInfo::default(),
            cursor_position: (0, 0),
            _claim: DeviceClaim::acquire()?,
        })
    }

    fn apply_cursor<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (x, y) = self.cursor_position;
        queue!(out, MoveTo(x, y))?;
        if self.cursor.visible {
            let style = if self.cursor.size < BLOCK_CURSOR_MIN_SIZE {
                SetCursorStyle::SteadyUnderScore
            } else {
                SetCursorStyle::SteadyBlock
            };
            queue!(out, style, Show)?;
        } else {
            queue!(out, Hide)?;
        }
        Ok(())
    }
}

impl Backend for TermBackend {
    type Handle = TermHandle;

    fn input_handle(&mut self) -> io::Result<TermHandle> {
        Ok(TermHandle::Input)
    }

    fn create_screen_buffer(&mut self) -> io::Result<TermHandle> {
        if self.screen_open {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "terminal has a single alternate screen",
            ));
        }
        self.screen_open = true;
        Ok(TermHandle::Screen)
    }

    fn activate_screen_buffer(&mut self, _screen: TermHandle) -> io::Result<()> {
        execute!(io::stdout(), EnterAlternateScreen, Clear(ClearType::All))?;
        self.alternate = true;
        Ok(())
    }

    fn close_screen_buffer(&mut self, _screen: TermHandle) {
        if self.alternate {
            let mut stdout = io::stdout();
            let _ = execute!(
                stdout,
                ResetColor,
                SetCursorStyle::DefaultUserShape,
                Show,
                EnableLineWrap,
                LeaveAlternateScreen
            );
            self.alternate = false;
        }
        self.screen_open = false;
    }

    fn mode(&mut self, handle: TermHandle) -> io::Result<ConsoleMode> {
        if handle == TermHandle::Input && !terminal::is_raw_mode_enabled()? {
            return Ok(ConsoleMode::COOKED);
        }
        Ok(ConsoleMode::RAW)
    }

    fn set_mode(&mut self, handle: TermHandle, mode: ConsoleMode) -> io::Result<()> {
        match (handle, mode.is_raw()) {
            (TermHandle::Input, true) => terminal::enable_raw_mode(),
            (TermHandle::Input, false) => terminal::disable_raw_mode(),
            (TermHandle::Screen, true) => execute!(io::stdout(), DisableLineWrap),
            (TermHandle::Screen, false) => execute!(io::stdout(), EnableLineWrap),
        }
    }

    fn screen_size(&self, _screen: TermHandle) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn cursor_info(&self, _screen: TermHandle) -> io::Result<CursorInfo> {
        Ok(self.cursor)
    }

    fn set_cursor_info(&mut self, _screen: TermHandle, info: CursorInfo) -> io::Result<()> {
        self.cursor = info;
        let mut stdout = io::stdout();
        self.apply_cursor(&mut stdout)?;
        stdout.flush()
    }

    fn set_cursor_position(&mut self, _screen: TermHandle, x: u16, y: u16) -> io::Result<()> {
        self.cursor_position = (x, y);
        execute!(io::stdout(), MoveTo(x, y))
    }

    fn write_output(
        &mut self,
        _screen: TermHandle,
        cells: &[Cell],
        size: (u16, u16),
        offset: (u16, u16),
        region: Rect,
    ) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = io::BufWriter::with_capacity(65536, stdout.lock());

        queue!(out, Hide)?;
        draw_block(&mut out, cells, size, offset, region)?;
        self.apply_cursor(&mut out)?;
        out.flush()
    }

    fn read_input(&mut self, _input: TermHandle) -> io::Result<Option<InputRecord>> {
        match event::read()? {
            Event::Key(event) => Ok(Some(InputRecord::Key {
                key: key_record(&event),
                down: event.kind != KeyEventKind::Release,
            })),
            _ => Ok(Some(InputRecord::Other)),
        }
    }
}

/// Queue the cells of `region`, taken from `cells` starting at `offset`
fn draw_block<W: Write>(
    out: &mut W,
    cells: &[Cell],
    size: (u16, u16),
    offset: (u16, u16),
    region: Rect,
) -> io::Result<()> {
    let mut last_attr: Option<Attr> = None;
    let len = region.width().min(size.0.saturating_sub(offset.0)) as usize;
    for row in 0..region.height().min(size.1.saturating_sub(offset.1)) {
        let src = (offset.1 + row) as usize * size.0 as usize + offset.0 as usize;
        queue!(out, MoveTo(region.left, region.top + row))?;
        for cell in &cells[src..src + len] {
            if last_attr != Some(cell.attr) {
                queue!(
                    out,
                    SetForegroundColor(console_color(cell.attr.foreground())),
                    SetBackgroundColor(console_color(cell.attr.background()))
                )?;
                last_attr = Some(cell.attr);
            }
            queue!(out, Print(glyph(cell.ch)))?;
        }
    }
    queue!(out, ResetColor)
}

/// Terminal color for a console color index
fn console_color(index: u8) -> Color {
    match index & 0x0F {
        0 => Color::Black,
        1 => Color::DarkBlue,
        2 => Color::DarkGreen,
        3 => Color::DarkCyan,
        4 => Color::DarkRed,
        5 => Color::DarkMagenta,
        6 => Color::DarkYellow,
        7 => Color::Grey,
        8 => Color::DarkGrey,
        9 => Color::Blue,
        10 => Color::Green,
        11 => Color::Cyan,
        12 => Color::Red,
        13 => Color::Magenta,
        14 => Color::Yellow,
        _ => Color::White,
    }
}

/// Glyphs that do not occupy exactly one column would shift the row
fn glyph(ch: char) -> char {
    if ch.width() == Some(1) {
        ch
    } else {
        ' '
    }
}

fn key_record(event: &KeyEvent) -> KeyRecord {
    let (virtual_key, ch) = match event.code {
        KeyCode::Backspace => (vk::BACK, 0x08),
        KeyCode::Tab | KeyCode::BackTab => (vk::TAB, b'\t'),
        KeyCode::Enter => (vk::RETURN, b'\r'),
        KeyCode::Esc => (vk::ESCAPE, 0x1B),
        KeyCode::PageUp => (vk::PRIOR, 0),
        KeyCode::PageDown => (vk::NEXT, 0),
        KeyCode::End => (vk::END, 0),
        KeyCode::Home => (vk::HOME, 0),
        KeyCode::Left => (vk::LEFT, 0),
        KeyCode::Up => (vk::UP, 0),
        KeyCode::Right => (vk::RIGHT, 0),
        KeyCode::Down => (vk::DOWN, 0),
        KeyCode::Insert => (vk::INSERT, 0),
        KeyCode::Delete => (vk::DELETE, 0),
        KeyCode::F(n) => (vk::F1 + u16::from(n.saturating_sub(1)), 0),
        KeyCode::Char(c) => (char_virtual_key(c), char_code(c, event.modifiers)),
        _ => (0, 0),
    };
    KeyRecord { virtual_key, ch }
}

fn char_virtual_key(c: char) -> u16 {
    if c == ' ' {
        vk::SPACE
    } else if c.is_ascii_alphanumeric() {
        c.to_ascii_uppercase() as u16
    } else {
        0
    }
}

fn char_code(c: char, mods: KeyModifiers) -> u8 {
    // Ctrl+letter produces the control character, as the console does
    if mods.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() {
        return c.to_ascii_uppercase() as u8 & 0x1F;
    }
    codepage::encode(c).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyRecord {
        key_record(&KeyEvent::new(code, mods))
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE).virtual_key, vk::ESCAPE);
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE).virtual_key, vk::UP);
        assert_eq!(key(KeyCode::Delete, KeyModifiers::NONE).virtual_key, vk::DELETE);
        assert_eq!(
            key(KeyCode::Enter, KeyModifiers::NONE),
            KeyRecord { virtual_key: vk::RETURN, ch: b'\r' }
        );
        assert_eq!(key(KeyCode::F(5), KeyModifiers::NONE).virtual_key, 0x74);
    }

    #[test]
    fn test_char_keys() {
        assert_eq!(
            key(KeyCode::Char('a'), KeyModifiers::NONE),
            KeyRecord { virtual_key: 0x41, ch: b'a' }
        );
        assert_eq!(
            key(KeyCode::Char('7'), KeyModifiers::NONE),
            KeyRecord { virtual_key: 0x37, ch: b'7' }
        );
        assert_eq!(key(KeyCode::Char(' '), KeyModifiers::NONE).virtual_key, vk::SPACE);
        assert_eq!(key(KeyCode::Char('é'), KeyModifiers::NONE).ch, 0x82);
        assert_eq!(key(KeyCode::Char('€'), KeyModifiers::NONE).ch, 0);
    }

    #[test]
    fn test_ctrl_letter() {
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL).ch, 0x03);
        assert_eq!(key(KeyCode::Char('G'), KeyModifiers::CONTROL).ch, 0x07);
    }

    #[test]
    fn test_console_colors() {
        assert_eq!(console_color(Attr::BG_BLUE.background()), Color::DarkBlue);
        assert_eq!(console_color(Attr::FG_WHITE.foreground()), Color::Grey);
        let bright = Attr::FG_YELLOW | Attr::FG_INTENSITY;
        assert_eq!(console_color(bright.foreground()), Color::Yellow);
    }

    #[test]
    fn test_draw_block_with_margin() {
        // 4x3 buffer "abcd" / "efgh" / "ijkl"
        let cells: Vec<Cell> = "abcdefghijkl"
            .chars()
            .map(|ch| Cell::new(ch, Attr::FG_WHITE | Attr::BG_BLUE))
            .collect();
        let region = Rect { left: 3, top: 3, right: 4, bottom: 4 };

        let mut out = Vec::new();
        draw_block(&mut out, &cells, (4, 3), (1, 1), region).unwrap();
        let text = String::from_utf8(out).unwrap();

        let first = text.find("\x1b[4;4H").expect("first row moved to (3, 3)");
        let second = text.find("\x1b[5;4H").expect("second row moved to (3, 4)");
        assert!(first < second);
        assert!(text[first..second].contains("fg"));
        assert!(text[second..].contains("jk"));
        for skipped in ['a', 'd', 'e', 'h', 'i'] {
            assert!(!text.contains(skipped), "{:?} is outside the margin", skipped);
        }
    }

    #[test]
    fn test_glyph_width() {
        assert_eq!(glyph('─'), '─');
        assert_eq!(glyph('\u{7}'), ' ');
        assert_eq!(glyph('\u{0}'), ' ');
    }
}
