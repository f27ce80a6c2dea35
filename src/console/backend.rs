//! Device backend seam
//!
//! A `Backend` exposes the raw console primitives one call at a time.
//! `Console` sequences them; backends never decide policy.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::core::Cell;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Failed to acquire input handle: {0}")]
    InputHandle(#[source] io::Error),

    #[error("Failed to create screen buffer: {0}")]
    ScreenBuffer(#[source] io::Error),

    #[error("Failed to activate screen buffer: {0}")]
    Activate(#[source] io::Error),

    #[error("Failed to query console mode: {0}")]
    GetMode(#[source] io::Error),

    #[error("Failed to set console mode: {0}")]
    SetMode(#[source] io::Error),

    #[error("Failed to write console output: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to read console input: {0}")]
    Read(#[source] io::Error),

    #[error("Console device is already in use")]
    AlreadyClaimed,

    #[error("Console has been shut down")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Console mode flags, as stored by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsoleMode(pub u32);

impl ConsoleMode {
    /// No line editing, no echo, no processed input
    pub const RAW: ConsoleMode = ConsoleMode(0);
    /// Processed input, line input and echo
    pub const COOKED: ConsoleMode = ConsoleMode(0x0001 | 0x0002 | 0x0004);

    pub fn is_raw(self) -> bool {
        self.0 & (Self::COOKED.0) == 0
    }
}

/// Cursor glyph size (percent of the cell) and visibility
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorInfo {
    pub size: u32,
    pub visible: bool,
}

impl Default for CursorInfo {
    fn default() -> Self {
        Self {
            size: 25,
            visible: true,
        }
    }
}

/// Inclusive screen rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

impl Rect {
    pub fn width(&self) -> u16 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u16 {
        self.bottom - self.top + 1
    }
}

/// Virtual key codes carried in `KeyRecord`
pub mod vk {
    pub const BACK: u16 = 0x08;
    pub const TAB: u16 = 0x09;
    pub const RETURN: u16 = 0x0D;
    pub const ESCAPE: u16 = 0x1B;
    pub const SPACE: u16 = 0x20;
    pub const PRIOR: u16 = 0x21;
    pub const NEXT: u16 = 0x22;
    pub const END: u16 = 0x23;
    pub const HOME: u16 = 0x24;
    pub const LEFT: u16 = 0x25;
    pub const UP: u16 = 0x26;
    pub const RIGHT: u16 = 0x27;
    pub const DOWN: u16 = 0x28;
    pub const INSERT: u16 = 0x2D;
    pub const DELETE: u16 = 0x2E;
    pub const F1: u16 = 0x70;
}

/// A hardware key record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRecord {
    /// Device-independent virtual key code
    pub virtual_key: u16,
    /// Character in the legacy code page, 0 if the key has none
    pub ch: u8,
}

/// One raw input record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputRecord {
    Key { key: KeyRecord, down: bool },
    /// Mouse, resize, focus and other records
    Other,
}

/// Raw console primitives.
///
/// Every call maps onto a single device operation. Failures are returned
/// as `io::Error`; `Console` attaches the step that failed.
pub trait Backend {
    type Handle: Copy + fmt::Debug;

    /// Obtain the process's input handle (not owned, never closed)
    fn input_handle(&mut self) -> io::Result<Self::Handle>;

    /// Create a new screen buffer sized to the physical console
    fn create_screen_buffer(&mut self) -> io::Result<Self::Handle>;

    fn activate_screen_buffer(&mut self, screen: Self::Handle) -> io::Result<()>;

    /// Release a screen buffer created by `create_screen_buffer`
    fn close_screen_buffer(&mut self, screen: Self::Handle);

    fn mode(&mut self, handle: Self::Handle) -> io::Result<ConsoleMode>;

    fn set_mode(&mut self, handle: Self::Handle, mode: ConsoleMode) -> io::Result<()>;

    /// Buffer dimensions in cells (width, height)
    fn screen_size(&self, screen: Self::Handle) -> io::Result<(u16, u16)>;

    fn cursor_info(&self, screen: Self::Handle) -> io::Result<CursorInfo>;

    fn set_cursor_info(&mut self, screen: Self::Handle, info: CursorInfo) -> io::Result<()>;

    fn set_cursor_position(&mut self, screen: Self::Handle, x: u16, y: u16) -> io::Result<()>;

    /// Copy a block of `cells` to the screen.
    ///
    /// `cells` is a row-major buffer of `size` (width, height). The cell at
    /// `offset` within it lands on the top-left corner of `region`.
    fn write_output(
        &mut self,
        screen: Self::Handle,
        cells: &[Cell],
        size: (u16, u16),
        offset: (u16, u16),
        region: Rect,
    ) -> io::Result<()>;

    /// Read one input record, `None` if the device returned nothing
    fn read_input(&mut self, input: Self::Handle) -> io::Result<Option<InputRecord>>;
}

static DEVICE_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Process-wide claim on the physical console.
///
/// Backends that drive the real device hold one; only a single claim can be
/// live at a time. Dropping it releases the device.
#[derive(Debug)]
pub struct DeviceClaim(());

impl DeviceClaim {
    pub fn acquire() -> Result<Self> {
        DEVICE_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| DeviceClaim(()))
            .map_err(|_| ConsoleError::AlreadyClaimed)
    }
}

impl Drop for DeviceClaim {
    fn drop(&mut self) {
        DEVICE_CLAIMED.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_claim_is_exclusive() {
        let claim = DeviceClaim::acquire().unwrap();
        assert!(matches!(DeviceClaim::acquire(), Err(ConsoleError::AlreadyClaimed)));
        drop(claim);
        let again = DeviceClaim::acquire();
        assert!(again.is_ok());
    }

    #[test]
    fn test_console_mode_raw() {
        assert!(ConsoleMode::RAW.is_raw());
        assert!(!ConsoleMode::COOKED.is_raw());
        assert!(!ConsoleMode(0x0004).is_raw());
    }

    #[test]
    fn test_rect_dimensions() {
        let r = Rect { left: 3, top: 3, right: 10, bottom: 5 };
        assert_eq!((r.width(), r.height()), (8, 3));
    }
}
