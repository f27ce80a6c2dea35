//! conwin - curses-like character-cell windows on a raw console
//!
//! Windows are drawn privately into cell buffers and copied to a shared
//! screen buffer only when `Window::update` is called. Text is legacy
//! CP437 bytes; colors are chosen through the closed `Style` set.
//!
//! ```no_run
//! use conwin::{Console, Style, TermBackend, Window};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut console = Console::startup(TermBackend::new()?)?;
//! let (width, height) = console.screen_size();
//!
//! let mut window = Window::new(0, 0, width, height, Style::FileWin);
//! window.border();
//! window.put(2, 1, b"Press any key");
//! window.update(&mut console, 0)?;
//!
//! console.read_key()?;
//! console.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod console;
pub mod core;
pub mod ui;

pub use crate::console::{Backend, Console, ConsoleError, MemoryBackend, TermBackend};
#[cfg(windows)]
pub use crate::console::Win32Backend;
pub use crate::core::{codepage, Attr, Cell, Style};
pub use crate::ui::{BoxGlyphs, Key, KeyMapper, Window};
