//! Console device and window-system lifecycle.
//!
//! - **backend**: `Backend` trait, device records and `ConsoleError`
//! - **system**: `Console`, the started window system
//! - **win32**: Win32 console API backend (Windows only)
//! - **term**: crossterm backend for any terminal
//! - **memory**: headless in-memory device
//!
//! # Lifecycle
//!
//! ```text
//! Console::startup(backend)  acquire input, create + activate screen buffer, raw mode
//!   Window::update(..)       blit window buffers
//!   Console::read_key()      block for the next key press
//! Console::shutdown()        restore input mode, release screen buffer
//! ```

pub mod backend;
pub mod memory;
pub mod system;
pub mod term;
#[cfg(windows)]
pub mod win32;

pub use backend::{
    vk, Backend, ConsoleError, ConsoleMode, CursorInfo, DeviceClaim, InputRecord, KeyRecord, Rect,
    Result,
};
pub use memory::MemoryBackend;
pub use system::{Console, INSERT_CURSOR_SIZE, OVERWRITE_CURSOR_SIZE};
pub use term::TermBackend;
#[cfg(windows)]
pub use win32::Win32Backend;
