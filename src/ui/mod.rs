//! Windows and keyboard input.
//!
//! - **window**: off-screen cell windows and box drawing
//! - **keymapper**: key records to abstract `Key` codes

pub mod keymapper;
pub mod window;

pub use keymapper::{Key, KeyMapper};
pub use window::{BoxGlyphs, Window};
