//! Window-system lifecycle
//!
//! `Console` owns the device: the input handle, the alternate screen buffer
//! and the input mode saved at startup. It is created once by the program,
//! passed by reference to windows and the key reader, and shut down once.

use tracing::{debug, info, warn};

use super::backend::{Backend, ConsoleError, ConsoleMode, CursorInfo, Rect, Result};
use crate::core::Cell;

/// Cursor size while inserting (percent of the cell)
pub const INSERT_CURSOR_SIZE: u32 = 10;
/// Cursor size while overwriting
pub const OVERWRITE_CURSOR_SIZE: u32 = 100;

pub struct Console<B: Backend> {
    backend: B,
    input: B::Handle,
    /// Alternate screen buffer, `None` once shut down
    screen: Option<B::Handle>,
    /// Input mode to restore on shutdown
    saved_mode: Option<ConsoleMode>,
}

impl<B: Backend> Console<B> {
    /// Start up the window system.
    ///
    /// Creates and activates a new screen buffer and switches both it and
    /// the input handle to raw mode. On failure every handle acquired so
    /// far is released before the error is returned.
    pub fn startup(mut backend: B) -> Result<Self> {
        let input = backend.input_handle().map_err(ConsoleError::InputHandle)?;
        let screen = backend
            .create_screen_buffer()
            .map_err(ConsoleError::ScreenBuffer)?;

        match Self::enter_raw_mode(&mut backend, input, screen) {
            Ok(saved_mode) => {
                info!("Console started (input mode 0x{:04X})", saved_mode.0);
                Ok(Self {
                    backend,
                    input,
                    screen: Some(screen),
                    saved_mode: Some(saved_mode),
                })
            }
            Err(e) => {
                warn!("Console startup failed, releasing screen buffer: {}", e);
                backend.close_screen_buffer(screen);
                Err(e)
            }
        }
    }

    fn enter_raw_mode(backend: &mut B, input: B::Handle, screen: B::Handle) -> Result<ConsoleMode> {
        backend
            .activate_screen_buffer(screen)
            .map_err(ConsoleError::Activate)?;
        backend
            .set_mode(screen, ConsoleMode::RAW)
            .map_err(ConsoleError::SetMode)?;
        let original = backend.mode(input).map_err(ConsoleError::GetMode)?;
        backend
            .set_mode(input, ConsoleMode::RAW)
            .map_err(ConsoleError::SetMode)?;
        Ok(original)
    }

    /// Shut down the window system.
    ///
    /// Restores the saved input mode and releases the screen buffer. Calling
    /// it again does nothing.
    pub fn shutdown(&mut self) {
        if let Some(mode) = self.saved_mode.take() {
            if let Err(e) = self.backend.set_mode(self.input, mode) {
                warn!("Failed to restore input mode: {}", e);
            }
        }
        if let Some(screen) = self.screen.take() {
            self.backend.close_screen_buffer(screen);
            info!("Console shut down");
        }
    }

    pub fn is_active(&self) -> bool {
        self.screen.is_some()
    }

    /// Current screen size in cells, `(0, 0)` if it cannot be determined
    pub fn screen_size(&self) -> (u16, u16) {
        let Some(screen) = self.screen else {
            return (0, 0);
        };
        match self.backend.screen_size(screen) {
            Ok(size) => size,
            Err(e) => {
                debug!("Screen size query failed: {}", e);
                (0, 0)
            }
        }
    }

    /// Make the cursor invisible
    pub fn hide_cursor(&mut self) {
        self.update_cursor(|info| info.visible = false);
    }

    /// Make the cursor visible, small when inserting and full-cell otherwise
    pub fn show_cursor(&mut self, insert: bool) {
        self.update_cursor(|info| {
            info.visible = true;
            info.size = if insert {
                INSERT_CURSOR_SIZE
            } else {
                OVERWRITE_CURSOR_SIZE
            };
        });
    }

    fn update_cursor(&mut self, change: impl FnOnce(&mut CursorInfo)) {
        let Some(screen) = self.screen else {
            return;
        };
        let mut info = match self.backend.cursor_info(screen) {
            Ok(info) => info,
            Err(e) => {
                debug!("Cursor query failed: {}", e);
                return;
            }
        };
        change(&mut info);
        if let Err(e) = self.backend.set_cursor_info(screen, info) {
            debug!("Failed to set cursor: {}", e);
        }
    }

    /// Move the shared cursor to absolute screen coordinates
    pub(crate) fn set_cursor_position(&mut self, x: u16, y: u16) -> Result<()> {
        let screen = self.screen.ok_or(ConsoleError::Closed)?;
        self.backend
            .set_cursor_position(screen, x, y)
            .map_err(ConsoleError::Write)
    }

    /// Block-copy part of a cell buffer onto the screen
    pub(crate) fn write_output(
        &mut self,
        cells: &[Cell],
        size: (u16, u16),
        offset: (u16, u16),
        region: Rect,
    ) -> Result<()> {
        let screen = self.screen.ok_or(ConsoleError::Closed)?;
        self.backend
            .write_output(screen, cells, size, offset, region)
            .map_err(ConsoleError::Write)
    }

    pub(crate) fn input(&self) -> B::Handle {
        self.input
    }

    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: Backend> Drop for Console<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::memory::{MemoryBackend, Step};

    fn started() -> Console<MemoryBackend> {
        Console::startup(MemoryBackend::new(80, 25)).unwrap()
    }

    #[test]
    fn test_startup_enters_raw_mode() {
        let console = started();
        let device = console.backend();
        assert!(console.is_active());
        assert_eq!(device.open_handles(), 1);
        assert!(device.screen_active());
        assert_eq!(device.input_mode(), ConsoleMode::RAW);
        assert_eq!(device.screen_mode(), Some(ConsoleMode::RAW));
    }

    #[test]
    fn test_shutdown_restores_mode() {
        let mut console = started();
        console.shutdown();
        assert!(!console.is_active());
        assert_eq!(console.backend().input_mode(), ConsoleMode::COOKED);
        assert_eq!(console.backend().open_handles(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut console = started();
        console.shutdown();
        console.shutdown();
        assert_eq!(console.backend().open_handles(), 0);
        assert_eq!(console.backend().closes(), 1);
    }

    #[test]
    fn test_startup_failure_releases_handles() {
        for step in [
            Step::CreateScreenBuffer,
            Step::Activate,
            Step::SetScreenMode,
            Step::GetInputMode,
            Step::SetInputMode,
        ] {
            let device = MemoryBackend::new(80, 25).failing(step);
            let tracker = device.tracker();
            let result = Console::startup(device);
            assert!(result.is_err(), "{:?} should fail startup", step);
            assert_eq!(tracker.open_handles(), 0, "{:?} leaked a handle", step);
        }
    }

    #[test]
    fn test_startup_failure_keeps_input_mode() {
        let device = MemoryBackend::new(80, 25).failing(Step::SetScreenMode);
        let tracker = device.tracker();
        let err = Console::startup(device).err().unwrap();
        assert!(matches!(err, ConsoleError::SetMode(_)));
        assert_eq!(tracker.input_mode(), ConsoleMode::COOKED);
    }

    #[test]
    fn test_input_handle_failure() {
        let device = MemoryBackend::new(80, 25).failing(Step::InputHandle);
        let err = Console::startup(device).err().unwrap();
        assert!(matches!(err, ConsoleError::InputHandle(_)));
    }

    #[test]
    fn test_screen_size() {
        let console = Console::startup(MemoryBackend::new(132, 43)).unwrap();
        assert_eq!(console.screen_size(), (132, 43));
    }

    #[test]
    fn test_screen_size_unknown() {
        let console = Console::startup(MemoryBackend::new(80, 25).failing(Step::Query)).unwrap();
        assert_eq!(console.screen_size(), (0, 0));

        let mut console = started();
        console.shutdown();
        assert_eq!(console.screen_size(), (0, 0));
    }

    #[test]
    fn test_cursor_visibility() {
        let mut console = started();
        console.hide_cursor();
        assert!(!console.backend().cursor().visible);

        console.show_cursor(true);
        assert_eq!(
            console.backend().cursor(),
            CursorInfo { size: INSERT_CURSOR_SIZE, visible: true }
        );

        console.show_cursor(false);
        assert_eq!(console.backend().cursor().size, OVERWRITE_CURSOR_SIZE);
    }

    #[test]
    fn test_cursor_query_failure_is_ignored() {
        let mut console = Console::startup(MemoryBackend::new(80, 25).failing(Step::Query)).unwrap();
        let before = console.backend().cursor();
        console.hide_cursor();
        assert_eq!(console.backend().cursor(), before);
    }

    #[test]
    fn test_drop_shuts_down() {
        let device = MemoryBackend::new(80, 25);
        let tracker = device.tracker();
        {
            let _console = Console::startup(device).unwrap();
            assert_eq!(tracker.open_handles(), 1);
        }
        assert_eq!(tracker.open_handles(), 0);
        assert_eq!(tracker.input_mode(), ConsoleMode::COOKED);
    }
}
