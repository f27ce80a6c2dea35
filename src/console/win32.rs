//! Win32 console backend
//!
//! Drives the real console through the `windows` crate: an alternate
//! text-mode screen buffer for output and the standard input handle for
//! key records.

use std::io;

use tracing::debug;
use windows::Win32::Foundation::{CloseHandle, BOOL, HANDLE};
use windows::Win32::System::Console::{
    CreateConsoleScreenBuffer, GetConsoleCursorInfo, GetConsoleMode, GetConsoleScreenBufferInfo,
    GetStdHandle, ReadConsoleInputW, SetConsoleActiveScreenBuffer, SetConsoleCursorInfo,
    SetConsoleCursorPosition, SetConsoleMode, WriteConsoleOutputW, CHAR_INFO, CHAR_INFO_0,
    CONSOLE_CURSOR_INFO, CONSOLE_MODE, CONSOLE_SCREEN_BUFFER_INFO, COORD, INPUT_RECORD,
    SMALL_RECT, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

use super::backend::{
    Backend, ConsoleMode, CursorInfo, DeviceClaim, InputRecord, KeyRecord, Rect, Result,
};
use crate::core::{codepage, Cell};

const GENERIC_READ: u32 = 0x8000_0000;
const GENERIC_WRITE: u32 = 0x4000_0000;
const CONSOLE_TEXTMODE_BUFFER: u32 = 1;
const KEY_EVENT: u16 = 0x0001;

const FACILITY_WIN32: i32 = 7;

/// HRESULT_FROM_WIN32 values carry the OS error in the low word
fn api_error(e: windows::core::Error) -> io::Error {
    let code = e.code().0;
    if code < 0 && (code >> 16) & 0x1FFF == FACILITY_WIN32 {
        io::Error::from_raw_os_error(code & 0xFFFF)
    } else {
        io::Error::new(io::ErrorKind::Other, e)
    }
}

/// Real Win32 console
pub struct Win32Backend {
    /// Screen buffer that was active before ours, re-activated on close
    original_output: Option<HANDLE>,
    _claim: DeviceClaim,
}

impl Win32Backend {
    /// Claim the process console
    pub fn new() -> Result<Self> {
        let claim = DeviceClaim::acquire()?;
        let original_output = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) }
            .ok()
            .filter(|h| !h.is_invalid());
        Ok(Self {
            original_output,
            _claim: claim,
        })
    }
}

impl Backend for Win32Backend {
    type Handle = HANDLE;

    fn input_handle(&mut self) -> io::Result<HANDLE> {
        let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) }.map_err(api_error)?;
        if handle.is_invalid() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no console input"));
        }
        Ok(handle)
    }

    fn create_screen_buffer(&mut self) -> io::Result<HANDLE> {
        unsafe {
            CreateConsoleScreenBuffer(
                GENERIC_READ | GENERIC_WRITE,
                0, // no sharing
                None,
                CONSOLE_TEXTMODE_BUFFER,
                None,
            )
        }
        .map_err(api_error)
    }

    fn activate_screen_buffer(&mut self, screen: HANDLE) -> io::Result<()> {
        unsafe { SetConsoleActiveScreenBuffer(screen) }.map_err(api_error)
    }

    fn close_screen_buffer(&mut self, screen: HANDLE) {
        unsafe {
            if let Some(original) = self.original_output {
                if let Err(e) = SetConsoleActiveScreenBuffer(original) {
                    debug!("Failed to reactivate original screen buffer: {}", e);
                }
            }
            if let Err(e) = CloseHandle(screen) {
                debug!("Failed to close screen buffer: {}", e);
            }
        }
    }

    fn mode(&mut self, handle: HANDLE) -> io::Result<ConsoleMode> {
        let mut mode = CONSOLE_MODE(0);
        unsafe { GetConsoleMode(handle, &mut mode) }.map_err(api_error)?;
        Ok(ConsoleMode(mode.0))
    }

    fn set_mode(&mut self, handle: HANDLE, mode: ConsoleMode) -> io::Result<()> {
        unsafe { SetConsoleMode(handle, CONSOLE_MODE(mode.0)) }.map_err(api_error)
    }

    fn screen_size(&self, screen: HANDLE) -> io::Result<(u16, u16)> {
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        unsafe { GetConsoleScreenBufferInfo(screen, &mut info) }.map_err(api_error)?;
        Ok((info.dwSize.X.max(0) as u16, info.dwSize.Y.max(0) as u16))
    }

    fn cursor_info(&self, screen: HANDLE) -> io::Result<CursorInfo> {
        let mut info = CONSOLE_CURSOR_INFO::default();
        unsafe { GetConsoleCursorInfo(screen, &mut info) }.map_err(api_error)?;
        Ok(CursorInfo {
            size: info.dwSize,
            visible: info.bVisible.as_bool(),
        })
    }

    fn set_cursor_info(&mut self, screen: HANDLE, info: CursorInfo) -> io::Result<()> {
        let info = CONSOLE_CURSOR_INFO {
            dwSize: info.size,
            bVisible: BOOL::from(info.visible),
        };
        unsafe { SetConsoleCursorInfo(screen, &info) }.map_err(api_error)
    }

    fn set_cursor_position(&mut self, screen: HANDLE, x: u16, y: u16) -> io::Result<()> {
        let pos = COORD {
            X: x as i16,
            Y: y as i16,
        };
        unsafe { SetConsoleCursorPosition(screen, pos) }.map_err(api_error)
    }

    fn write_output(
        &mut self,
        screen: HANDLE,
        cells: &[Cell],
        size: (u16, u16),
        offset: (u16, u16),
        region: Rect,
    ) -> io::Result<()> {
        let data: Vec<CHAR_INFO> = cells
            .iter()
            .map(|cell| CHAR_INFO {
                Char: CHAR_INFO_0 {
                    UnicodeChar: cell.ch as u32 as u16,
                },
                Attributes: cell.attr.bits(),
            })
            .collect();
        let mut rect = SMALL_RECT {
            Left: region.left as i16,
            Top: region.top as i16,
            Right: region.right as i16,
            Bottom: region.bottom as i16,
        };
        unsafe {
            WriteConsoleOutputW(
                screen,
                data.as_ptr(),
                COORD {
                    X: size.0 as i16,
                    Y: size.1 as i16,
                },
                COORD {
                    X: offset.0 as i16,
                    Y: offset.1 as i16,
                },
                &mut rect,
            )
        }
        .map_err(api_error)
    }

    fn read_input(&mut self, input: HANDLE) -> io::Result<Option<InputRecord>> {
        let mut records = [INPUT_RECORD::default()];
        let mut count = 0u32;
        unsafe { ReadConsoleInputW(input, &mut records, &mut count) }.map_err(api_error)?;
        if count == 0 {
            return Ok(None);
        }

        let record = &records[0];
        if record.EventType != KEY_EVENT {
            return Ok(Some(InputRecord::Other));
        }
        let event = unsafe { record.Event.KeyEvent };
        let unicode = unsafe { event.uChar.UnicodeChar };
        let ch = char::from_u32(unicode as u32)
            .and_then(codepage::encode)
            .unwrap_or(0);
        Ok(Some(InputRecord::Key {
            key: KeyRecord {
                virtual_key: event.wVirtualKeyCode,
                ch,
            },
            down: event.bKeyDown.as_bool(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::core::HRESULT;

    #[test]
    fn test_win32_error_keeps_os_code() {
        // HRESULT_FROM_WIN32(ERROR_ACCESS_DENIED)
        let error = api_error(windows::core::Error::from(HRESULT(0x8007_0005_u32 as i32)));
        assert_eq!(error.raw_os_error(), Some(5));
    }

    #[test]
    fn test_other_facility_is_not_an_os_code() {
        // E_FAIL
        let error = api_error(windows::core::Error::from(HRESULT(0x8000_4005_u32 as i32)));
        assert_eq!(error.raw_os_error(), None);
        assert_eq!(error.kind(), io::ErrorKind::Other);
    }
}
