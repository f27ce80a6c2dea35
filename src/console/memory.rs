//! Headless in-memory console.
//!
//! Keeps a composited screen grid and a queue of input records, counts
//! open screen buffers, and can be told to fail any single device step.
//! Clones share the same device, so a clone kept aside can inspect the
//! state after the original has been moved into a `Console`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use super::backend::{Backend, ConsoleMode, CursorInfo, InputRecord, KeyRecord, Rect};
use crate::core::Cell;

/// Device step that can be made to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    InputHandle,
    CreateScreenBuffer,
    Activate,
    SetScreenMode,
    GetInputMode,
    SetInputMode,
    /// Screen size and cursor queries
    Query,
    Write,
    Read,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryHandle {
    Input,
    Screen(u32),
}

struct Device {
    width: u16,
    height: u16,
    screen: Vec<Cell>,
    input_mode: ConsoleMode,
    screen_mode: Option<ConsoleMode>,
    next_id: u32,
    open: Vec<u32>,
    active: Option<u32>,
    closes: usize,
    cursor: CursorInfo,
    cursor_position: (u16, u16),
    pending: VecDeque<Option<InputRecord>>,
    blits: Vec<Rect>,
    fail: Option<Step>,
}

#[derive(Clone)]
pub struct MemoryBackend {
    device: Rc<RefCell<Device>>,
}

impl MemoryBackend {
    pub fn new(width: u16, height: u16) -> Self {
        let device = Device {
            width,
            height,
            screen: vec![Cell::default(); width as usize * height as usize],
            input_mode: ConsoleMode::COOKED,
            screen_mode: None,
            next_id: 1,
            open: Vec::new(),
            active: None,
            closes: 0,
            cursor: CursorInfo::default(),
            cursor_position: (0, 0),
            pending: VecDeque::new(),
            blits: Vec::new(),
            fail: None,
        };
        Self {
            device: Rc::new(RefCell::new(device)),
        }
    }

    /// Make `step` fail every time it is attempted
    pub fn failing(self, step: Step) -> Self {
        self.device.borrow_mut().fail = Some(step);
        self
    }

    /// Another view of the same device
    pub fn tracker(&self) -> Self {
        self.clone()
    }

    /// Queue a key-down record
    pub fn push_key(&self, virtual_key: u16, ch: u8) {
        self.push_record(InputRecord::Key {
            key: KeyRecord { virtual_key, ch },
            down: true,
        });
    }

    pub fn push_record(&self, record: InputRecord) {
        self.device.borrow_mut().pending.push_back(Some(record));
    }

    /// Queue a read that returns no record
    pub fn push_empty_read(&self) {
        self.device.borrow_mut().pending.push_back(None);
    }

    pub fn open_handles(&self) -> usize {
        self.device.borrow().open.len()
    }

    pub fn closes(&self) -> usize {
        self.device.borrow().closes
    }

    /// Whether an open buffer of ours is the active one
    pub fn screen_active(&self) -> bool {
        let device = self.device.borrow();
        device.active.map_or(false, |id| device.open.contains(&id))
    }

    pub fn input_mode(&self) -> ConsoleMode {
        self.device.borrow().input_mode
    }

    pub fn screen_mode(&self) -> Option<ConsoleMode> {
        self.device.borrow().screen_mode
    }

    pub fn cursor(&self) -> CursorInfo {
        self.device.borrow().cursor
    }

    pub fn cursor_position(&self) -> (u16, u16) {
        self.device.borrow().cursor_position
    }

    /// Destination rectangles of every block write so far
    pub fn blits(&self) -> Vec<Rect> {
        self.device.borrow().blits.clone()
    }

    pub fn screen_cell(&self, x: u16, y: u16) -> Cell {
        let device = self.device.borrow();
        device.screen[y as usize * device.width as usize + x as usize]
    }

    /// Glyphs of one screen row
    pub fn screen_text(&self, y: u16) -> String {
        let device = self.device.borrow();
        let start = y as usize * device.width as usize;
        device.screen[start..start + device.width as usize]
            .iter()
            .map(|c| c.ch)
            .collect()
    }

    fn check(&self, step: Step) -> io::Result<()> {
        if self.device.borrow().fail == Some(step) {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected failure: {:?}", step),
            ))
        } else {
            Ok(())
        }
    }
}

impl Backend for MemoryBackend {
    type Handle = MemoryHandle;

    fn input_handle(&mut self) -> io::Result<MemoryHandle> {
        self.check(Step::InputHandle)?;
        Ok(MemoryHandle::Input)
    }

    fn create_screen_buffer(&mut self) -> io::Result<MemoryHandle> {
        self.check(Step::CreateScreenBuffer)?;
        let mut device = self.device.borrow_mut();
        let id = device.next_id;
        device.next_id += 1;
        device.open.push(id);
        Ok(MemoryHandle::Screen(id))
    }

    fn activate_screen_buffer(&mut self, screen: MemoryHandle) -> io::Result<()> {
        self.check(Step::Activate)?;
        match screen {
            MemoryHandle::Screen(id) => {
                self.device.borrow_mut().active = Some(id);
                Ok(())
            }
            MemoryHandle::Input => Err(io::ErrorKind::InvalidInput.into()),
        }
    }

    fn close_screen_buffer(&mut self, screen: MemoryHandle) {
        if let MemoryHandle::Screen(id) = screen {
            let mut device = self.device.borrow_mut();
            device.open.retain(|&open| open != id);
            if device.active == Some(id) {
                device.active = None;
            }
            device.closes += 1;
        }
    }

    fn mode(&mut self, handle: MemoryHandle) -> io::Result<ConsoleMode> {
        self.check(Step::GetInputMode)?;
        let device = self.device.borrow();
        match handle {
            MemoryHandle::Input => Ok(device.input_mode),
            MemoryHandle::Screen(_) => Ok(device.screen_mode.unwrap_or(ConsoleMode::COOKED)),
        }
    }

    fn set_mode(&mut self, handle: MemoryHandle, mode: ConsoleMode) -> io::Result<()> {
        match handle {
            MemoryHandle::Input => {
                self.check(Step::SetInputMode)?;
                self.device.borrow_mut().input_mode = mode;
            }
            MemoryHandle::Screen(_) => {
                self.check(Step::SetScreenMode)?;
                self.device.borrow_mut().screen_mode = Some(mode);
            }
        }
        Ok(())
    }

    fn screen_size(&self, _screen: MemoryHandle) -> io::Result<(u16, u16)> {
        self.check(Step::Query)?;
        let device = self.device.borrow();
        Ok((device.width, device.height))
    }

    fn cursor_info(&self, _screen: MemoryHandle) -> io::Result<CursorInfo> {
        self.check(Step::Query)?;
        Ok(self.device.borrow().cursor)
    }

    fn set_cursor_info(&mut self, _screen: MemoryHandle, info: CursorInfo) -> io::Result<()> {
        self.device.borrow_mut().cursor = info;
        Ok(())
    }

    fn set_cursor_position(&mut self, _screen: MemoryHandle, x: u16, y: u16) -> io::Result<()> {
        self.check(Step::Write)?;
        self.device.borrow_mut().cursor_position = (x, y);
        Ok(())
    }

    fn write_output(
        &mut self,
        _screen: MemoryHandle,
        cells: &[Cell],
        size: (u16, u16),
        offset: (u16, u16),
        region: Rect,
    ) -> io::Result<()> {
        self.check(Step::Write)?;
        let mut device = self.device.borrow_mut();
        let (screen_w, screen_h) = (device.width, device.height);
        for row in region.top..=region.bottom.min(screen_h.saturating_sub(1)) {
            let src_row = (offset.1 + row - region.top) as usize;
            if src_row >= size.1 as usize {
                break;
            }
            for col in region.left..=region.right.min(screen_w.saturating_sub(1)) {
                let src_col = (offset.0 + col - region.left) as usize;
                if src_col >= size.0 as usize {
                    break;
                }
                let dst = row as usize * screen_w as usize + col as usize;
                device.screen[dst] = cells[src_row * size.0 as usize + src_col];
            }
        }
        device.blits.push(region);
        Ok(())
    }

    fn read_input(&mut self, _input: MemoryHandle) -> io::Result<Option<InputRecord>> {
        self.check(Step::Read)?;
        self.device
            .borrow_mut()
            .pending
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input queue is empty"))
    }
}
