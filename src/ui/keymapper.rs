//! Key mapping for console input
//!
//! Reads key-down records from the console and converts their virtual key
//! codes into the portable `Key` model.

use crate::console::{vk, Backend, Console, ConsoleError, InputRecord, KeyRecord, Result};

/// Abstract key code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Tab,
    Backspace,
    Enter,
    Delete,
    Insert,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
    /// Any other key: the record's character in the legacy code page
    Char(u8),
}

/// Key mapper for converting key records to keys
pub struct KeyMapper;

impl KeyMapper {
    /// Map a key record. Keys without a named mapping yield their character.
    pub fn map(record: &KeyRecord) -> Key {
        match record.virtual_key {
            vk::ESCAPE => Key::Escape,
            vk::TAB => Key::Tab,
            vk::BACK => Key::Backspace,
            vk::RETURN => Key::Enter,
            vk::DELETE => Key::Delete,
            vk::INSERT => Key::Insert,
            vk::HOME => Key::Home,
            vk::END => Key::End,
            vk::UP => Key::Up,
            vk::DOWN => Key::Down,
            vk::LEFT => Key::Left,
            vk::RIGHT => Key::Right,
            _ => Key::Char(record.ch),
        }
    }
}

impl<B: Backend> Console<B> {
    /// Block until a key is pressed and return its record.
    ///
    /// Key releases and all non-key records are discarded.
    pub fn read_key_record(&mut self) -> Result<KeyRecord> {
        let input = self.input();
        loop {
            let record = self
                .backend_mut()
                .read_input(input)
                .map_err(ConsoleError::Read)?;
            if let Some(InputRecord::Key { key, down: true }) = record {
                return Ok(key);
            }
        }
    }

    /// Block until a key is pressed and return it as a `Key`
    pub fn read_key(&mut self) -> Result<Key> {
        let record = self.read_key_record()?;
        Ok(KeyMapper::map(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::memory::{MemoryBackend, Step};

    fn record(virtual_key: u16, ch: u8) -> KeyRecord {
        KeyRecord { virtual_key, ch }
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(KeyMapper::map(&record(vk::ESCAPE, 0x1B)), Key::Escape);
        assert_eq!(KeyMapper::map(&record(vk::TAB, b'\t')), Key::Tab);
        assert_eq!(KeyMapper::map(&record(vk::BACK, 0x08)), Key::Backspace);
        assert_eq!(KeyMapper::map(&record(vk::RETURN, b'\r')), Key::Enter);
        assert_eq!(KeyMapper::map(&record(vk::DELETE, 0)), Key::Delete);
        assert_eq!(KeyMapper::map(&record(vk::INSERT, 0)), Key::Insert);
        assert_eq!(KeyMapper::map(&record(vk::HOME, 0)), Key::Home);
        assert_eq!(KeyMapper::map(&record(vk::END, 0)), Key::End);
        assert_eq!(KeyMapper::map(&record(vk::UP, 0)), Key::Up);
        assert_eq!(KeyMapper::map(&record(vk::DOWN, 0)), Key::Down);
        assert_eq!(KeyMapper::map(&record(vk::LEFT, 0)), Key::Left);
        assert_eq!(KeyMapper::map(&record(vk::RIGHT, 0)), Key::Right);
    }

    #[test]
    fn test_unmapped_key_returns_character() {
        assert_eq!(KeyMapper::map(&record(0x41, b'a')), Key::Char(b'a'));
        assert_eq!(KeyMapper::map(&record(0xBC, b',')), Key::Char(b','));
        // Page Up has no named key
        assert_eq!(KeyMapper::map(&record(vk::PRIOR, 0)), Key::Char(0));
        assert_eq!(KeyMapper::map(&record(vk::F1, 0)), Key::Char(0));
    }

    #[test]
    fn test_read_key_skips_other_records() {
        let device = MemoryBackend::new(80, 25);
        device.push_record(InputRecord::Other);
        device.push_empty_read();
        device.push_record(InputRecord::Key {
            key: record(0x51, b'q'),
            down: false,
        });
        device.push_key(0x51, b'Q');
        device.push_key(vk::UP, 0);

        let mut console = Console::startup(device).unwrap();
        assert_eq!(console.read_key_record().unwrap(), record(0x51, b'Q'));
        assert_eq!(console.read_key().unwrap(), Key::Up);
    }

    #[test]
    fn test_read_error_is_reported() {
        let device = MemoryBackend::new(80, 25).failing(Step::Read);
        let mut console = Console::startup(device).unwrap();
        assert!(matches!(console.read_key(), Err(ConsoleError::Read(_))));
    }
}
