//! Cell and packed color attribute.

use bitflags::bitflags;

bitflags! {
    /// Packed foreground/background color attribute.
    ///
    /// Uses the console's native layout: low nibble is the foreground
    /// (blue, green, red, intensity), high nibble the background.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attr: u16 {
        const FG_BLUE      = 0x0001;
        const FG_GREEN     = 0x0002;
        const FG_RED       = 0x0004;
        const FG_INTENSITY = 0x0008;
        const BG_BLUE      = 0x0010;
        const BG_GREEN     = 0x0020;
        const BG_RED       = 0x0040;
        const BG_INTENSITY = 0x0080;

        const FG_YELLOW = Self::FG_RED.bits() | Self::FG_GREEN.bits();
        const FG_WHITE  = Self::FG_RED.bits() | Self::FG_GREEN.bits() | Self::FG_BLUE.bits();
        const BG_WHITE  = Self::BG_RED.bits() | Self::BG_GREEN.bits() | Self::BG_BLUE.bits();
    }
}

impl Attr {
    /// Foreground color index (0-15).
    pub fn foreground(self) -> u8 {
        (self.bits() & 0x0F) as u8
    }

    /// Background color index (0-15).
    pub fn background(self) -> u8 {
        ((self.bits() >> 4) & 0x0F) as u8
    }
}

/// One character position in a window buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attr: Attr,
}

impl Cell {
    pub const fn new(ch: char, attr: Attr) -> Self {
        Self { ch, attr }
    }

    /// A space in the given attribute
    pub const fn blank(attr: Attr) -> Self {
        Self { ch: ' ', attr }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Attr::FG_WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_nibbles() {
        let attr = Attr::FG_YELLOW | Attr::FG_INTENSITY | Attr::BG_BLUE;
        assert_eq!(attr.bits(), 0x1E);
        assert_eq!(attr.foreground(), 14);
        assert_eq!(attr.background(), 1);

        let attr = Attr::BG_WHITE;
        assert_eq!(attr.foreground(), 0);
        assert_eq!(attr.background(), 7);
    }

    #[test]
    fn test_blank_cell() {
        let cell = Cell::blank(Attr::BG_BLUE);
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.attr, Attr::BG_BLUE);
    }
}
