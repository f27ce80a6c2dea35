//! Semantic styles and their fixed color attributes.

use super::cell::Attr;

/// Semantic drawing role.
///
/// Callers pick colors only through this enumeration; the attribute each
/// role maps to is fixed for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    Background,
    PromptWin,
    PromptKey,
    PromptBorder,
    CurrentMode,
    FileName,
    FileWin,
    FileDiff,
    FileEdit,
}

const WHITE_ON_BLUE: Attr = Attr::FG_WHITE.union(Attr::BG_BLUE);
const BRIGHT_WHITE_ON_BLUE: Attr = WHITE_ON_BLUE.union(Attr::FG_INTENSITY);
const BLACK_ON_WHITE: Attr = Attr::BG_WHITE;

/// Indexed by `Style as usize`.
const STYLE_ATTRS: [Attr; Style::COUNT] = [
    WHITE_ON_BLUE,                                                  // Background
    WHITE_ON_BLUE,                                                  // PromptWin
    BRIGHT_WHITE_ON_BLUE,                                           // PromptKey
    BRIGHT_WHITE_ON_BLUE,                                           // PromptBorder
    BLACK_ON_WHITE,                                                 // CurrentMode
    BLACK_ON_WHITE,                                                 // FileName
    WHITE_ON_BLUE,                                                  // FileWin
    Attr::FG_RED.union(Attr::BG_BLUE).union(Attr::FG_INTENSITY),    // FileDiff
    Attr::FG_YELLOW.union(Attr::BG_BLUE).union(Attr::FG_INTENSITY), // FileEdit
];

impl Style {
    pub const COUNT: usize = 9;

    pub const ALL: [Style; Style::COUNT] = [
        Style::Background,
        Style::PromptWin,
        Style::PromptKey,
        Style::PromptBorder,
        Style::CurrentMode,
        Style::FileName,
        Style::FileWin,
        Style::FileDiff,
        Style::FileEdit,
    ];

    /// Color attribute for this style
    #[inline]
    pub fn attr(self) -> Attr {
        STYLE_ATTRS[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_table() {
        assert_eq!(Style::Background.attr().bits(), 0x17);
        assert_eq!(Style::PromptKey.attr().bits(), 0x1F);
        assert_eq!(Style::PromptBorder.attr().bits(), 0x1F);
        assert_eq!(Style::CurrentMode.attr().bits(), 0x70);
        assert_eq!(Style::FileName.attr().bits(), 0x70);
        assert_eq!(Style::FileWin.attr().bits(), 0x17);
        assert_eq!(Style::FileDiff.attr().bits(), 0x1C);
        assert_eq!(Style::FileEdit.attr().bits(), 0x1E);
    }

    #[test]
    fn test_all_matches_discriminants() {
        for (i, style) in Style::ALL.iter().enumerate() {
            assert_eq!(*style as usize, i);
        }
    }
}
