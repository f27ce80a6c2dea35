//! Static cell data: the code page table, packed attributes and styles.

pub mod cell;
pub mod codepage;
pub mod style;

pub use cell::{Attr, Cell};
pub use style::Style;
