//! Player color

use std::fmt;

/// The two sides of the board, each owning one clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// Both colors, in series-index order
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// The other side
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Index into per-color storage (White = 0, Black = 1)
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Color::index`]
    pub fn from_index(index: usize) -> Option<Color> {
        match index {
            0 => Some(Color::White),
            1 => Some(Color::Black),
            _ => None,
        }
    }

    /// The mover of a 1-based ply number (odd plies are White's)
    #[inline]
    pub fn mover_of_ply(ply: usize) -> Color {
        if ply % 2 == 1 {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}
