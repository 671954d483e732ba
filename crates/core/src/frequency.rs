//! Beam frequencies.

use serde::{Deserialize, Serialize};

/// The five beam frequencies shields can be tuned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BeamFrequency {
    /// Frequency A.
    A = 0,
    /// Frequency B.
    B = 1,
    /// Frequency C.
    C = 2,
    /// Frequency D.
    D = 3,
    /// Frequency E.
    E = 4,
}

impl BeamFrequency {
    /// Number of frequencies.
    pub const COUNT: usize = 5;

    /// All frequencies in index order.
    pub const ALL: [Self; Self::COUNT] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Array index for per-frequency tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Frequency for a table index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            3 => Some(Self::D),
            4 => Some(Self::E),
            _ => None,
        }
    }

    /// Single-letter label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}
