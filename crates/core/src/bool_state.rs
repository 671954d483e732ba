//! Tri-state booleans.
//!
//! The server does not report every flag in every update, so a flag can be
//! true, false, or not yet observed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A boolean that may not have been reported yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoolState {
    /// Reported as true.
    True,
    /// Reported as false.
    False,
    /// Not reported.
    #[default]
    Unknown,
}

impl BoolState {
    /// Whether this state carries a value.
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Collapse to a plain boolean; `Unknown` counts as false.
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    /// The reported value, if any.
    pub const fn as_option(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }
}

impl From<bool> for BoolState {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl From<Option<bool>> for BoolState {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unknown, Self::from)
    }
}

impl fmt::Display for BoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::True => "true",
            Self::False => "false",
            Self::Unknown => "unknown",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(BoolState::from(true), BoolState::True);
        assert_eq!(BoolState::from(None), BoolState::Unknown);
        assert_eq!(BoolState::False.as_option(), Some(false));
        assert!(!BoolState::Unknown.is_known());
        assert!(!BoolState::Unknown.is_true());
        assert_eq!(BoolState::default(), BoolState::Unknown);
    }
}
