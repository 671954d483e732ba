#![warn(missing_docs)]
//! Identifiers and small protocol enumerations shared across the workspace.

pub mod bool_state;
pub mod frequency;
pub mod kind;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use bool_state::BoolState;
pub use frequency::BeamFrequency;
pub use kind::ObjectKind;

/// Identity of a simulated entity, stable for the entity's lifetime.
///
/// Assigned by the server; used as the merge key for object updates.
pub type ObjectId = i32;

/// Number of sides a visibility bitmask can describe.
pub const MAX_SIDES: u8 = 32;

/// Which end of the connection produced a packet.
///
/// Packets are keyed by origin because the same type code carries
/// different payload shapes in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Sent by a client to the server.
    Client,
    /// Sent by the server to a client.
    Server,
}

impl Origin {
    /// The opposite direction.
    pub const fn flip(self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
