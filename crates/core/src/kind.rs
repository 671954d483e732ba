//! World object kinds.
//!
//! The kind byte prefixes every object record in an update stream and in
//! delete notifications. Value 0 is reserved as the end-of-objects marker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a simulated world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectKind {
    /// A crewed player vessel.
    PlayerShip = 1,
    /// A computer-controlled vessel.
    NpcShip = 5,
    /// A space station.
    Base = 6,
    /// A mine.
    Mine = 7,
    /// A collectable anomaly.
    Anomaly = 8,
    /// A nebula cloud.
    Nebula = 10,
    /// A torpedo in flight.
    Torpedo = 11,
    /// A black hole.
    BlackHole = 12,
    /// An asteroid.
    Asteroid = 13,
    /// A scripted mesh.
    GenericMesh = 14,
    /// A space creature.
    Creature = 15,
    /// A fighter drone.
    Drone = 16,
}

impl ObjectKind {
    /// Wire value that terminates an object list.
    pub const END_OF_OBJECTS: u8 = 0;

    /// Convert to the wire byte.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Try to convert from the wire byte.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::PlayerShip),
            5 => Some(Self::NpcShip),
            6 => Some(Self::Base),
            7 => Some(Self::Mine),
            8 => Some(Self::Anomaly),
            10 => Some(Self::Nebula),
            11 => Some(Self::Torpedo),
            12 => Some(Self::BlackHole),
            13 => Some(Self::Asteroid),
            14 => Some(Self::GenericMesh),
            15 => Some(Self::Creature),
            16 => Some(Self::Drone),
            _ => None,
        }
    }

    /// Whether records of this kind carry shield fields.
    pub const fn is_shielded(self) -> bool {
        matches!(self, Self::PlayerShip | Self::NpcShip | Self::Base)
    }

    /// Whether records of this kind carry ship fields.
    pub const fn is_ship(self) -> bool {
        matches!(self, Self::PlayerShip | Self::NpcShip)
    }

    /// Canonical string key used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayerShip => "player_ship",
            Self::NpcShip => "npc_ship",
            Self::Base => "base",
            Self::Mine => "mine",
            Self::Anomaly => "anomaly",
            Self::Nebula => "nebula",
            Self::Torpedo => "torpedo",
            Self::BlackHole => "black_hole",
            Self::Asteroid => "asteroid",
            Self::GenericMesh => "generic_mesh",
            Self::Creature => "creature",
            Self::Drone => "drone",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
