//! Tagged union over every record shape.
//!
//! Code that needs to know "is this a ship" asks through the capability
//! accessors ([`ArtemisObject::as_ship`] and friends) instead of matching on
//! concrete kinds.

use crate::object::{BaseObject, Fields, Props, Shielded, Station};
use crate::ship::{NpcShip, PlayerShip, Ship};
use crate::WorldError;
use artemis_core::{ObjectId, ObjectKind};

/// A world object of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtemisObject {
    /// A crewed vessel.
    Player(PlayerShip),
    /// A computer-controlled vessel.
    Npc(NpcShip),
    /// A space station.
    Station(Station),
    /// Any kind without shields (mines, anomalies, nebulae, ...).
    Other(BaseObject),
}

impl ArtemisObject {
    /// Create an empty record with the shape `kind` requires.
    pub fn new(kind: ObjectKind, id: ObjectId) -> Self {
        match kind {
            ObjectKind::PlayerShip => Self::Player(PlayerShip::new(id)),
            ObjectKind::NpcShip => Self::Npc(NpcShip::new(id)),
            ObjectKind::Base => Self::Station(Station::new(id)),
            other => Self::Other(BaseObject::new(id, other)),
        }
    }

    /// Object identity.
    pub fn id(&self) -> ObjectId {
        self.base().id()
    }

    /// Object kind.
    pub fn kind(&self) -> ObjectKind {
        self.base().kind()
    }

    /// The base layer every record carries.
    pub fn base(&self) -> &BaseObject {
        match self {
            Self::Player(p) => &p.ship.shielded.base,
            Self::Npc(n) => &n.ship.shielded.base,
            Self::Station(s) => &s.shielded.base,
            Self::Other(o) => o,
        }
    }

    /// Mutable base layer.
    pub fn base_mut(&mut self) -> &mut BaseObject {
        match self {
            Self::Player(p) => &mut p.ship.shielded.base,
            Self::Npc(n) => &mut n.ship.shielded.base,
            Self::Station(s) => &mut s.shielded.base,
            Self::Other(o) => o,
        }
    }

    /// The shielded layer, if this kind has shields.
    pub fn as_shielded(&self) -> Option<&Shielded> {
        match self {
            Self::Player(p) => Some(&p.ship.shielded),
            Self::Npc(n) => Some(&n.ship.shielded),
            Self::Station(s) => Some(&s.shielded),
            Self::Other(_) => None,
        }
    }

    /// Mutable shielded layer.
    pub fn as_shielded_mut(&mut self) -> Option<&mut Shielded> {
        match self {
            Self::Player(p) => Some(&mut p.ship.shielded),
            Self::Npc(n) => Some(&mut n.ship.shielded),
            Self::Station(s) => Some(&mut s.shielded),
            Self::Other(_) => None,
        }
    }

    /// The ship layer, if this is a ship.
    pub fn as_ship(&self) -> Option<&Ship> {
        match self {
            Self::Player(p) => Some(&p.ship),
            Self::Npc(n) => Some(&n.ship),
            _ => None,
        }
    }

    /// Mutable ship layer.
    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match self {
            Self::Player(p) => Some(&mut p.ship),
            Self::Npc(n) => Some(&mut n.ship),
            _ => None,
        }
    }

    /// The player ship record, if this is one.
    pub fn as_player(&self) -> Option<&PlayerShip> {
        match self {
            Self::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable player ship record.
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerShip> {
        match self {
            Self::Player(p) => Some(p),
            _ => None,
        }
    }

    /// The NPC ship record, if this is one.
    pub fn as_npc(&self) -> Option<&NpcShip> {
        match self {
            Self::Npc(n) => Some(n),
            _ => None,
        }
    }

    /// Mutable NPC ship record.
    pub fn as_npc_mut(&mut self) -> Option<&mut NpcShip> {
        match self {
            Self::Npc(n) => Some(n),
            _ => None,
        }
    }

    /// Fold `update` into this record.
    ///
    /// The update must describe the same object: differing ids or kinds are
    /// schema errors and leave `self` untouched.
    pub fn merge_from(&mut self, update: &ArtemisObject) -> Result<(), WorldError> {
        if self.id() != update.id() {
            return Err(WorldError::IdMismatch {
                current: self.id(),
                update: update.id(),
            });
        }
        match (self, update) {
            (Self::Player(cur), Self::Player(upd)) => cur.merge_from(upd),
            (Self::Npc(cur), Self::Npc(upd)) => cur.merge_from(upd),
            (Self::Station(cur), Self::Station(upd)) => cur.merge_from(upd),
            (Self::Other(cur), Self::Other(upd)) if cur.kind() == upd.kind() => {
                cur.merge_from(upd)
            }
            (cur, upd) => {
                return Err(WorldError::KindMismatch {
                    id: upd.id(),
                    stored: cur.kind(),
                    update: upd.kind(),
                })
            }
        }
        Ok(())
    }

    /// Snapshot form of [`ArtemisObject::merge_from`].
    pub fn merged(mut self, update: &ArtemisObject) -> Result<Self, WorldError> {
        self.merge_from(update)?;
        Ok(self)
    }

    /// Whether any field in the full chain is specified.
    pub fn has_data(&self) -> bool {
        match self {
            Self::Player(p) => p.has_data(),
            Self::Npc(n) => n.has_data(),
            Self::Station(s) => s.has_data(),
            Self::Other(o) => o.has_data(),
        }
    }

    /// Specified fields as label/value pairs.
    pub fn props(&self) -> Props {
        let mut props = Props::new();
        match self {
            Self::Player(p) => p.append_props(&mut props),
            Self::Npc(n) => n.append_props(&mut props),
            Self::Station(s) => s.append_props(&mut props),
            Self::Other(o) => o.append_props(&mut props),
        }
        props
    }
}

impl From<PlayerShip> for ArtemisObject {
    fn from(value: PlayerShip) -> Self {
        Self::Player(value)
    }
}

impl From<NpcShip> for ArtemisObject {
    fn from(value: NpcShip) -> Self {
        Self::Npc(value)
    }
}

impl From<Station> for ArtemisObject {
    fn from(value: Station) -> Self {
        Self::Station(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_picks_shape_from_kind() {
        assert!(ArtemisObject::new(ObjectKind::PlayerShip, 1).as_player().is_some());
        assert!(ArtemisObject::new(ObjectKind::NpcShip, 1).as_ship().is_some());
        let station = ArtemisObject::new(ObjectKind::Base, 1);
        assert!(station.as_shielded().is_some());
        assert!(station.as_ship().is_none());
        let mine = ArtemisObject::new(ObjectKind::Mine, 1);
        assert!(mine.as_shielded().is_none());
        assert_eq!(mine.kind(), ObjectKind::Mine);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut stored = ArtemisObject::new(ObjectKind::NpcShip, 5);
        let update = ArtemisObject::new(ObjectKind::Base, 5);
        let err = stored.merge_from(&update).unwrap_err();
        assert!(matches!(
            err,
            WorldError::KindMismatch {
                id: 5,
                stored: ObjectKind::NpcShip,
                update: ObjectKind::Base
            }
        ));
    }

    #[test]
    fn other_kinds_must_match_too() {
        let mut stored = ArtemisObject::new(ObjectKind::Mine, 5);
        let update = ArtemisObject::new(ObjectKind::Asteroid, 5);
        assert!(stored.merge_from(&update).is_err());
    }

    #[test]
    fn id_mismatch_is_rejected() {
        let mut stored = ArtemisObject::new(ObjectKind::Mine, 5);
        let update = ArtemisObject::new(ObjectKind::Mine, 6);
        assert!(matches!(
            stored.merge_from(&update),
            Err(WorldError::IdMismatch { current: 5, update: 6 })
        ));
    }

    #[test]
    fn base_mut_reaches_every_shape() {
        for kind in [ObjectKind::PlayerShip, ObjectKind::Base, ObjectKind::Drone] {
            let mut obj = ArtemisObject::new(kind, 1);
            obj.base_mut().x = 4.0;
            assert!(obj.has_data());
            assert_eq!(obj.props()["X"], "4");
        }
    }
}
