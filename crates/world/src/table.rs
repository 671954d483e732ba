//! Canonical object table.
//!
//! Folds a stream of partial object records into current state. The table
//! is the single owner of merged state; callers hand it updates and read
//! records back by id. There is no internal locking: the table is mutated
//! through `&mut self`, and embedders that need concurrent readers wrap it
//! themselves.

use crate::record::ArtemisObject;
use crate::ship::{NpcShip, PlayerShip};
use crate::WorldError;
use artemis_core::{ObjectId, ObjectKind};
use std::collections::BTreeMap;
use tracing::trace;

/// What applying one update did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First sighting of this id; the update became the stored record.
    Created,
    /// Specified fields were folded into an existing record.
    Updated,
    /// The update carried no data; the stored record is untouched.
    Unchanged,
}

impl MergeOutcome {
    /// Whether the table changed.
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Merged state of every known world object.
///
/// Uses a BTreeMap so iteration order is by id and stable across runs.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: BTreeMap<ObjectId, ArtemisObject>,
}

impl ObjectTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one update, creating the record on first sighting.
    pub fn apply(&mut self, update: ArtemisObject) -> Result<MergeOutcome, WorldError> {
        let id = update.id();
        match self.objects.get_mut(&id) {
            Some(current) => {
                if !update.has_data() {
                    // Still validate the shape so schema errors surface.
                    if current.kind() != update.kind() {
                        return Err(WorldError::KindMismatch {
                            id,
                            stored: current.kind(),
                            update: update.kind(),
                        });
                    }
                    return Ok(MergeOutcome::Unchanged);
                }
                current.merge_from(&update)?;
                trace!(id, kind = %update.kind(), "merged object update");
                Ok(MergeOutcome::Updated)
            }
            None => {
                trace!(id, kind = %update.kind(), "created object");
                self.objects.insert(id, update);
                Ok(MergeOutcome::Created)
            }
        }
    }

    /// Merge a batch of updates in order, stopping at the first error.
    ///
    /// Returns the number of updates that changed the table.
    pub fn apply_all<I>(&mut self, updates: I) -> Result<usize, WorldError>
    where
        I: IntoIterator<Item = ArtemisObject>,
    {
        let mut changed = 0;
        for update in updates {
            if self.apply(update)?.changed() {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Look up a record by id.
    pub fn get(&self, id: ObjectId) -> Option<&ArtemisObject> {
        self.objects.get(&id)
    }

    /// Whether `id` has been observed.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Drop a record, e.g. on an explicit delete notification.
    pub fn remove(&mut self, id: ObjectId) -> Option<ArtemisObject> {
        let removed = self.objects.remove(&id);
        if removed.is_some() {
            trace!(id, "removed object");
        }
        removed
    }

    /// Number of known objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are known.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ArtemisObject> {
        self.objects.values()
    }

    /// Records of one kind in id order.
    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &ArtemisObject> {
        self.objects.values().filter(move |obj| obj.kind() == kind)
    }

    /// Player ships in id order.
    pub fn player_ships(&self) -> impl Iterator<Item = &PlayerShip> {
        self.objects.values().filter_map(ArtemisObject::as_player)
    }

    /// NPC ships in id order.
    pub fn npc_ships(&self) -> impl Iterator<Item = &NpcShip> {
        self.objects.values().filter_map(ArtemisObject::as_npc)
    }

    /// The player ship in a given bridge slot, if known.
    pub fn player_ship_by_index(&self, index: i8) -> Option<&PlayerShip> {
        self.player_ships().find(|ship| ship.ship_index() == index)
    }

    /// Forget everything, e.g. when a new game starts.
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
