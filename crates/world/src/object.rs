//! Base and shielded object records.
//!
//! Records compose rather than inherit: each more specific record embeds
//! its base by value, and every [`Fields`] implementation merges the
//! embedded base before its own fields.

use crate::sentinel::{field_eq, merge_field, Sentinel};
use artemis_core::{ObjectId, ObjectKind};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Human-readable field dump, keyed by label, unspecified fields omitted.
pub type Props = BTreeMap<String, String>;

/// Field-level behaviour shared by every record layer.
pub trait Fields {
    /// Fold `update` into `self`: specified fields overwrite, unspecified
    /// fields leave the current value untouched.
    fn merge_from(&mut self, update: &Self);

    /// Whether any field in the full chain is specified.
    fn has_data(&self) -> bool;

    /// Append specified fields to `props`.
    fn append_props(&self, props: &mut Props);

    /// Snapshot form of [`Fields::merge_from`].
    fn merged(mut self, update: &Self) -> Self
    where
        Self: Sized,
    {
        self.merge_from(update);
        self
    }
}

pub(crate) fn put_prop<T: Sentinel + Display>(props: &mut Props, label: impl Into<String>, value: &T) {
    if value.is_specified() {
        props.insert(label.into(), value.to_string());
    }
}

/// Fields every world object carries.
#[derive(Debug, Clone)]
pub struct BaseObject {
    id: ObjectId,
    kind: ObjectKind,
    /// Display name. Unspecified: `None`.
    pub name: Option<String>,
    /// X coordinate. Unspecified: NaN.
    pub x: f32,
    /// Y coordinate. Unspecified: NaN.
    pub y: f32,
    /// Z coordinate. Unspecified: NaN.
    pub z: f32,
}

impl BaseObject {
    /// Create a record with every field unspecified. Outside this crate,
    /// records are built through [`ArtemisObject::new`](crate::ArtemisObject::new)
    /// so the shape always matches the kind.
    pub(crate) fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            name: None,
            x: f32::UNSPECIFIED,
            y: f32::UNSPECIFIED,
            z: f32::UNSPECIFIED,
        }
    }

    /// Object identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Object kind.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Position as `(x, y, z)` if all three coordinates are known.
    pub fn position(&self) -> Option<(f32, f32, f32)> {
        (self.x.is_specified() && self.y.is_specified() && self.z.is_specified())
            .then_some((self.x, self.y, self.z))
    }
}

impl Fields for BaseObject {
    fn merge_from(&mut self, update: &Self) {
        merge_field(&mut self.name, &update.name);
        merge_field(&mut self.x, &update.x);
        merge_field(&mut self.y, &update.y);
        merge_field(&mut self.z, &update.z);
    }

    fn has_data(&self) -> bool {
        self.name.is_specified()
            || self.x.is_specified()
            || self.y.is_specified()
            || self.z.is_specified()
    }

    fn append_props(&self, props: &mut Props) {
        if let Some(name) = &self.name {
            props.insert("Name".into(), name.clone());
        }
        put_prop(props, "X", &self.x);
        put_prop(props, "Y", &self.y);
        put_prop(props, "Z", &self.z);
    }
}

impl PartialEq for BaseObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.name == other.name
            && field_eq(&self.x, &other.x)
            && field_eq(&self.y, &other.y)
            && field_eq(&self.z, &other.z)
    }
}

/// An object with fore and aft shields.
#[derive(Debug, Clone)]
pub struct Shielded {
    /// Embedded base record.
    pub base: BaseObject,
    /// Current forward shield strength. Unspecified: NaN.
    pub shields_front: f32,
    /// Current aft shield strength. Unspecified: NaN.
    pub shields_rear: f32,
}

impl Shielded {
    pub(crate) fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            base: BaseObject::new(id, kind),
            shields_front: f32::UNSPECIFIED,
            shields_rear: f32::UNSPECIFIED,
        }
    }
}

impl Fields for Shielded {
    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_field(&mut self.shields_front, &update.shields_front);
        merge_field(&mut self.shields_rear, &update.shields_rear);
    }

    fn has_data(&self) -> bool {
        self.base.has_data()
            || self.shields_front.is_specified()
            || self.shields_rear.is_specified()
    }

    fn append_props(&self, props: &mut Props) {
        self.base.append_props(props);
        put_prop(props, "Shields: fore", &self.shields_front);
        put_prop(props, "Shields: aft", &self.shields_rear);
    }
}

impl PartialEq for Shielded {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && field_eq(&self.shields_front, &other.shields_front)
            && field_eq(&self.shields_rear, &other.shields_rear)
    }
}

/// A space station.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Embedded shielded record.
    pub shielded: Shielded,
}

impl Station {
    /// Create a station with every field unspecified.
    pub fn new(id: ObjectId) -> Self {
        Self {
            shielded: Shielded::new(id, ObjectKind::Base),
        }
    }
}

impl Fields for Station {
    fn merge_from(&mut self, update: &Self) {
        self.shielded.merge_from(&update.shielded);
    }

    fn has_data(&self) -> bool {
        self.shielded.has_data()
    }

    fn append_props(&self, props: &mut Props) {
        self.shielded.append_props(props);
    }
}
