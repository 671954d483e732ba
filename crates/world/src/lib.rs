#![warn(missing_docs)]
//! World object model: partially-specified records and the merge table that
//! accumulates them.

pub mod object;
pub mod record;
pub mod sentinel;
pub mod ship;
pub mod table;

use artemis_core::{ObjectId, ObjectKind};

pub use object::{BaseObject, Fields, Props, Shielded, Station};
pub use record::ArtemisObject;
pub use sentinel::{merge_field, Sentinel};
pub use ship::{NpcShip, PlayerShip, Ship, MAX_SHIP_INDEX, MAX_SIDE, MAX_WARP};
pub use table::{MergeOutcome, ObjectTable};

/// Errors raised by the world model.
///
/// None of these occur in a well-formed stream; they indicate a schema or
/// programming error on the producing side.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// An update's kind does not match the stored record.
    #[error("object {id} is stored as {stored} but update is {update}")]
    KindMismatch {
        /// Object id.
        id: ObjectId,
        /// Kind already in the table.
        stored: ObjectKind,
        /// Kind the update claims.
        update: ObjectKind,
    },

    /// An update was merged into a record for a different id.
    #[error("cannot merge update for object {update} into object {current}")]
    IdMismatch {
        /// Id of the record being merged into.
        current: ObjectId,
        /// Id carried by the update.
        update: ObjectId,
    },

    /// A small enumerated field was given a value outside its domain.
    #[error("{field} value {value} is out of range")]
    OutOfRange {
        /// Field label.
        field: &'static str,
        /// Offending value.
        value: i64,
    },
}
