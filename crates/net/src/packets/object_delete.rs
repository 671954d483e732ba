//! World object removal.

use crate::codec::{PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::packet::PacketKind;
use crate::protocol::type_code;
use artemis_core::{ObjectId, ObjectKind, Origin};

/// An object has left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectDeletePacket {
    /// Kind of the removed object.
    pub kind: ObjectKind,
    /// Id of the removed object.
    pub id: ObjectId,
}

impl ObjectDeletePacket {
    /// Build a removal notice.
    pub const fn new(kind: ObjectKind, id: ObjectId) -> Self {
        Self { kind, id }
    }
}

impl PacketKind for ObjectDeletePacket {
    const ORIGIN: Origin = Origin::Server;
    const TYPE_CODE: u32 = type_code::OBJECT_DELETE;
    const NAME: &'static str = "ObjectDeletePacket";

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        let raw = reader.read_u8()?;
        let kind = ObjectKind::from_u8(raw).ok_or(PacketError::InvalidValue {
            field: "object kind",
            value: i64::from(raw),
        })?;
        let id = reader.read_i32()?;
        Ok(Self { kind, id })
    }

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_u8(self.kind.as_u8()).write_i32(self.id);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("delete {}#{}", self.kind, self.id)
    }
}
