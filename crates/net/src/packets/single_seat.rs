//! Single-seat craft pilot updates.

use crate::codec::{Opaque, PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::packet::PacketKind;
use crate::protocol::{type_code, value_float};
use artemis_core::{ObjectId, Origin};

/// Position, heading and rudder of a single-seat craft, sent by its pilot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleSeatPilotPacket {
    /// Craft id as listed in the bay status.
    pub object_id: ObjectId,
    /// 0.0 is hard to port, 0.5 amidships, 1.0 hard to starboard.
    pub rudder: f32,
    unknown: Opaque<4>,
    /// Position X.
    pub x: f32,
    /// Position Y.
    pub y: f32,
    /// Position Z.
    pub z: f32,
    /// Orientation quaternion `[x, y, z, w]`.
    pub orientation: [f32; 4],
}

impl SingleSeatPilotPacket {
    // 1.0f32
    const DEFAULT_UNKNOWN: [u8; 4] = [0x00, 0x00, 0x80, 0x3f];

    /// Build an update for `object_id` with the rudder amidships.
    pub const fn new(object_id: ObjectId) -> Self {
        Self {
            object_id,
            rudder: 0.5,
            unknown: Opaque::new(Self::DEFAULT_UNKNOWN),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            orientation: [0.0; 4],
        }
    }

    /// The field after the id whose meaning is not known.
    pub const fn unknown(&self) -> &Opaque<4> {
        &self.unknown
    }
}

impl PacketKind for SingleSeatPilotPacket {
    const ORIGIN: Origin = Origin::Client;
    const TYPE_CODE: u32 = type_code::VALUE_FLOAT;
    const SUB_TYPE: Option<u8> = Some(value_float::SINGLE_SEAT_PILOT);
    const NAME: &'static str = "SingleSeatPilotPacket";

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        let rudder = reader.read_f32()?;
        let object_id = reader.read_i32()?;
        let unknown = reader.read_unknown("UNKNOWN")?;
        let x = reader.read_f32()?;
        let y = reader.read_f32()?;
        let z = reader.read_f32()?;
        let mut orientation = [0.0; 4];
        for component in &mut orientation {
            *component = reader.read_f32()?;
        }
        Ok(Self {
            object_id,
            rudder,
            unknown,
            x,
            y,
            z,
            orientation,
        })
    }

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer
            .write_f32(self.rudder)
            .write_i32(self.object_id)
            .write_unknown(&self.unknown)
            .write_f32(self.x)
            .write_f32(self.y)
            .write_f32(self.z);
        for component in self.orientation {
            writer.write_f32(component);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let [ox, oy, oz, ow] = self.orientation;
        format!(
            "#{} rudder={} pos=({},{},{}) orient=({},{},{},{})",
            self.object_id, self.rudder, self.x, self.y, self.z, ox, oy, oz, ow
        )
    }
}
