//! The contract every packet implementation satisfies.
//!
//! Concrete packets implement [`PacketKind`], which fixes their registry key
//! at compile time. The object-safe [`Packet`] trait is derived from it and
//! is what the registry and stream decoder hand out.

use crate::codec::{PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::framing::encode_header;
use crate::protocol::format_type_code;
use crate::registry::PacketKey;
use artemis_core::Origin;
use std::any::Any;
use std::fmt;

/// A concrete packet payload with a static key.
pub trait PacketKind: fmt::Debug + Send + Sync + Sized + 'static {
    /// Which end of the connection sends this packet.
    const ORIGIN: Origin;
    /// Type code in the frame header.
    const TYPE_CODE: u32;
    /// Sub-type byte for multiplexed type codes.
    const SUB_TYPE: Option<u8> = None;
    /// Short name used in logs and errors.
    const NAME: &'static str;

    /// Decode the payload. Reading past the end is reported by the registry
    /// as a truncated frame.
    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError>;

    /// Encode the payload, writing exactly the bytes [`PacketKind::decode`]
    /// consumes.
    fn encode(&self, writer: &mut PacketWriter) -> Result<(), PacketError>;

    /// Short human-readable description for diagnostics.
    fn describe(&self) -> String;

    /// Sub-type byte this value is framed with. Catch-all decoders registered
    /// without a sub-type override this to echo the byte they decoded.
    fn frame_sub_type(&self) -> Option<u8> {
        Self::SUB_TYPE
    }
}

/// Object-safe view of a decoded or outbound packet.
pub trait Packet: fmt::Debug + Send + Sync + 'static {
    /// Which end of the connection sends this packet.
    fn origin(&self) -> Origin;
    /// Type code in the frame header.
    fn type_code(&self) -> u32;
    /// Sub-type byte, if the type code is multiplexed.
    fn sub_type(&self) -> Option<u8>;
    /// Concrete payload name.
    fn kind_name(&self) -> &'static str;
    /// Encode the payload into `writer`.
    fn write_payload(&self, writer: &mut PacketWriter) -> Result<(), PacketError>;
    /// Short human-readable description for diagnostics.
    fn summary(&self) -> String;
    /// Access for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Registry key this packet is framed under.
    fn key(&self) -> PacketKey {
        PacketKey::new(self.origin(), self.type_code(), self.sub_type())
    }
}

impl<T: PacketKind> Packet for T {
    fn origin(&self) -> Origin {
        T::ORIGIN
    }

    fn type_code(&self) -> u32 {
        T::TYPE_CODE
    }

    fn sub_type(&self) -> Option<u8> {
        self.frame_sub_type()
    }

    fn kind_name(&self) -> &'static str {
        T::NAME
    }

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        self.encode(writer)
    }

    fn summary(&self) -> String {
        self.describe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Packet {
    /// Whether the concrete payload is `T`.
    pub fn is<T: Packet>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the concrete payload as `T`.
    pub fn downcast_ref<T: Packet>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A frame no decoder is registered for, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPacket {
    /// Direction the frame travelled.
    pub origin: Origin,
    /// Type code from the header.
    pub type_code: u32,
    /// Sub-type byte from the header, if the type code is multiplexed.
    pub sub_type: Option<u8>,
    /// Raw payload.
    pub payload: Vec<u8>,
}

impl Packet for UnknownPacket {
    fn origin(&self) -> Origin {
        self.origin
    }

    fn type_code(&self) -> u32 {
        self.type_code
    }

    fn sub_type(&self) -> Option<u8> {
        self.sub_type
    }

    fn kind_name(&self) -> &'static str {
        "UnknownPacket"
    }

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_bytes(&self.payload);
        Ok(())
    }

    fn summary(&self) -> String {
        match self.sub_type {
            Some(sub_type) => format!(
                "unknown {} packet {}/{:#04x} ({} bytes)",
                self.origin,
                format_type_code(self.type_code),
                sub_type,
                self.payload.len()
            ),
            None => format!(
                "unknown {} packet {} ({} bytes)",
                self.origin,
                format_type_code(self.type_code),
                self.payload.len()
            ),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Encode a packet into a complete frame.
pub fn encode_packet(packet: &dyn Packet) -> Result<Vec<u8>, PacketError> {
    let mut writer = PacketWriter::new();
    packet.write_payload(&mut writer)?;
    encode_header(packet.type_code(), packet.sub_type(), writer.as_slice())
}
