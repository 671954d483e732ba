//! Helm station packets.

use crate::codec::{Opaque, PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::packet::PacketKind;
use crate::protocol::{simple_event, type_code, value_int};
use artemis_core::Origin;

/// A jump drive has finished its jump. No payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JumpEndPacket;

impl PacketKind for JumpEndPacket {
    const ORIGIN: Origin = Origin::Server;
    const TYPE_CODE: u32 = type_code::SIMPLE_EVENT;
    const SUB_TYPE: Option<u8> = Some(simple_event::JUMP_END);
    const NAME: &'static str = "JumpEndPacket";

    fn decode(_reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        Ok(Self)
    }

    fn encode(&self, _writer: &mut PacketWriter) -> Result<(), PacketError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "jump end".to_string()
    }
}

/// Toggles the engines between forward and reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelmToggleReversePacket {
    unknown: Opaque<4>,
}

impl HelmToggleReversePacket {
    const DEFAULT_UNKNOWN: [u8; 4] = [0; 4];

    /// Build the command.
    pub const fn new() -> Self {
        Self {
            unknown: Opaque::new(Self::DEFAULT_UNKNOWN),
        }
    }

    /// The trailing field whose meaning is not known.
    pub const fn unknown(&self) -> &Opaque<4> {
        &self.unknown
    }
}

impl Default for HelmToggleReversePacket {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketKind for HelmToggleReversePacket {
    const ORIGIN: Origin = Origin::Client;
    const TYPE_CODE: u32 = type_code::VALUE_INT;
    const SUB_TYPE: Option<u8> = Some(value_int::HELM_TOGGLE_REVERSE);
    const NAME: &'static str = "HelmToggleReversePacket";

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        Ok(Self {
            unknown: reader.read_unknown("UNKNOWN")?,
        })
    }

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_unknown(&self.unknown);
        Ok(())
    }

    fn describe(&self) -> String {
        "toggle reverse".to_string()
    }
}
