//! Keep-alive.

use crate::codec::{PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::packet::PacketKind;
use crate::protocol::type_code;
use artemis_core::Origin;

/// Sent periodically by the server; carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartbeatPacket;

impl PacketKind for HeartbeatPacket {
    const ORIGIN: Origin = Origin::Server;
    const TYPE_CODE: u32 = type_code::HEARTBEAT;
    const NAME: &'static str = "HeartbeatPacket";

    fn decode(_reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        Ok(Self)
    }

    fn encode(&self, _writer: &mut PacketWriter) -> Result<(), PacketError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "heartbeat".to_string()
    }
}
