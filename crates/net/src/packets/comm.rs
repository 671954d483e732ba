//! Communications station packets.

use crate::codec::{PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::packet::PacketKind;
use crate::protocol::{type_code, value_int};
use artemis_core::Origin;

/// Toggles red alert on the sender's ship. No payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleRedAlertPacket;

impl PacketKind for ToggleRedAlertPacket {
    const ORIGIN: Origin = Origin::Client;
    const TYPE_CODE: u32 = type_code::VALUE_INT;
    const SUB_TYPE: Option<u8> = Some(value_int::TOGGLE_RED_ALERT);
    const NAME: &'static str = "ToggleRedAlertPacket";

    fn decode(_reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        Ok(Self)
    }

    fn encode(&self, _writer: &mut PacketWriter) -> Result<(), PacketError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "toggle red alert".to_string()
    }
}
