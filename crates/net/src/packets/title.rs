//! Main screen title message.

use crate::codec::{PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::packet::PacketKind;
use crate::protocol::type_code;
use artemis_core::Origin;

/// Displays a title with two subtitle lines on the main screen.
///
/// Sent in response to a scripted mission's big-message event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TitlePacket {
    /// Large title line.
    pub title: String,
    /// First subtitle line.
    pub subtitle1: String,
    /// Second subtitle line.
    pub subtitle2: String,
}

impl TitlePacket {
    /// Build a title message.
    pub fn new(title: impl Into<String>, subtitle1: impl Into<String>, subtitle2: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle1: subtitle1.into(),
            subtitle2: subtitle2.into(),
        }
    }
}

impl PacketKind for TitlePacket {
    const ORIGIN: Origin = Origin::Server;
    const TYPE_CODE: u32 = type_code::BIG_MESS;
    const NAME: &'static str = "TitlePacket";

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        Ok(Self {
            title: reader.read_string()?,
            subtitle1: reader.read_string()?,
            subtitle2: reader.read_string()?,
        })
    }

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer
            .write_string(&self.title)?
            .write_string(&self.subtitle1)?
            .write_string(&self.subtitle2)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.subtitle1, self.subtitle2)
    }
}
