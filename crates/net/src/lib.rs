#![warn(missing_docs)]
//! Packet engine: primitive codec, frame splitting, type registry and the
//! shipped packet catalogue.

pub mod codec;
pub mod error;
pub mod framing;
pub mod packet;
pub mod packets;
pub mod protocol;
pub mod registry;
pub mod stream;

// Re-export commonly used types
pub use codec::{FlagWord, Opaque, PacketReader, PacketWriter};
pub use error::PacketError;
pub use framing::{decode_header, encode_header, split_frame, Frame, PacketHeader};
pub use packet::{encode_packet, Packet, PacketKind, UnknownPacket};
pub use protocol::{MAX_FRAME_LEN, MAX_STRING_CHARS};
pub use registry::{PacketFactory, PacketKey, PacketRegistry};
pub use stream::PacketDecoder;
