//! Error taxonomy for the packet engine.
//!
//! Frame-local errors (`Underrun`, `Truncated`, `MalformedString`,
//! `InvalidValue`) abort the current frame only: the stream decoder has
//! already stepped over the frame's declared length. `FrameLengthMismatch`
//! and `FrameTooLarge` leave the stream position unrecoverable.

use crate::registry::PacketKey;
use artemis_world::WorldError;

/// Errors raised while framing, dispatching or decoding packets.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PacketError {
    /// A primitive read needed more bytes than remain.
    #[error("needed {needed} bytes but only {remaining} remain")]
    Underrun {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A frame's declared length disagrees with the bytes that follow.
    #[error("frame declares {declared} payload bytes but {actual} are present")]
    FrameLengthMismatch {
        /// Length from the header.
        declared: u32,
        /// Bytes actually following the header.
        actual: usize,
    },

    /// A frame's declared length exceeds the configured maximum.
    #[error("frame length {length} exceeds maximum {max}")]
    FrameTooLarge {
        /// Declared or attempted length.
        length: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A payload decoder ran past the end of its frame.
    #[error("{kind} payload truncated: needed {needed} more bytes, {remaining} remain")]
    Truncated {
        /// Payload kind being decoded.
        kind: &'static str,
        /// Bytes the failing read required.
        needed: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },

    /// A string length prefix is implausible or the text is not UTF-16.
    #[error("malformed string (length {length}): {reason}")]
    MalformedString {
        /// Character count from the prefix.
        length: i64,
        /// What was wrong.
        reason: &'static str,
    },

    /// No decoder is registered for a key or its catch-all.
    #[error("no decoder registered for {0}")]
    NotFound(PacketKey),

    /// A decoder is already registered for a key.
    #[error("a decoder is already registered for {0}")]
    DuplicateRegistration(PacketKey),

    /// A decoded field holds a value outside its domain.
    #[error("invalid {field}: {value}")]
    InvalidValue {
        /// Field label.
        field: &'static str,
        /// Offending value.
        value: i64,
    },

    /// An earlier fatal framing error left the stream unusable.
    #[error("stream desynchronized by an earlier framing error")]
    Desynchronized,
}

impl PacketError {
    /// Whether the error leaves the byte stream unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FrameLengthMismatch { .. } | Self::FrameTooLarge { .. } | Self::Desynchronized
        )
    }
}

impl From<WorldError> for PacketError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::OutOfRange { field, value } => Self::InvalidValue { field, value },
            WorldError::KindMismatch { update, .. } => Self::InvalidValue {
                field: "object kind",
                value: i64::from(update.as_u8()),
            },
            WorldError::IdMismatch { update, .. } => Self::InvalidValue {
                field: "object id",
                value: i64::from(update),
            },
        }
    }
}
