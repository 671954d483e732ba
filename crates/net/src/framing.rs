//! Packet header framing.
//!
//! Frame format: `[length: u32][type_code: u32]{sub_type: u8}[payload]`.
//! `length` counts payload bytes only. The sub-type byte is present only for
//! multiplexed type codes, which the caller decides through a predicate over
//! the type code (normally [`PacketRegistry::is_multiplexed`]).
//!
//! [`PacketRegistry::is_multiplexed`]: crate::registry::PacketRegistry::is_multiplexed

use crate::error::PacketError;
use bytes::{Buf, BufMut};

/// Bytes taken by the length and type code fields.
pub const BASE_HEADER_LEN: usize = 8;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketHeader {
    /// Payload length in bytes.
    pub length: u32,
    /// Packet type code.
    pub type_code: u32,
    /// Sub-type byte, present only for multiplexed type codes.
    pub sub_type: Option<u8>,
}

impl PacketHeader {
    /// Bytes the header occupies on the wire.
    pub fn header_len(&self) -> usize {
        BASE_HEADER_LEN + usize::from(self.sub_type.is_some())
    }

    /// Bytes the whole frame occupies on the wire.
    pub fn frame_len(&self) -> usize {
        self.header_len() + self.length as usize
    }
}

/// One complete frame borrowed from a stream buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Decoded header.
    pub header: PacketHeader,
    /// Payload bytes, exactly `header.length` of them.
    pub payload: &'a [u8],
    /// Bytes the frame consumed from the buffer.
    pub consumed: usize,
}

/// Build a complete frame around `payload`.
pub fn encode_header(type_code: u32, sub_type: Option<u8>, payload: &[u8]) -> Result<Vec<u8>, PacketError> {
    let length = u32::try_from(payload.len()).map_err(|_| PacketError::FrameTooLarge {
        length: payload.len(),
        max: u32::MAX as usize,
    })?;

    let mut frame = Vec::with_capacity(BASE_HEADER_LEN + 1 + payload.len());
    frame.put_u32_le(length);
    frame.put_u32_le(type_code);
    if let Some(sub_type) = sub_type {
        frame.put_u8(sub_type);
    }
    frame.put_slice(payload);
    Ok(frame)
}

/// Read the fixed part of a header, then the sub-type byte if the type code
/// is multiplexed. Returns `None` if `buf` is too short.
fn peek_header(buf: &[u8], is_multiplexed: &impl Fn(u32) -> bool) -> Option<PacketHeader> {
    let mut cursor = buf;
    if cursor.remaining() < BASE_HEADER_LEN {
        return None;
    }
    let length = cursor.get_u32_le();
    let type_code = cursor.get_u32_le();
    let sub_type = if is_multiplexed(type_code) {
        if !cursor.has_remaining() {
            return None;
        }
        Some(cursor.get_u8())
    } else {
        None
    };
    Some(PacketHeader {
        length,
        type_code,
        sub_type,
    })
}

/// Decode the header of one exact frame and return it with the payload.
pub fn decode_header(
    frame: &[u8],
    is_multiplexed: impl Fn(u32) -> bool,
) -> Result<(PacketHeader, &[u8]), PacketError> {
    let Some(header) = peek_header(frame, &is_multiplexed) else {
        let needed = if frame.len() < BASE_HEADER_LEN {
            BASE_HEADER_LEN
        } else {
            BASE_HEADER_LEN + 1
        };
        return Err(PacketError::Underrun {
            needed,
            remaining: frame.len(),
        });
    };

    let payload = &frame[header.header_len()..];
    if payload.len() != header.length as usize {
        return Err(PacketError::FrameLengthMismatch {
            declared: header.length,
            actual: payload.len(),
        });
    }
    Ok((header, payload))
}

/// Split the first complete frame off a stream buffer.
///
/// Returns `Ok(None)` while the frame is still incomplete. A declared length
/// above `max_len` is an error before any payload is awaited.
pub fn split_frame(
    buf: &[u8],
    is_multiplexed: impl Fn(u32) -> bool,
    max_len: usize,
) -> Result<Option<Frame<'_>>, PacketError> {
    if buf.len() >= 4 {
        let declared = (&buf[..4]).get_u32_le() as usize;
        if declared > max_len {
            return Err(PacketError::FrameTooLarge {
                length: declared,
                max: max_len,
            });
        }
    }

    let Some(header) = peek_header(buf, &is_multiplexed) else {
        return Ok(None);
    };
    let consumed = header.frame_len();
    if buf.len() < consumed {
        return Ok(None);
    }

    Ok(Some(Frame {
        header,
        payload: &buf[header.header_len()..consumed],
        consumed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: u32) -> bool {
        false
    }

    fn always(_: u32) -> bool {
        true
    }

    #[test]
    fn header_layout_without_sub_type() {
        let frame = encode_header(0xee66_5279, None, &[1, 2, 3]).unwrap();
        assert_eq!(
            frame,
            vec![3, 0, 0, 0, 0x79, 0x52, 0x66, 0xee, 1, 2, 3]
        );
    }

    #[test]
    fn sub_type_is_not_counted_in_length() {
        let frame = encode_header(0x4c82_1d3c, Some(0x0a), &[]).unwrap();
        assert_eq!(frame, vec![0, 0, 0, 0, 0x3c, 0x1d, 0x82, 0x4c, 0x0a]);

        let (header, payload) = decode_header(&frame, always).unwrap();
        assert_eq!(header.length, 0);
        assert_eq!(header.sub_type, Some(0x0a));
        assert_eq!(header.header_len(), 9);
        assert!(payload.is_empty());
    }

    #[test]
    fn length_mismatch_is_a_framing_error() {
        let mut frame = encode_header(7, None, &[1, 2, 3, 4]).unwrap();
        frame.pop();
        assert_eq!(
            decode_header(&frame, never),
            Err(PacketError::FrameLengthMismatch {
                declared: 4,
                actual: 3
            })
        );

        frame.extend_from_slice(&[5, 6]);
        assert!(matches!(
            decode_header(&frame, never),
            Err(PacketError::FrameLengthMismatch { declared: 4, actual: 5 })
        ));
    }

    #[test]
    fn short_header_underruns() {
        assert_eq!(
            decode_header(&[1, 0, 0], never),
            Err(PacketError::Underrun {
                needed: 8,
                remaining: 3
            })
        );
    }

    #[test]
    fn split_waits_for_complete_frame() {
        let frame = encode_header(9, Some(2), &[0xaa; 6]).unwrap();
        for cut in 0..frame.len() {
            assert_eq!(split_frame(&frame[..cut], always, 64).unwrap(), None, "cut {cut}");
        }
        let split = split_frame(&frame, always, 64).unwrap().unwrap();
        assert_eq!(split.consumed, frame.len());
        assert_eq!(split.payload, &[0xaa; 6]);
    }

    #[test]
    fn split_leaves_following_frames() {
        let mut buf = encode_header(1, None, &[1]).unwrap();
        buf.extend(encode_header(2, None, &[2, 2]).unwrap());

        let first = split_frame(&buf, never, 64).unwrap().unwrap();
        assert_eq!(first.header.type_code, 1);
        let second = split_frame(&buf[first.consumed..], never, 64).unwrap().unwrap();
        assert_eq!(second.header.type_code, 2);
        assert_eq!(second.payload, &[2, 2]);
    }

    #[test]
    fn oversize_is_rejected_before_payload_arrives() {
        let buf = [0x00, 0x00, 0x10, 0x00];
        assert_eq!(
            split_frame(&buf, never, 1024),
            Err(PacketError::FrameTooLarge {
                length: 0x0010_0000,
                max: 1024
            })
        );
    }
}
