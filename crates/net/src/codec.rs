//! Primitive codec: cursor-based reads and writes of fixed-width values.
//!
//! Everything on the wire is little-endian. Strings are an `i32` character
//! count followed by that many UTF-16LE code units with no terminator.
//! Nothing in here knows about packet semantics.

use crate::error::PacketError;
use crate::protocol::MAX_STRING_CHARS;
use artemis_core::BoolState;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

/// A fixed-width field whose meaning is not known.
///
/// Holds the bytes last read from the wire, or the packet's default for a
/// freshly constructed packet, so that writing always re-emits what was
/// received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opaque<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> Opaque<N> {
    /// Wrap `bytes`; used both for defaults and for wire values.
    pub const fn new(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// The held bytes.
    pub const fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }
}

/// Up to 32 tri-state flags packed one bit per flag.
///
/// With a known mask a flag can be `Unknown`. Without one the word is plain
/// booleans and `Unknown` degrades to false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagWord {
    bits: u32,
    known: Option<u32>,
}

impl FlagWord {
    /// A boolean-only word, every flag false.
    pub const fn new() -> Self {
        Self {
            bits: 0,
            known: None,
        }
    }

    /// A tri-state word, every flag unknown.
    pub const fn with_known_mask() -> Self {
        Self {
            bits: 0,
            known: Some(0),
        }
    }

    /// Build from raw words.
    pub const fn from_raw(bits: u32, known: Option<u32>) -> Self {
        Self { bits, known }
    }

    /// Raw value bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Raw known mask, if this word carries one.
    pub const fn known(&self) -> Option<u32> {
        self.known
    }

    /// Whether any flag is known. Boolean-only words always are.
    pub fn any_known(&self) -> bool {
        self.known.map_or(true, |mask| mask != 0)
    }

    /// State of flag `index`; out-of-range indices are `Unknown`.
    pub fn get(&self, index: u8) -> BoolState {
        let Some(bit) = 1u32.checked_shl(u32::from(index)) else {
            return BoolState::Unknown;
        };
        if let Some(mask) = self.known {
            if mask & bit == 0 {
                return BoolState::Unknown;
            }
        }
        BoolState::from(self.bits & bit != 0)
    }

    /// Set flag `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: u8, state: BoolState) {
        let Some(bit) = 1u32.checked_shl(u32::from(index)) else {
            return;
        };
        match state {
            BoolState::True => self.bits |= bit,
            BoolState::False | BoolState::Unknown => self.bits &= !bit,
        }
        if let Some(mask) = self.known.as_mut() {
            if state.is_known() {
                *mask |= bit;
            } else {
                *mask &= !bit;
            }
        }
    }
}

/// Sequential reader over one payload.
#[derive(Debug)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
    len: usize,
    sub_type: Option<u8>,
}

impl<'a> PacketReader<'a> {
    /// Read from `payload`.
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            buf: payload,
            len: payload.len(),
            sub_type: None,
        }
    }

    /// Read from `payload`, remembering the sub-type byte the framing layer
    /// peeled off so catch-all decoders can see it.
    pub fn with_sub_type(payload: &'a [u8], sub_type: Option<u8>) -> Self {
        Self {
            sub_type,
            ..Self::new(payload)
        }
    }

    /// Sub-type of the frame being read, if it had one.
    pub fn sub_type(&self) -> Option<u8> {
        self.sub_type
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Bytes read so far.
    pub fn consumed(&self) -> usize {
        self.len - self.buf.remaining()
    }

    /// Whether any bytes are left.
    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), PacketError> {
        if self.buf.remaining() < needed {
            return Err(PacketError::Underrun {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Read one unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8, PacketError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read one signed byte.
    pub fn read_i8(&mut self) -> Result<i8, PacketError> {
        self.ensure(1)?;
        Ok(self.buf.get_i8())
    }

    /// Read a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, PacketError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    /// Read a little-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, PacketError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, PacketError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Read a little-endian IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> Result<f32, PacketError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32_le())
    }

    /// Read a tri-state carried as a full `i32`: non-zero is true.
    pub fn read_bool_state(&mut self) -> Result<BoolState, PacketError> {
        Ok(BoolState::from(self.read_i32()? != 0))
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], PacketError> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Copy the next `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PacketError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<(), PacketError> {
        self.ensure(len)?;
        self.buf.advance(len);
        Ok(())
    }

    /// Borrow everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.buf)
    }

    /// Read a length-prefixed UTF-16LE string.
    pub fn read_string(&mut self) -> Result<String, PacketError> {
        let count = self.read_i32()?;
        let length = i64::from(count);
        let Ok(chars) = usize::try_from(count) else {
            return Err(PacketError::MalformedString {
                length,
                reason: "negative length",
            });
        };
        if chars > MAX_STRING_CHARS {
            return Err(PacketError::MalformedString {
                length,
                reason: "length exceeds string limit",
            });
        }
        if chars * 2 > self.remaining() {
            return Err(PacketError::MalformedString {
                length,
                reason: "length exceeds remaining payload",
            });
        }

        let units: Vec<u16> = (0..chars).map(|_| self.buf.get_u16_le()).collect();
        String::from_utf16(&units).map_err(|_| PacketError::MalformedString {
            length,
            reason: "invalid UTF-16",
        })
    }

    /// Read a fixed-width field of unknown meaning, keeping its bytes.
    pub fn read_unknown<const N: usize>(&mut self, tag: &'static str) -> Result<Opaque<N>, PacketError> {
        let bytes = self.read_array::<N>()?;
        trace!(tag, ?bytes, "read opaque field");
        Ok(Opaque::new(bytes))
    }

    /// Read a flag word, preceded by its known mask when `with_mask` is set.
    pub fn read_flag_word(&mut self, with_mask: bool) -> Result<FlagWord, PacketError> {
        let known = if with_mask {
            Some(self.read_u32()?)
        } else {
            None
        };
        let bits = self.read_u32()?;
        Ok(FlagWord::from_raw(bits, known))
    }
}

/// Growable payload sink.
#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: BytesMut,
}

impl PacketWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Freeze into an immutable buffer.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Write one unsigned byte.
    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    /// Write one signed byte.
    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.buf.put_i8(value);
        self
    }

    /// Write a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.buf.put_u16_le(value);
        self
    }

    /// Write a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32_le(value);
        self
    }

    /// Write a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32_le(value);
        self
    }

    /// Write a little-endian IEEE-754 `f32`.
    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.buf.put_f32_le(value);
        self
    }

    /// Write a tri-state as a full `i32`; `Unknown` is written as false.
    pub fn write_bool_state(&mut self, value: BoolState) -> &mut Self {
        self.write_i32(i32::from(value.is_true()))
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    /// Write a length-prefixed UTF-16LE string.
    pub fn write_string(&mut self, value: &str) -> Result<&mut Self, PacketError> {
        let units: Vec<u16> = value.encode_utf16().collect();
        if units.len() > MAX_STRING_CHARS {
            return Err(PacketError::MalformedString {
                length: units.len() as i64,
                reason: "length exceeds string limit",
            });
        }
        // Bounded by MAX_STRING_CHARS above.
        self.buf.put_i32_le(units.len() as i32);
        for unit in units {
            self.buf.put_u16_le(unit);
        }
        Ok(self)
    }

    /// Re-emit an opaque field.
    pub fn write_unknown<const N: usize>(&mut self, value: &Opaque<N>) -> &mut Self {
        self.write_bytes(value.bytes())
    }

    /// Write a flag word, preceded by its known mask when `with_mask` is set.
    ///
    /// A boolean-only word written with a mask reports every flag known; a
    /// tri-state word written without one loses its unknowns.
    pub fn write_flag_word(&mut self, value: &FlagWord, with_mask: bool) -> &mut Self {
        if with_mask {
            self.write_u32(value.known().unwrap_or(u32::MAX));
        }
        self.write_u32(value.bits())
    }
}
