//! Incremental decoding of a byte stream into packets.

use crate::error::PacketError;
use crate::framing::split_frame;
use crate::packet::Packet;
use crate::protocol::MAX_FRAME_LEN;
use crate::registry::PacketRegistry;
use artemis_core::Origin;
use bytes::{Buf, BytesMut};
use std::sync::Arc;
use tracing::{error, trace};

/// Splits a byte stream from one direction into packets.
///
/// Feed it whatever chunks the transport delivers; it buffers partial frames.
/// A frame whose payload fails to decode is consumed and its error returned,
/// so the next call continues with the following frame. An oversized frame
/// poisons the decoder until [`PacketDecoder::reset`].
#[derive(Debug)]
pub struct PacketDecoder {
    registry: Arc<PacketRegistry>,
    origin: Origin,
    buffer: BytesMut,
    max_frame_len: usize,
    poisoned: bool,
}

impl PacketDecoder {
    /// Decode frames sent by `origin`.
    pub fn new(registry: Arc<PacketRegistry>, origin: Origin) -> Self {
        Self {
            registry,
            origin,
            buffer: BytesMut::new(),
            max_frame_len: MAX_FRAME_LEN as usize,
            poisoned: false,
        }
    }

    /// Override the largest accepted payload length.
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Direction this decoder reads.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Registry used for dispatch.
    pub fn registry(&self) -> &Arc<PacketRegistry> {
        &self.registry
    }

    /// Append received bytes. Input is dropped while poisoned.
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.poisoned {
            trace!(len = bytes.len(), "dropping input after fatal framing error");
            return;
        }
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether a fatal framing error has stopped the decoder.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Drop buffered bytes and clear a fatal error.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.poisoned = false;
    }

    /// Decode the next complete frame, if one is buffered.
    pub fn next_packet(&mut self) -> Result<Option<Box<dyn Packet>>, PacketError> {
        if self.poisoned {
            return Err(PacketError::Desynchronized);
        }

        let registry = &self.registry;
        let origin = self.origin;
        let split = split_frame(&self.buffer, |code| registry.is_multiplexed(origin, code), self.max_frame_len);
        let frame = match split {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(err) => {
                error!(%err, buffered = self.buffer.len(), "fatal framing error");
                self.poisoned = true;
                self.buffer.clear();
                return Err(err);
            }
        };

        trace!(
            origin = %origin,
            type_code = frame.header.type_code,
            len = frame.header.length,
            "frame received"
        );
        let result = registry.decode(origin, &frame.header, frame.payload);
        let consumed = frame.consumed;
        self.buffer.advance(consumed);
        result.map(Some)
    }

    /// Decode every complete frame currently buffered.
    ///
    /// Stops early on a fatal error, which is the last element.
    pub fn drain(&mut self) -> Vec<Result<Box<dyn Packet>, PacketError>> {
        let mut out = Vec::new();
        loop {
            match self.next_packet() {
                Ok(Some(packet)) => out.push(Ok(packet)),
                Ok(None) => break,
                Err(err) => {
                    let fatal = err.is_fatal();
                    out.push(Err(err));
                    if fatal {
                        break;
                    }
                }
            }
        }
        out
    }
}
