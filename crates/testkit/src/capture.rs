//! Hex capture fixtures.
//!
//! A capture is the raw bytes of one or more frames written as hex text.
//! Whitespace is ignored and `#` starts a comment that runs to the end of
//! the line, so captures can be annotated field by field.

use anyhow::{bail, Context, Result};
use artemis_core::Origin;
use artemis_net::{encode_packet, Packet, PacketDecoder, PacketRegistry};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Parse annotated hex text into bytes.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect();

    if digits.len() % 2 != 0 {
        bail!("Odd number of hex digits ({})", digits.len());
    }

    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16);
            let lo = pair[1].to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi * 16 + lo) as u8),
                _ => bail!("Invalid hex digit pair {}{}", pair[0], pair[1]),
            }
        })
        .collect()
}

/// Format bytes as lowercase hex with no separators.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Read and parse a capture file.
pub fn load_capture<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read capture {}", path.display()))?;
    parse_hex(&text).with_context(|| format!("Malformed capture {}", path.display()))
}

/// Decode every frame of a capture. Any decode error or trailing partial
/// frame fails the whole capture.
pub fn decode_capture(registry: Arc<PacketRegistry>, origin: Origin, bytes: &[u8]) -> Result<Vec<Box<dyn Packet>>> {
    let mut decoder = PacketDecoder::new(registry, origin);
    decoder.feed(bytes);

    let mut packets = Vec::new();
    for (index, result) in decoder.drain().into_iter().enumerate() {
        let packet = result.with_context(|| format!("Frame {index} failed to decode"))?;
        debug!(index, kind = packet.kind_name(), summary = %packet.summary(), "decoded capture frame");
        packets.push(packet);
    }

    if decoder.buffered() != 0 {
        bail!("Capture ends with {} bytes of an incomplete frame", decoder.buffered());
    }
    Ok(packets)
}

/// Decode a capture with the shipped registry, check the packet count, and
/// check that re-encoding every packet reproduces the capture exactly.
pub fn assert_capture_round_trips(origin: Origin, bytes: &[u8], expected: usize) -> Result<Vec<Box<dyn Packet>>> {
    let registry = Arc::new(PacketRegistry::core().context("Failed to build core registry")?);
    let packets = decode_capture(registry, origin, bytes)?;
    if packets.len() != expected {
        bail!("Expected {expected} packets, decoded {}", packets.len());
    }

    let mut reencoded = Vec::with_capacity(bytes.len());
    for packet in &packets {
        let frame = encode_packet(packet.as_ref())
            .with_context(|| format!("Failed to re-encode {}", packet.kind_name()))?;
        reencoded.extend_from_slice(&frame);
    }

    if reencoded != bytes {
        bail!(
            "Re-encoded capture differs\n  expected: {}\n  actual:   {}",
            hex(bytes),
            hex(&reencoded)
        );
    }
    Ok(packets)
}
