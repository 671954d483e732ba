//! Packet type registry.
//!
//! Maps `(origin, type code, sub-type)` to a payload factory. The registry is
//! built once at startup and read-only afterwards, so it can be shared
//! between decoders behind an `Arc`.

use crate::codec::PacketReader;
use crate::error::PacketError;
use crate::framing::{decode_header, PacketHeader};
use crate::packet::{Packet, PacketKind, UnknownPacket};
use crate::protocol::format_type_code;
use artemis_core::Origin;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// Composite registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketKey {
    /// Direction the packet travels.
    pub origin: Origin,
    /// Type code from the frame header.
    pub type_code: u32,
    /// Sub-type byte; `None` is the catch-all for a type code.
    pub sub_type: Option<u8>,
}

impl PacketKey {
    /// Build a key.
    pub const fn new(origin: Origin, type_code: u32, sub_type: Option<u8>) -> Self {
        Self {
            origin,
            type_code,
            sub_type,
        }
    }

    /// The key a [`PacketKind`] declares.
    pub const fn of<P: PacketKind>() -> Self {
        Self::new(P::ORIGIN, P::TYPE_CODE, P::SUB_TYPE)
    }

    /// The catch-all key for this key's type code.
    pub const fn without_sub_type(self) -> Self {
        Self::new(self.origin, self.type_code, None)
    }
}

impl fmt::Display for PacketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin, format_type_code(self.type_code))?;
        if let Some(sub_type) = self.sub_type {
            write!(f, "/{sub_type:#04x}")?;
        }
        Ok(())
    }
}

/// Signature of a payload decoder.
pub type BuildFn = fn(&mut PacketReader<'_>) -> Result<Box<dyn Packet>, PacketError>;

/// Creates packet instances from a payload cursor.
#[derive(Debug, Clone, Copy)]
pub struct PacketFactory {
    kind: &'static str,
    build: BuildFn,
}

fn build_boxed<P: PacketKind>(reader: &mut PacketReader<'_>) -> Result<Box<dyn Packet>, PacketError> {
    Ok(Box::new(P::decode(reader)?))
}

impl PacketFactory {
    /// Wrap a decoder function.
    pub const fn new(kind: &'static str, build: BuildFn) -> Self {
        Self { kind, build }
    }

    /// Factory for a statically keyed packet kind.
    pub fn of<P: PacketKind>() -> Self {
        Self::new(P::NAME, build_boxed::<P>)
    }

    /// Name of the payload this factory produces.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Decode a payload.
    pub fn build(&self, reader: &mut PacketReader<'_>) -> Result<Box<dyn Packet>, PacketError> {
        (self.build)(reader)
    }
}

/// Table of payload factories.
#[derive(Debug, Default, Clone)]
pub struct PacketRegistry {
    factories: BTreeMap<PacketKey, PacketFactory>,
    multiplexed: BTreeSet<(Origin, u32)>,
}

impl PacketRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the shipped packet catalogue.
    pub fn core() -> Result<Self, PacketError> {
        let mut registry = Self::new();
        crate::packets::register_core(&mut registry)?;
        Ok(registry)
    }

    /// Register a factory. Fails if the key is already taken.
    pub fn register(
        &mut self,
        origin: Origin,
        type_code: u32,
        sub_type: Option<u8>,
        factory: PacketFactory,
    ) -> Result<(), PacketError> {
        let key = PacketKey::new(origin, type_code, sub_type);
        if self.factories.contains_key(&key) {
            return Err(PacketError::DuplicateRegistration(key));
        }
        self.insert(key, factory);
        Ok(())
    }

    /// Register a statically keyed packet kind.
    pub fn register_kind<P: PacketKind>(&mut self) -> Result<(), PacketError> {
        self.register(P::ORIGIN, P::TYPE_CODE, P::SUB_TYPE, PacketFactory::of::<P>())
    }

    /// Register a factory, replacing any existing one. Returns the old one.
    pub fn replace(
        &mut self,
        origin: Origin,
        type_code: u32,
        sub_type: Option<u8>,
        factory: PacketFactory,
    ) -> Option<PacketFactory> {
        self.insert(PacketKey::new(origin, type_code, sub_type), factory)
    }

    fn insert(&mut self, key: PacketKey, factory: PacketFactory) -> Option<PacketFactory> {
        if key.sub_type.is_some() {
            self.mark_multiplexed(key.origin, key.type_code);
        }
        debug!(%key, kind = factory.kind(), "registered packet factory");
        self.factories.insert(key, factory)
    }

    /// Declare that frames of this type code carry a sub-type byte.
    pub fn mark_multiplexed(&mut self, origin: Origin, type_code: u32) {
        self.multiplexed.insert((origin, type_code));
    }

    /// Whether frames of this type code carry a sub-type byte.
    pub fn is_multiplexed(&self, origin: Origin, type_code: u32) -> bool {
        self.multiplexed.contains(&(origin, type_code))
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &PacketKey> {
        self.factories.keys()
    }

    /// Find the factory for a key, falling back from a specific sub-type to
    /// the type code's catch-all.
    pub fn lookup(
        &self,
        origin: Origin,
        type_code: u32,
        sub_type: Option<u8>,
    ) -> Result<&PacketFactory, PacketError> {
        let key = PacketKey::new(origin, type_code, sub_type);
        self.factories
            .get(&key)
            .or_else(|| self.factories.get(&key.without_sub_type()))
            .ok_or(PacketError::NotFound(key))
    }

    /// Decode one payload. Unregistered keys become [`UnknownPacket`].
    pub fn decode(
        &self,
        origin: Origin,
        header: &PacketHeader,
        payload: &[u8],
    ) -> Result<Box<dyn Packet>, PacketError> {
        let factory = match self.lookup(origin, header.type_code, header.sub_type) {
            Ok(factory) => factory,
            Err(PacketError::NotFound(key)) => {
                debug!(%key, len = payload.len(), "no decoder registered, keeping raw payload");
                return Ok(Box::new(UnknownPacket {
                    origin,
                    type_code: header.type_code,
                    sub_type: header.sub_type,
                    payload: payload.to_vec(),
                }));
            }
            Err(err) => return Err(err),
        };

        let mut reader = PacketReader::with_sub_type(payload, header.sub_type);
        let packet = factory.build(&mut reader).map_err(|err| match err {
            PacketError::Underrun { needed, remaining } => PacketError::Truncated {
                kind: factory.kind(),
                needed,
                remaining,
            },
            other => other,
        })?;

        if reader.has_remaining() {
            warn!(
                kind = factory.kind(),
                trailing = reader.remaining(),
                "payload has unconsumed trailing bytes"
            );
        }
        Ok(packet)
    }

    /// Decode one exact frame.
    pub fn decode_frame(&self, origin: Origin, frame: &[u8]) -> Result<Box<dyn Packet>, PacketError> {
        let (header, payload) = decode_header(frame, |code| self.is_multiplexed(origin, code))?;
        self.decode(origin, &header, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PacketWriter;

    #[derive(Debug, PartialEq)]
    struct Catchall(Option<u8>);

    impl PacketKind for Catchall {
        const ORIGIN: Origin = Origin::Server;
        const TYPE_CODE: u32 = 0x10;
        const NAME: &'static str = "Catchall";

        fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
            Ok(Self(reader.sub_type()))
        }

        fn encode(&self, _writer: &mut PacketWriter) -> Result<(), PacketError> {
            Ok(())
        }

        fn describe(&self) -> String {
            "catch-all".to_string()
        }

        fn frame_sub_type(&self) -> Option<u8> {
            self.0
        }
    }

    #[derive(Debug, PartialEq)]
    struct Specific(i32);

    impl PacketKind for Specific {
        const ORIGIN: Origin = Origin::Server;
        const TYPE_CODE: u32 = 0x10;
        const SUB_TYPE: Option<u8> = Some(3);
        const NAME: &'static str = "Specific";

        fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
            Ok(Self(reader.read_i32()?))
        }

        fn encode(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
            writer.write_i32(self.0);
            Ok(())
        }

        fn describe(&self) -> String {
            format!("specific {}", self.0)
        }
    }

    fn registry() -> PacketRegistry {
        let mut registry = PacketRegistry::new();
        registry.register_kind::<Catchall>().unwrap();
        registry.register_kind::<Specific>().unwrap();
        registry
    }

    #[test]
    fn key_display() {
        assert_eq!(
            PacketKey::new(Origin::Client, 0x4c82_1d3c, Some(0x0a)).to_string(),
            "client:0x4c821d3c/0x0a"
        );
        assert_eq!(
            PacketKey::new(Origin::Server, 0xee66_5279, None).to_string(),
            "server:0xee665279"
        );
    }

    #[test]
    fn lookup_prefers_exact_sub_type() {
        let registry = registry();
        assert_eq!(registry.lookup(Origin::Server, 0x10, Some(3)).unwrap().kind(), "Specific");
        assert_eq!(registry.lookup(Origin::Server, 0x10, Some(4)).unwrap().kind(), "Catchall");
        assert_eq!(registry.lookup(Origin::Server, 0x10, None).unwrap().kind(), "Catchall");
    }

    #[test]
    fn lookup_without_catch_all_is_not_found() {
        let mut registry = PacketRegistry::new();
        registry.register_kind::<Specific>().unwrap();
        assert_eq!(
            registry.lookup(Origin::Server, 0x10, Some(4)).unwrap_err(),
            PacketError::NotFound(PacketKey::new(Origin::Server, 0x10, Some(4)))
        );
        assert!(registry.lookup(Origin::Client, 0x10, Some(3)).is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        assert_eq!(
            registry.register_kind::<Specific>(),
            Err(PacketError::DuplicateRegistration(PacketKey::of::<Specific>()))
        );

        let old = registry.replace(Origin::Server, 0x10, Some(3), PacketFactory::of::<Catchall>());
        assert_eq!(old.map(|f| f.kind()), Some("Specific"));
        assert_eq!(registry.lookup(Origin::Server, 0x10, Some(3)).unwrap().kind(), "Catchall");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn sub_typed_registration_marks_multiplexed() {
        let registry = registry();
        assert!(registry.is_multiplexed(Origin::Server, 0x10));
        assert!(!registry.is_multiplexed(Origin::Client, 0x10));
    }

    #[test]
    fn catch_all_sees_sub_type() {
        let registry = registry();
        let header = PacketHeader {
            length: 0,
            type_code: 0x10,
            sub_type: Some(9),
        };
        let packet = registry.decode(Origin::Server, &header, &[]).unwrap();
        assert_eq!(packet.downcast_ref::<Catchall>(), Some(&Catchall(Some(9))));
    }

    #[test]
    fn short_payload_is_truncated() {
        let registry = registry();
        let header = PacketHeader {
            length: 2,
            type_code: 0x10,
            sub_type: Some(3),
        };
        assert_eq!(
            registry.decode(Origin::Server, &header, &[1, 2]).unwrap_err(),
            PacketError::Truncated {
                kind: "Specific",
                needed: 4,
                remaining: 2
            }
        );
    }

    #[test]
    fn unregistered_frame_becomes_unknown() {
        let registry = registry();
        let packet = registry
            .decode_frame(Origin::Server, &[1, 0, 0, 0, 0x20, 0, 0, 0, 0x7f])
            .unwrap();
        let unknown = packet.downcast_ref::<UnknownPacket>().unwrap();
        assert_eq!(unknown.type_code, 0x20);
        assert_eq!(unknown.payload, vec![0x7f]);
    }
}
