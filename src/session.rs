//! Client session: stream decoding wired to the world table.

use crate::config::LinkConfig;
use artemis_core::{ObjectId, Origin};
use artemis_net::packets::{ObjectDeletePacket, ObjectUpdatePacket};
use artemis_net::{encode_packet, Packet, PacketDecoder, PacketError, PacketRegistry, UnknownPacket};
use artemis_world::{ObjectTable, WorldError};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Errors surfaced by a session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Framing or payload decoding failed.
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    /// An object update could not be merged.
    #[error("world error: {0}")]
    World(#[from] WorldError),
}

impl SessionError {
    /// Whether the session must be reset before it can continue.
    ///
    /// Merge failures always count; [`LinkConfig::lenient_merge`] only
    /// changes how a session reacts to them.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Packet(err) => err.is_fatal(),
            Self::World(_) => true,
        }
    }
}

/// What a chunk of received bytes produced, in stream order.
#[derive(Debug)]
pub enum SessionEvent {
    /// A decoded packet of a registered kind.
    Packet(Box<dyn Packet>),
    /// A frame no decoder is registered for.
    Unknown(UnknownPacket),
    /// A frame or update entry that was dropped; the stream continues.
    Rejected(SessionError),
    /// The error that halted the session. Always the last event of a chunk.
    Fatal(SessionError),
    /// The world table changed while applying the preceding packet.
    ObjectsChanged {
        /// Ids created or updated, in wire order.
        changed: Vec<ObjectId>,
        /// Ids removed.
        removed: Vec<ObjectId>,
    },
}

/// One end of a connection: decodes what arrives, merges world updates, and
/// frames what leaves.
#[derive(Debug)]
pub struct ClientSession {
    config: LinkConfig,
    decoder: PacketDecoder,
    world: ObjectTable,
    halted: bool,
}

impl ClientSession {
    /// Session with the shipped packet catalogue.
    pub fn new(config: LinkConfig) -> Result<Self, SessionError> {
        let registry = PacketRegistry::core()?;
        Ok(Self::with_registry(config, Arc::new(registry)))
    }

    /// Session with a caller-built registry.
    pub fn with_registry(config: LinkConfig, registry: Arc<PacketRegistry>) -> Self {
        let decoder =
            PacketDecoder::new(registry, config.incoming_origin).with_max_frame_len(config.max_frame_len);
        Self {
            config,
            decoder,
            world: ObjectTable::new(),
            halted: false,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Read access to the merged world.
    pub fn world(&self) -> &ObjectTable {
        &self.world
    }

    /// Bytes of an incomplete frame still buffered.
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    /// Drop buffered bytes, clear a fatal error and forget the world.
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.world.clear();
        self.halted = false;
    }

    /// Consume a chunk of received bytes.
    ///
    /// Events come back in stream order. A fatal error is reported as a
    /// closing [`SessionEvent::Fatal`] after the events for everything already
    /// applied, and the session then refuses input until
    /// [`ClientSession::reset`]. A refused call returns
    /// [`PacketError::Desynchronized`] without consuming `bytes`.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<Vec<SessionEvent>, SessionError> {
        if self.is_halted() {
            return Err(PacketError::Desynchronized.into());
        }
        self.decoder.feed(bytes);
        let mut events = Vec::new();
        loop {
            let packet = match self.decoder.next_packet() {
                Ok(Some(packet)) => packet,
                Ok(None) => break,
                Err(err) if err.is_fatal() => {
                    events.push(SessionEvent::Fatal(err.into()));
                    break;
                }
                Err(err) => {
                    warn!(%err, "dropping frame");
                    events.push(SessionEvent::Rejected(err.into()));
                    continue;
                }
            };

            if let Some(unknown) = packet.downcast_ref::<UnknownPacket>() {
                events.push(SessionEvent::Unknown(unknown.clone()));
                continue;
            }

            trace!(kind = packet.kind_name(), summary = %packet.summary(), "packet received");
            let (change, fatal) = if self.config.track_world {
                self.apply_to_world(packet.as_ref(), &mut events)
            } else {
                (None, None)
            };
            events.push(SessionEvent::Packet(packet));
            events.extend(change);
            if let Some(err) = fatal {
                error!(%err, "merge failed, halting session");
                self.halted = true;
                events.push(SessionEvent::Fatal(err.into()));
                break;
            }
        }
        Ok(events)
    }

    /// Whether a fatal error stopped the session.
    pub fn is_halted(&self) -> bool {
        self.halted || self.decoder.is_poisoned()
    }

    /// Fold an update or delete packet into the table.
    ///
    /// Returns a summary of what changed and, unless merges are lenient, the
    /// merge failure that stopped the packet part way. Lenient failures are
    /// pushed as rejections.
    fn apply_to_world(
        &mut self,
        packet: &dyn Packet,
        events: &mut Vec<SessionEvent>,
    ) -> (Option<SessionEvent>, Option<WorldError>) {
        let mut changed = Vec::new();
        let mut removed = Vec::new();
        let mut fatal = None;

        if let Some(update) = packet.downcast_ref::<ObjectUpdatePacket>() {
            for object in &update.objects {
                if self.config.suppress_empty_updates && !object.has_data() {
                    continue;
                }
                match self.world.apply(object.clone()) {
                    Ok(outcome) if outcome.changed() => changed.push(object.id()),
                    Ok(_) => {}
                    Err(err) if self.config.lenient_merge => {
                        warn!(%err, "object update rejected");
                        events.push(SessionEvent::Rejected(err.into()));
                    }
                    Err(err) => {
                        fatal = Some(err);
                        break;
                    }
                }
            }
        } else if let Some(delete) = packet.downcast_ref::<ObjectDeletePacket>() {
            if self.world.remove(delete.id).is_some() {
                removed.push(delete.id);
            } else {
                debug!(id = delete.id, "delete for unknown object");
            }
        }

        let change = if changed.is_empty() && removed.is_empty() {
            None
        } else {
            Some(SessionEvent::ObjectsChanged { changed, removed })
        };
        (change, fatal)
    }

    /// Frame an outbound packet.
    pub fn encode(&self, packet: &dyn Packet) -> Result<Vec<u8>, PacketError> {
        let outgoing: Origin = self.config.outgoing_origin();
        if packet.origin() != outgoing {
            warn!(
                kind = packet.kind_name(),
                origin = %packet.origin(),
                "encoding a packet for the other direction"
            );
        }
        encode_packet(packet)
    }
}
