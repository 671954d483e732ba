//! Shipped packet catalogue.

pub mod comm;
pub mod heartbeat;
pub mod helm;
pub mod object_delete;
pub mod object_update;
pub mod single_seat;
pub mod title;

pub use comm::ToggleRedAlertPacket;
pub use heartbeat::HeartbeatPacket;
pub use helm::{HelmToggleReversePacket, JumpEndPacket};
pub use object_delete::ObjectDeletePacket;
pub use object_update::{ObjectUpdatePacket, UpdateFields};
pub use single_seat::SingleSeatPilotPacket;
pub use title::TitlePacket;

use crate::error::PacketError;
use crate::protocol::type_code;
use crate::registry::PacketRegistry;
use artemis_core::Origin;

/// Register every shipped packet kind.
///
/// Multiplexed type codes are marked for both directions so frames with
/// unregistered sub-types still split at the right place.
pub fn register_core(registry: &mut PacketRegistry) -> Result<(), PacketError> {
    for code in [type_code::SIMPLE_EVENT, type_code::VALUE_INT, type_code::VALUE_FLOAT] {
        registry.mark_multiplexed(Origin::Client, code);
        registry.mark_multiplexed(Origin::Server, code);
    }

    registry.register_kind::<HeartbeatPacket>()?;
    registry.register_kind::<TitlePacket>()?;
    registry.register_kind::<JumpEndPacket>()?;
    registry.register_kind::<ObjectDeletePacket>()?;
    registry.register_kind::<ObjectUpdatePacket>()?;
    registry.register_kind::<ToggleRedAlertPacket>()?;
    registry.register_kind::<HelmToggleReversePacket>()?;
    registry.register_kind::<SingleSeatPilotPacket>()?;
    Ok(())
}
