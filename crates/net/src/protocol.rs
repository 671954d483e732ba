//! Wire constants: packet type codes, sub-types and limits.
//!
//! Type codes are fixed by the game's protocol and are shared by both
//! directions; the registry keys them together with the packet origin.

/// Default upper bound on a frame's declared payload length (256 KB).
pub const MAX_FRAME_LEN: u32 = 262_144;

/// Upper bound on a string's character count.
pub const MAX_STRING_CHARS: usize = 32_768;

/// Core packet type codes.
pub mod type_code {
    /// Keep-alive; no payload.
    pub const HEARTBEAT: u32 = 0xf582_1226;
    /// Full-screen title message.
    pub const BIG_MESS: u32 = 0xee66_5279;
    /// Partial world object updates.
    pub const OBJECT_BIT_STREAM: u32 = 0x8080_3df9;
    /// World object removal.
    pub const OBJECT_DELETE: u32 = 0xcc5a_3e30;
    /// Server events, multiplexed by sub-type.
    pub const SIMPLE_EVENT: u32 = 0xf754_c8fe;
    /// Client commands with an integer argument, multiplexed by sub-type.
    pub const VALUE_INT: u32 = 0x4c82_1d3c;
    /// Client commands with a float argument, multiplexed by sub-type.
    pub const VALUE_FLOAT: u32 = 0x0351_a5ac;
}

/// Sub-types under [`type_code::SIMPLE_EVENT`].
pub mod simple_event {
    /// A jump drive has finished its jump.
    pub const JUMP_END: u8 = 0x0d;
}

/// Sub-types under [`type_code::VALUE_INT`].
pub mod value_int {
    /// Toggle red alert.
    pub const TOGGLE_RED_ALERT: u8 = 0x0a;
    /// Toggle reverse engines.
    pub const HELM_TOGGLE_REVERSE: u8 = 0x18;
}

/// Sub-types under [`type_code::VALUE_FLOAT`].
pub mod value_float {
    /// Single-seat craft pilot update.
    pub const SINGLE_SEAT_PILOT: u8 = 0x07;
}

/// Render a type code the way logs and keys show it.
pub fn format_type_code(type_code: u32) -> String {
    format!("{type_code:#010x}")
}
