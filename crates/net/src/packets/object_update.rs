//! Partial world object updates.
//!
//! Each entry is `[u8 kind][i32 id][u32 field bits][fields in bit order]`;
//! the list ends with a zero kind byte. Only fields whose bit is set are
//! present, which is what makes every decoded record partial.

use crate::codec::{FlagWord, PacketReader, PacketWriter};
use crate::error::PacketError;
use crate::packet::PacketKind;
use crate::protocol::type_code;
use artemis_core::{BeamFrequency, BoolState, ObjectKind, Origin};
use artemis_world::{
    ArtemisObject, BaseObject, NpcShip, PlayerShip, Sentinel, Shielded, Ship, MAX_SHIP_INDEX, MAX_SIDE, MAX_WARP,
};
use bitflags::bitflags;

bitflags! {
    /// Which fields an update entry carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UpdateFields: u32 {
        /// Display name (string).
        const NAME = 1 << 0;
        /// X coordinate.
        const X = 1 << 1;
        /// Y coordinate.
        const Y = 1 << 2;
        /// Z coordinate.
        const Z = 1 << 3;
        /// Fore shield strength.
        const SHIELDS_FRONT = 1 << 4;
        /// Aft shield strength.
        const SHIELDS_REAR = 1 << 5;
        /// Velocity.
        const VELOCITY = 1 << 6;
        /// Fore shield maximum.
        const SHIELDS_FRONT_MAX = 1 << 7;
        /// Aft shield maximum.
        const SHIELDS_REAR_MAX = 1 << 8;
        /// Resistance to beam frequency A.
        const SHIELD_FREQ_A = 1 << 9;
        /// Resistance to beam frequency B.
        const SHIELD_FREQ_B = 1 << 10;
        /// Resistance to beam frequency C.
        const SHIELD_FREQ_C = 1 << 11;
        /// Resistance to beam frequency D.
        const SHIELD_FREQ_D = 1 << 12;
        /// Resistance to beam frequency E.
        const SHIELD_FREQ_E = 1 << 13;
        /// Rudder position.
        const STEERING = 1 << 14;
        /// Top speed.
        const TOP_SPEED = 1 << 15;
        /// Turn rate.
        const TURN_RATE = 1 << 16;
        /// Impulse setting.
        const IMPULSE = 1 << 17;
        /// Side (i8).
        const SIDE = 1 << 18;
        /// Per-side visibility mask (u32).
        const VISIBILITY = 1 << 19;
        /// Player ship index (i8).
        const SHIP_INDEX = 1 << 20;
        /// Red alert (i32 tri-state).
        const RED_ALERT = 1 << 21;
        /// Reverse engines (i32 tri-state).
        const REVERSE = 1 << 22;
        /// Warp factor (i8).
        const WARP = 1 << 23;
        /// Energy reserves.
        const ENERGY = 1 << 24;
        /// Docking base id (i32).
        const DOCKING_BASE = 1 << 25;
        /// NPC status flags with known mask.
        const NPC_FLAGS = 1 << 26;

        /// Fields every object carries.
        const BASE = Self::NAME.bits() | Self::X.bits() | Self::Y.bits() | Self::Z.bits();
        /// Fields of shielded objects.
        const SHIELDED = Self::BASE.bits() | Self::SHIELDS_FRONT.bits() | Self::SHIELDS_REAR.bits();
        /// Fields of any ship.
        const SHIP = Self::SHIELDED.bits()
            | Self::VELOCITY.bits()
            | Self::SHIELDS_FRONT_MAX.bits()
            | Self::SHIELDS_REAR_MAX.bits()
            | Self::SHIELD_FREQS.bits()
            | Self::STEERING.bits()
            | Self::TOP_SPEED.bits()
            | Self::TURN_RATE.bits()
            | Self::IMPULSE.bits()
            | Self::SIDE.bits()
            | Self::VISIBILITY.bits();
        /// Fields of player ships.
        const PLAYER = Self::SHIP.bits()
            | Self::SHIP_INDEX.bits()
            | Self::RED_ALERT.bits()
            | Self::REVERSE.bits()
            | Self::WARP.bits()
            | Self::ENERGY.bits()
            | Self::DOCKING_BASE.bits();
        /// Fields of NPC ships.
        const NPC = Self::SHIP.bits() | Self::NPC_FLAGS.bits();
        /// All five shield frequency resistances.
        const SHIELD_FREQS = Self::SHIELD_FREQ_A.bits()
            | Self::SHIELD_FREQ_B.bits()
            | Self::SHIELD_FREQ_C.bits()
            | Self::SHIELD_FREQ_D.bits()
            | Self::SHIELD_FREQ_E.bits();
    }
}

impl UpdateFields {
    /// Fields an entry of `kind` may carry.
    pub fn allowed_for(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::PlayerShip => Self::PLAYER,
            ObjectKind::NpcShip => Self::NPC,
            ObjectKind::Base => Self::SHIELDED,
            _ => Self::BASE,
        }
    }

    /// Flag for one shield frequency slot.
    pub fn shield_freq(freq: BeamFrequency) -> Self {
        Self::from_bits_retain(Self::SHIELD_FREQ_A.bits() << freq.index())
    }
}

const NPC_ENEMY: u8 = 0;
const NPC_SURRENDERED: u8 = 1;
const NPC_IN_NEBULA: u8 = 2;

/// A batch of partial object updates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectUpdatePacket {
    /// Decoded partial records, in wire order.
    pub objects: Vec<ArtemisObject>,
}

impl ObjectUpdatePacket {
    /// Wrap a batch of partial records.
    pub fn new(objects: Vec<ArtemisObject>) -> Self {
        Self { objects }
    }
}

impl PacketKind for ObjectUpdatePacket {
    const ORIGIN: Origin = Origin::Server;
    const TYPE_CODE: u32 = type_code::OBJECT_BIT_STREAM;
    const NAME: &'static str = "ObjectUpdatePacket";

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, PacketError> {
        let mut objects = Vec::new();
        loop {
            let kind_byte = reader.read_u8()?;
            if kind_byte == ObjectKind::END_OF_OBJECTS {
                break;
            }
            let kind = ObjectKind::from_u8(kind_byte).ok_or(PacketError::InvalidValue {
                field: "object kind",
                value: i64::from(kind_byte),
            })?;
            objects.push(read_entry(reader, kind)?);
        }
        Ok(Self { objects })
    }

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        for object in &self.objects {
            write_entry(writer, object)?;
        }
        writer.write_u8(ObjectKind::END_OF_OBJECTS);
        Ok(())
    }

    fn describe(&self) -> String {
        let mut out = format!("{} objects", self.objects.len());
        for object in &self.objects {
            out.push_str(&format!(" {}#{}", object.kind(), object.id()));
        }
        out
    }
}

fn read_entry(reader: &mut PacketReader<'_>, kind: ObjectKind) -> Result<ArtemisObject, PacketError> {
    let id = reader.read_i32()?;
    let raw_bits = reader.read_u32()?;
    let fields = UpdateFields::from_bits(raw_bits)
        .filter(|fields| UpdateFields::allowed_for(kind).contains(*fields))
        .ok_or(PacketError::InvalidValue {
            field: "field bits",
            value: i64::from(raw_bits),
        })?;

    let mut object = ArtemisObject::new(kind, id);
    read_base(reader, fields, object.base_mut())?;
    match &mut object {
        ArtemisObject::Player(player) => {
            read_ship(reader, fields, &mut player.ship)?;
            read_player(reader, fields, player)?;
        }
        ArtemisObject::Npc(npc) => {
            read_ship(reader, fields, &mut npc.ship)?;
            read_npc(reader, fields, npc)?;
        }
        ArtemisObject::Station(station) => read_shielded(reader, fields, &mut station.shielded)?,
        ArtemisObject::Other(_) => {}
    }
    Ok(object)
}

fn read_f32_if(reader: &mut PacketReader<'_>, fields: UpdateFields, flag: UpdateFields) -> Result<f32, PacketError> {
    if fields.contains(flag) {
        reader.read_f32()
    } else {
        Ok(f32::UNSPECIFIED)
    }
}

/// Read a small enumerated value; the sentinel is not a legal wire value.
fn read_i8_in(reader: &mut PacketReader<'_>, field: &'static str, max: i8) -> Result<i8, PacketError> {
    let value = reader.read_i8()?;
    if (0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(PacketError::InvalidValue {
            field,
            value: i64::from(value),
        })
    }
}

fn read_base(reader: &mut PacketReader<'_>, fields: UpdateFields, base: &mut BaseObject) -> Result<(), PacketError> {
    if fields.contains(UpdateFields::NAME) {
        base.name = Some(reader.read_string()?);
    }
    base.x = read_f32_if(reader, fields, UpdateFields::X)?;
    base.y = read_f32_if(reader, fields, UpdateFields::Y)?;
    base.z = read_f32_if(reader, fields, UpdateFields::Z)?;
    Ok(())
}

// Only the shielded layer itself; the base layer is read by the caller.
fn read_shielded(reader: &mut PacketReader<'_>, fields: UpdateFields, shielded: &mut Shielded) -> Result<(), PacketError> {
    shielded.shields_front = read_f32_if(reader, fields, UpdateFields::SHIELDS_FRONT)?;
    shielded.shields_rear = read_f32_if(reader, fields, UpdateFields::SHIELDS_REAR)?;
    Ok(())
}

fn read_ship(reader: &mut PacketReader<'_>, fields: UpdateFields, ship: &mut Ship) -> Result<(), PacketError> {
    read_shielded(reader, fields, &mut ship.shielded)?;
    ship.velocity = read_f32_if(reader, fields, UpdateFields::VELOCITY)?;
    ship.shields_front_max = read_f32_if(reader, fields, UpdateFields::SHIELDS_FRONT_MAX)?;
    ship.shields_rear_max = read_f32_if(reader, fields, UpdateFields::SHIELDS_REAR_MAX)?;
    for freq in BeamFrequency::ALL {
        let value = read_f32_if(reader, fields, UpdateFields::shield_freq(freq))?;
        ship.set_shield_freq(freq, value);
    }
    ship.steering = read_f32_if(reader, fields, UpdateFields::STEERING)?;
    ship.top_speed = read_f32_if(reader, fields, UpdateFields::TOP_SPEED)?;
    ship.turn_rate = read_f32_if(reader, fields, UpdateFields::TURN_RATE)?;
    ship.impulse = read_f32_if(reader, fields, UpdateFields::IMPULSE)?;
    if fields.contains(UpdateFields::SIDE) {
        ship.set_side(read_i8_in(reader, "side", MAX_SIDE)?)?;
    }
    if fields.contains(UpdateFields::VISIBILITY) {
        ship.set_visibility_bits(Some(reader.read_u32()?));
    }
    Ok(())
}

fn read_player(reader: &mut PacketReader<'_>, fields: UpdateFields, player: &mut PlayerShip) -> Result<(), PacketError> {
    if fields.contains(UpdateFields::SHIP_INDEX) {
        player.set_ship_index(read_i8_in(reader, "ship index", MAX_SHIP_INDEX)?)?;
    }
    if fields.contains(UpdateFields::RED_ALERT) {
        player.red_alert = reader.read_bool_state()?;
    }
    if fields.contains(UpdateFields::REVERSE) {
        player.reverse = reader.read_bool_state()?;
    }
    if fields.contains(UpdateFields::WARP) {
        player.set_warp(read_i8_in(reader, "warp", MAX_WARP)?)?;
    }
    player.energy = read_f32_if(reader, fields, UpdateFields::ENERGY)?;
    if fields.contains(UpdateFields::DOCKING_BASE) {
        let base = reader.read_i32()?;
        if base < 0 {
            return Err(PacketError::InvalidValue {
                field: "docking base",
                value: i64::from(base),
            });
        }
        player.docking_base = base;
    }
    Ok(())
}

fn read_npc(reader: &mut PacketReader<'_>, fields: UpdateFields, npc: &mut NpcShip) -> Result<(), PacketError> {
    if fields.contains(UpdateFields::NPC_FLAGS) {
        let flags = reader.read_flag_word(true)?;
        npc.enemy = flags.get(NPC_ENEMY);
        npc.surrendered = flags.get(NPC_SURRENDERED);
        npc.in_nebula = flags.get(NPC_IN_NEBULA);
    }
    Ok(())
}

fn set_if(fields: &mut UpdateFields, flag: UpdateFields, specified: bool) {
    fields.set(flag, specified);
}

fn base_fields(base: &BaseObject) -> UpdateFields {
    let mut fields = UpdateFields::empty();
    set_if(&mut fields, UpdateFields::NAME, base.name.is_specified());
    set_if(&mut fields, UpdateFields::X, base.x.is_specified());
    set_if(&mut fields, UpdateFields::Y, base.y.is_specified());
    set_if(&mut fields, UpdateFields::Z, base.z.is_specified());
    fields
}

fn shielded_fields(shielded: &Shielded) -> UpdateFields {
    let mut fields = base_fields(&shielded.base);
    set_if(&mut fields, UpdateFields::SHIELDS_FRONT, shielded.shields_front.is_specified());
    set_if(&mut fields, UpdateFields::SHIELDS_REAR, shielded.shields_rear.is_specified());
    fields
}

fn ship_fields(ship: &Ship) -> UpdateFields {
    let mut fields = shielded_fields(&ship.shielded);
    set_if(&mut fields, UpdateFields::VELOCITY, ship.velocity.is_specified());
    set_if(&mut fields, UpdateFields::SHIELDS_FRONT_MAX, ship.shields_front_max.is_specified());
    set_if(&mut fields, UpdateFields::SHIELDS_REAR_MAX, ship.shields_rear_max.is_specified());
    for freq in BeamFrequency::ALL {
        set_if(
            &mut fields,
            UpdateFields::shield_freq(freq),
            ship.shield_freq(freq).is_specified(),
        );
    }
    set_if(&mut fields, UpdateFields::STEERING, ship.steering.is_specified());
    set_if(&mut fields, UpdateFields::TOP_SPEED, ship.top_speed.is_specified());
    set_if(&mut fields, UpdateFields::TURN_RATE, ship.turn_rate.is_specified());
    set_if(&mut fields, UpdateFields::IMPULSE, ship.impulse.is_specified());
    set_if(&mut fields, UpdateFields::SIDE, ship.side().is_specified());
    set_if(&mut fields, UpdateFields::VISIBILITY, ship.visibility_bits().is_some());
    fields
}

fn npc_flags(npc: &NpcShip) -> FlagWord {
    let mut flags = FlagWord::with_known_mask();
    flags.set(NPC_ENEMY, npc.enemy);
    flags.set(NPC_SURRENDERED, npc.surrendered);
    flags.set(NPC_IN_NEBULA, npc.in_nebula);
    flags
}

/// Fields an encoder would emit for `object`.
pub fn specified_fields(object: &ArtemisObject) -> UpdateFields {
    match object {
        ArtemisObject::Player(player) => {
            let mut fields = ship_fields(&player.ship);
            set_if(&mut fields, UpdateFields::SHIP_INDEX, player.ship_index().is_specified());
            set_if(&mut fields, UpdateFields::RED_ALERT, player.red_alert.is_specified());
            set_if(&mut fields, UpdateFields::REVERSE, player.reverse.is_specified());
            set_if(&mut fields, UpdateFields::WARP, player.warp().is_specified());
            set_if(&mut fields, UpdateFields::ENERGY, player.energy.is_specified());
            set_if(&mut fields, UpdateFields::DOCKING_BASE, player.docking_base.is_specified());
            fields
        }
        ArtemisObject::Npc(npc) => {
            let mut fields = ship_fields(&npc.ship);
            set_if(&mut fields, UpdateFields::NPC_FLAGS, npc_flags(npc).any_known());
            fields
        }
        ArtemisObject::Station(station) => shielded_fields(&station.shielded),
        ArtemisObject::Other(base) => base_fields(base),
    }
}

fn write_f32_if(writer: &mut PacketWriter, fields: UpdateFields, flag: UpdateFields, value: f32) {
    if fields.contains(flag) {
        writer.write_f32(value);
    }
}

fn write_entry(writer: &mut PacketWriter, object: &ArtemisObject) -> Result<(), PacketError> {
    // A shielded kind in a bare record would decode back into its full shape.
    if let ArtemisObject::Other(base) = object {
        if base.kind().is_shielded() {
            return Err(PacketError::InvalidValue {
                field: "object kind",
                value: i64::from(base.kind().as_u8()),
            });
        }
    }

    let fields = specified_fields(object);
    writer
        .write_u8(object.kind().as_u8())
        .write_i32(object.id())
        .write_u32(fields.bits());

    let base = object.base();
    if let Some(name) = &base.name {
        writer.write_string(name)?;
    }
    write_f32_if(writer, fields, UpdateFields::X, base.x);
    write_f32_if(writer, fields, UpdateFields::Y, base.y);
    write_f32_if(writer, fields, UpdateFields::Z, base.z);

    if let Some(shielded) = object.as_shielded() {
        write_f32_if(writer, fields, UpdateFields::SHIELDS_FRONT, shielded.shields_front);
        write_f32_if(writer, fields, UpdateFields::SHIELDS_REAR, shielded.shields_rear);
    }

    if let Some(ship) = object.as_ship() {
        write_f32_if(writer, fields, UpdateFields::VELOCITY, ship.velocity);
        write_f32_if(writer, fields, UpdateFields::SHIELDS_FRONT_MAX, ship.shields_front_max);
        write_f32_if(writer, fields, UpdateFields::SHIELDS_REAR_MAX, ship.shields_rear_max);
        for freq in BeamFrequency::ALL {
            write_f32_if(writer, fields, UpdateFields::shield_freq(freq), ship.shield_freq(freq));
        }
        write_f32_if(writer, fields, UpdateFields::STEERING, ship.steering);
        write_f32_if(writer, fields, UpdateFields::TOP_SPEED, ship.top_speed);
        write_f32_if(writer, fields, UpdateFields::TURN_RATE, ship.turn_rate);
        write_f32_if(writer, fields, UpdateFields::IMPULSE, ship.impulse);
        if fields.contains(UpdateFields::SIDE) {
            writer.write_i8(ship.side());
        }
        if let Some(bits) = ship.visibility_bits() {
            writer.write_u32(bits);
        }
    }

    if let Some(player) = object.as_player() {
        if fields.contains(UpdateFields::SHIP_INDEX) {
            writer.write_i8(player.ship_index());
        }
        if fields.contains(UpdateFields::RED_ALERT) {
            writer.write_bool_state(player.red_alert);
        }
        if fields.contains(UpdateFields::REVERSE) {
            writer.write_bool_state(player.reverse);
        }
        if fields.contains(UpdateFields::WARP) {
            writer.write_i8(player.warp());
        }
        write_f32_if(writer, fields, UpdateFields::ENERGY, player.energy);
        if fields.contains(UpdateFields::DOCKING_BASE) {
            writer.write_i32(player.docking_base);
        }
    }

    if let Some(npc) = object.as_npc() {
        if fields.contains(UpdateFields::NPC_FLAGS) {
            writer.write_flag_word(&npc_flags(npc), true);
        }
    }
    Ok(())
}
