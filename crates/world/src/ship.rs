//! Ship records: the shared ship layer plus player and NPC vessels.

use crate::object::{put_prop, Fields, Props, Shielded};
use crate::sentinel::{
    any_specified, check_range, field_eq, merge_field, merge_slots, slots_eq, Sentinel,
};
use crate::WorldError;
use artemis_core::{BeamFrequency, BoolState, ObjectId, ObjectKind, MAX_SIDES};

/// Highest legal side number.
pub const MAX_SIDE: i8 = (MAX_SIDES - 1) as i8;

/// Highest legal warp factor.
pub const MAX_WARP: i8 = 4;

/// Highest legal player ship index.
pub const MAX_SHIP_INDEX: i8 = 7;

/// Fields shared by player and NPC ships.
#[derive(Debug, Clone)]
pub struct Ship {
    /// Embedded shielded record.
    pub shielded: Shielded,
    /// Current speed, 0.0 all stop to 1.0 full. Unspecified: NaN.
    pub velocity: f32,
    /// Maximum forward shield strength. Unspecified: NaN.
    pub shields_front_max: f32,
    /// Maximum aft shield strength. Unspecified: NaN.
    pub shields_rear_max: f32,
    /// Rudder, 0.0 hard to port, 0.5 amidships, 1.0 hard to starboard.
    /// Unspecified: NaN.
    pub steering: f32,
    /// Top speed. Unspecified: NaN.
    pub top_speed: f32,
    /// Maximum turn rate. Unspecified: NaN.
    pub turn_rate: f32,
    /// Impulse slider, 0.0 to 1.0. Unspecified: NaN.
    pub impulse: f32,
    shield_freqs: [f32; BeamFrequency::COUNT],
    side: i8,
    visibility: Option<u32>,
}

impl Ship {
    pub(crate) fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            shielded: Shielded::new(id, kind),
            velocity: f32::UNSPECIFIED,
            shields_front_max: f32::UNSPECIFIED,
            shields_rear_max: f32::UNSPECIFIED,
            steering: f32::UNSPECIFIED,
            top_speed: f32::UNSPECIFIED,
            turn_rate: f32::UNSPECIFIED,
            impulse: f32::UNSPECIFIED,
            shield_freqs: [f32::UNSPECIFIED; BeamFrequency::COUNT],
            side: i8::UNSPECIFIED,
            visibility: None,
        }
    }

    /// Shield resistance to `freq`, 0.0 to 1.0. Unspecified: NaN.
    pub fn shield_freq(&self, freq: BeamFrequency) -> f32 {
        self.shield_freqs[freq.index()]
    }

    /// Set shield resistance to `freq`; NaN marks it unspecified.
    pub fn set_shield_freq(&mut self, freq: BeamFrequency, value: f32) {
        self.shield_freqs[freq.index()] = value;
    }

    /// All five shield resistances in frequency order.
    pub fn shield_freqs(&self) -> &[f32; BeamFrequency::COUNT] {
        &self.shield_freqs
    }

    /// The side this ship is on. There is no side 0 in play, but the
    /// protocol allows it. Unspecified: -1.
    pub fn side(&self) -> i8 {
        self.side
    }

    /// Set the side; -1 marks it unspecified.
    pub fn set_side(&mut self, side: i8) -> Result<(), WorldError> {
        self.side = check_range("side", side, MAX_SIDE)?;
        Ok(())
    }

    /// Whether this ship shows on map screens of `side`.
    ///
    /// `Unknown` until a visibility mask has been observed.
    pub fn visibility(&self, side: u8) -> BoolState {
        match self.visibility {
            None => BoolState::Unknown,
            Some(_) if side >= MAX_SIDES => BoolState::Unknown,
            Some(bits) => BoolState::from(bits & (1 << side) != 0),
        }
    }

    /// Mark this ship visible or hidden to `side`.
    ///
    /// Creates the mask if absent. `false` clears the side's bit in this
    /// record only; merging never clears bits in the accumulated state.
    pub fn set_visibility(&mut self, side: u8, visible: bool) -> Result<(), WorldError> {
        if side >= MAX_SIDES {
            return Err(WorldError::OutOfRange {
                field: "visibility side",
                value: i64::from(side),
            });
        }
        let bits = self.visibility.get_or_insert(0);
        if visible {
            *bits |= 1 << side;
        } else {
            *bits &= !(1 << side);
        }
        Ok(())
    }

    /// Raw visibility mask. Unspecified: `None`.
    pub fn visibility_bits(&self) -> Option<u32> {
        self.visibility
    }

    /// Replace the raw visibility mask.
    pub fn set_visibility_bits(&mut self, bits: Option<u32>) {
        self.visibility = bits;
    }
}

impl Fields for Ship {
    fn merge_from(&mut self, update: &Self) {
        self.shielded.merge_from(&update.shielded);
        merge_field(&mut self.velocity, &update.velocity);
        merge_field(&mut self.shields_front_max, &update.shields_front_max);
        merge_field(&mut self.shields_rear_max, &update.shields_rear_max);
        merge_field(&mut self.steering, &update.steering);
        merge_field(&mut self.top_speed, &update.top_speed);
        merge_field(&mut self.turn_rate, &update.turn_rate);
        merge_field(&mut self.impulse, &update.impulse);
        merge_field(&mut self.side, &update.side);
        merge_slots(&mut self.shield_freqs, &update.shield_freqs);

        // OR-accumulate only.
        if let Some(bits) = update.visibility {
            *self.visibility.get_or_insert(0) |= bits;
        }
    }

    fn has_data(&self) -> bool {
        self.shielded.has_data()
            || self.velocity.is_specified()
            || self.shields_front_max.is_specified()
            || self.shields_rear_max.is_specified()
            || self.steering.is_specified()
            || self.top_speed.is_specified()
            || self.turn_rate.is_specified()
            || self.impulse.is_specified()
            || self.side.is_specified()
            || self.visibility.is_specified()
            || any_specified(&self.shield_freqs)
    }

    fn append_props(&self, props: &mut Props) {
        self.shielded.append_props(props);
        put_prop(props, "Velocity", &self.velocity);
        put_prop(props, "Shields: fore max", &self.shields_front_max);
        put_prop(props, "Shields: aft max", &self.shields_rear_max);
        for freq in BeamFrequency::ALL {
            put_prop(
                props,
                format!("Shield frequency {}", freq.as_str()),
                &self.shield_freq(freq),
            );
        }
        put_prop(props, "Rudder", &self.steering);
        put_prop(props, "Top speed", &self.top_speed);
        put_prop(props, "Turn rate", &self.turn_rate);
        put_prop(props, "Impulse", &self.impulse);
        put_prop(props, "Side", &self.side);
        if let Some(bits) = self.visibility {
            props.insert("Visibility".into(), format!("{bits:#010x}"));
        }
    }
}

impl PartialEq for Ship {
    fn eq(&self, other: &Self) -> bool {
        self.shielded == other.shielded
            && field_eq(&self.velocity, &other.velocity)
            && field_eq(&self.shields_front_max, &other.shields_front_max)
            && field_eq(&self.shields_rear_max, &other.shields_rear_max)
            && field_eq(&self.steering, &other.steering)
            && field_eq(&self.top_speed, &other.top_speed)
            && field_eq(&self.turn_rate, &other.turn_rate)
            && field_eq(&self.impulse, &other.impulse)
            && slots_eq(&self.shield_freqs, &other.shield_freqs)
            && self.side == other.side
            && self.visibility == other.visibility
    }
}

/// A crewed vessel.
#[derive(Debug, Clone)]
pub struct PlayerShip {
    /// Embedded ship record.
    pub ship: Ship,
    /// Red alert status. Unspecified: `Unknown`.
    pub red_alert: BoolState,
    /// Whether the engines are reversed. Unspecified: `Unknown`.
    pub reverse: BoolState,
    /// Remaining energy. Unspecified: NaN.
    pub energy: f32,
    /// Id of the station the ship is docked with. Unspecified: -1.
    pub docking_base: i32,
    ship_index: i8,
    warp: i8,
}

impl PlayerShip {
    /// Create a player ship with every field unspecified.
    pub fn new(id: ObjectId) -> Self {
        Self {
            ship: Ship::new(id, ObjectKind::PlayerShip),
            red_alert: BoolState::UNSPECIFIED,
            reverse: BoolState::UNSPECIFIED,
            energy: f32::UNSPECIFIED,
            docking_base: i32::UNSPECIFIED,
            ship_index: i8::UNSPECIFIED,
            warp: i8::UNSPECIFIED,
        }
    }

    /// Bridge slot of this ship, 0 to 7. Unspecified: -1.
    pub fn ship_index(&self) -> i8 {
        self.ship_index
    }

    /// Set the bridge slot; -1 marks it unspecified.
    pub fn set_ship_index(&mut self, index: i8) -> Result<(), WorldError> {
        self.ship_index = check_range("ship index", index, MAX_SHIP_INDEX)?;
        Ok(())
    }

    /// Warp factor, 0 to 4. Unspecified: -1.
    pub fn warp(&self) -> i8 {
        self.warp
    }

    /// Set the warp factor; -1 marks it unspecified.
    pub fn set_warp(&mut self, warp: i8) -> Result<(), WorldError> {
        self.warp = check_range("warp", warp, MAX_WARP)?;
        Ok(())
    }
}

impl Fields for PlayerShip {
    fn merge_from(&mut self, update: &Self) {
        self.ship.merge_from(&update.ship);
        merge_field(&mut self.red_alert, &update.red_alert);
        merge_field(&mut self.reverse, &update.reverse);
        merge_field(&mut self.energy, &update.energy);
        merge_field(&mut self.docking_base, &update.docking_base);
        merge_field(&mut self.ship_index, &update.ship_index);
        merge_field(&mut self.warp, &update.warp);
    }

    fn has_data(&self) -> bool {
        self.ship.has_data()
            || self.red_alert.is_specified()
            || self.reverse.is_specified()
            || self.energy.is_specified()
            || self.docking_base.is_specified()
            || self.ship_index.is_specified()
            || self.warp.is_specified()
    }

    fn append_props(&self, props: &mut Props) {
        self.ship.append_props(props);
        put_prop(props, "Ship index", &self.ship_index);
        put_prop(props, "Red alert", &self.red_alert);
        put_prop(props, "Reverse", &self.reverse);
        put_prop(props, "Warp", &self.warp);
        put_prop(props, "Energy", &self.energy);
        put_prop(props, "Docking base", &self.docking_base);
    }
}

impl PartialEq for PlayerShip {
    fn eq(&self, other: &Self) -> bool {
        self.ship == other.ship
            && self.red_alert == other.red_alert
            && self.reverse == other.reverse
            && field_eq(&self.energy, &other.energy)
            && self.docking_base == other.docking_base
            && self.ship_index == other.ship_index
            && self.warp == other.warp
    }
}

/// A computer-controlled vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcShip {
    /// Embedded ship record.
    pub ship: Ship,
    /// Hostile to the players. Unspecified: `Unknown`.
    pub enemy: BoolState,
    /// Has surrendered. Unspecified: `Unknown`.
    pub surrendered: BoolState,
    /// Inside a nebula. Unspecified: `Unknown`.
    pub in_nebula: BoolState,
}

impl NpcShip {
    /// Create an NPC ship with every field unspecified.
    pub fn new(id: ObjectId) -> Self {
        Self {
            ship: Ship::new(id, ObjectKind::NpcShip),
            enemy: BoolState::UNSPECIFIED,
            surrendered: BoolState::UNSPECIFIED,
            in_nebula: BoolState::UNSPECIFIED,
        }
    }
}

impl Fields for NpcShip {
    fn merge_from(&mut self, update: &Self) {
        self.ship.merge_from(&update.ship);
        merge_field(&mut self.enemy, &update.enemy);
        merge_field(&mut self.surrendered, &update.surrendered);
        merge_field(&mut self.in_nebula, &update.in_nebula);
    }

    fn has_data(&self) -> bool {
        self.ship.has_data()
            || self.enemy.is_specified()
            || self.surrendered.is_specified()
            || self.in_nebula.is_specified()
    }

    fn append_props(&self, props: &mut Props) {
        self.ship.append_props(props);
        put_prop(props, "Enemy", &self.enemy);
        put_prop(props, "Surrendered", &self.surrendered);
        put_prop(props, "In nebula", &self.in_nebula);
    }
}
