//! Fuzz-style property tests for the packet codec
//!
//! These tests validate that decoders handle arbitrary network input
//! gracefully and that every shipped payload survives a round trip.

use artemis_core::{BeamFrequency, BoolState, ObjectKind, Origin};
use artemis_net::packets::object_update::specified_fields;
use artemis_net::packets::{
    HelmToggleReversePacket, ObjectDeletePacket, ObjectUpdatePacket, SingleSeatPilotPacket, TitlePacket, UpdateFields,
};
use artemis_net::{
    decode_header, encode_header, encode_packet, Packet, PacketDecoder, PacketReader, PacketRegistry, PacketWriter,
};
use artemis_world::{ArtemisObject, BaseObject, NpcShip, PlayerShip, Shielded, Ship, Station};
use proptest::prelude::*;
use std::sync::Arc;

fn decode_one(origin: Origin, frame: &[u8]) -> Box<dyn Packet> {
    let registry = PacketRegistry::core().unwrap();
    registry.decode_frame(origin, frame).unwrap()
}

fn tri_state() -> impl Strategy<Value = BoolState> {
    prop_oneof![
        Just(BoolState::True),
        Just(BoolState::False),
        Just(BoolState::Unknown),
    ]
}

/// Finite float or the NaN sentinel.
fn maybe_f32() -> impl Strategy<Value = f32> {
    prop_oneof![Just(f32::NAN), -1.0e6f32..1.0e6f32]
}

/// Base and shield values shared by every record shape.
#[derive(Debug, Clone)]
struct CommonValues {
    name: Option<String>,
    position: [f32; 3],
    shields: [f32; 2],
}

impl CommonValues {
    fn apply_base(&self, base: &mut BaseObject) {
        base.name = self.name.clone();
        base.x = self.position[0];
        base.y = self.position[1];
        base.z = self.position[2];
    }

    fn apply_shielded(&self, shielded: &mut Shielded) {
        self.apply_base(&mut shielded.base);
        shielded.shields_front = self.shields[0];
        shielded.shields_rear = self.shields[1];
    }
}

prop_compose! {
    fn common_values()(
        name in proptest::option::of("[a-zA-Z0-9 ]{0,12}"),
        position in prop::array::uniform3(maybe_f32()),
        shields in prop::array::uniform2(maybe_f32()),
    ) -> CommonValues {
        CommonValues { name, position, shields }
    }
}

/// Ship-level values, applied after the shared ones.
#[derive(Debug, Clone)]
struct ShipValues {
    common: CommonValues,
    velocity: f32,
    shield_max: [f32; 2],
    shield_freqs: [f32; BeamFrequency::COUNT],
    handling: [f32; 4],
    side: i8,
    visibility: Option<u32>,
}

impl ShipValues {
    fn apply(&self, ship: &mut Ship) {
        self.common.apply_shielded(&mut ship.shielded);
        ship.velocity = self.velocity;
        ship.shields_front_max = self.shield_max[0];
        ship.shields_rear_max = self.shield_max[1];
        for freq in BeamFrequency::ALL {
            ship.set_shield_freq(freq, self.shield_freqs[freq.index()]);
        }
        ship.steering = self.handling[0];
        ship.top_speed = self.handling[1];
        ship.turn_rate = self.handling[2];
        ship.impulse = self.handling[3];
        ship.set_side(self.side).unwrap();
        ship.set_visibility_bits(self.visibility);
    }
}

prop_compose! {
    fn ship_values()(
        common in common_values(),
        velocity in maybe_f32(),
        shield_max in prop::array::uniform2(maybe_f32()),
        shield_freqs in prop::array::uniform5(maybe_f32()),
        handling in prop::array::uniform4(maybe_f32()),
        side in -1i8..=31,
        visibility in proptest::option::of(any::<u32>()),
    ) -> ShipValues {
        ShipValues { common, velocity, shield_max, shield_freqs, handling, side, visibility }
    }
}

prop_compose! {
    fn player_ship()(
        id in any::<i32>(),
        values in ship_values(),
        ship_index in -1i8..=7,
        red_alert in tri_state(),
        reverse in tri_state(),
        warp in -1i8..=4,
        energy in maybe_f32(),
        docking_base in prop_oneof![Just(-1i32), 0i32..10_000],
    ) -> ArtemisObject {
        let mut player = PlayerShip::new(id);
        values.apply(&mut player.ship);
        player.set_ship_index(ship_index).unwrap();
        player.red_alert = red_alert;
        player.reverse = reverse;
        player.set_warp(warp).unwrap();
        player.energy = energy;
        player.docking_base = docking_base;
        player.into()
    }
}

prop_compose! {
    fn npc_ship()(
        id in any::<i32>(),
        values in ship_values(),
        enemy in tri_state(),
        surrendered in tri_state(),
        in_nebula in tri_state(),
    ) -> ArtemisObject {
        let mut npc = NpcShip::new(id);
        values.apply(&mut npc.ship);
        npc.enemy = enemy;
        npc.surrendered = surrendered;
        npc.in_nebula = in_nebula;
        npc.into()
    }
}

prop_compose! {
    fn station()(id in any::<i32>(), common in common_values()) -> ArtemisObject {
        let mut station = Station::new(id);
        common.apply_shielded(&mut station.shielded);
        station.into()
    }
}

/// Kinds stored as bare base records.
const UNSHIELDED_KINDS: [ObjectKind; 9] = [
    ObjectKind::Mine,
    ObjectKind::Anomaly,
    ObjectKind::Nebula,
    ObjectKind::Torpedo,
    ObjectKind::BlackHole,
    ObjectKind::Asteroid,
    ObjectKind::GenericMesh,
    ObjectKind::Creature,
    ObjectKind::Drone,
];

prop_compose! {
    fn unshielded_object()(
        id in any::<i32>(),
        kind in prop::sample::select(UNSHIELDED_KINDS.to_vec()),
        common in common_values(),
    ) -> ArtemisObject {
        let mut object = ArtemisObject::new(kind, id);
        common.apply_base(object.base_mut());
        object
    }
}

fn any_object() -> impl Strategy<Value = ArtemisObject> {
    prop_oneof![player_ship(), npc_ship(), station(), unshielded_object()]
}

proptest! {
    /// Property: Arbitrary bytes don't crash the stream decoder
    #[test]
    fn arbitrary_bytes_dont_crash_stream(
        random_bytes in prop::collection::vec(any::<u8>(), 0..2000),
        origin in prop_oneof![Just(Origin::Client), Just(Origin::Server)],
    ) {
        let registry = Arc::new(PacketRegistry::core().unwrap());
        let mut decoder = PacketDecoder::new(registry, origin).with_max_frame_len(4096);
        decoder.feed(&random_bytes);
        let _results = decoder.drain();
        // No panic = success
    }

    /// Property: Arbitrary payloads don't crash any registered decoder
    #[test]
    fn arbitrary_payloads_dont_crash_decoders(
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let registry = PacketRegistry::core().unwrap();
        for key in registry.keys() {
            let factory = registry.lookup(key.origin, key.type_code, key.sub_type).unwrap();
            let mut reader = PacketReader::new(&payload);
            let _result = factory.build(&mut reader);
        }
    }

    /// Property: Frame header length always equals payload length
    #[test]
    fn frame_length_matches_payload(
        type_code in any::<u32>(),
        sub_type in proptest::option::of(any::<u8>()),
        payload in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let frame = encode_header(type_code, sub_type, &payload).unwrap();
        let (header, body) = decode_header(&frame, |_| sub_type.is_some()).unwrap();
        prop_assert_eq!(header.length as usize, payload.len());
        prop_assert_eq!(header.type_code, type_code);
        prop_assert_eq!(header.sub_type, sub_type);
        prop_assert_eq!(body, payload.as_slice());
    }

    /// Property: Title packets roundtrip
    #[test]
    fn title_roundtrips(
        title in "\\PC{0,40}",
        subtitle1 in "\\PC{0,40}",
        subtitle2 in "\\PC{0,40}",
    ) {
        let packet = TitlePacket::new(title, subtitle1, subtitle2);
        let frame = encode_packet(&packet).unwrap();
        let decoded = decode_one(Origin::Server, &frame);
        prop_assert_eq!(decoded.downcast_ref::<TitlePacket>(), Some(&packet));
    }

    /// Property: Object deletes roundtrip
    #[test]
    fn object_delete_roundtrips(
        id in any::<i32>(),
        kind in prop::sample::select(vec![ObjectKind::Mine, ObjectKind::NpcShip, ObjectKind::Base]),
    ) {
        let packet = ObjectDeletePacket::new(kind, id);
        let frame = encode_packet(&packet).unwrap();
        let decoded = decode_one(Origin::Server, &frame);
        prop_assert_eq!(decoded.downcast_ref::<ObjectDeletePacket>(), Some(&packet));
    }

    /// Property: Single-seat pilot updates roundtrip byte-for-byte
    #[test]
    fn single_seat_roundtrips(
        id in any::<i32>(),
        rudder in 0.0f32..=1.0,
        pos in prop::array::uniform3(-1.0e5f32..1.0e5),
        unknown in any::<[u8; 4]>(),
    ) {
        let mut packet = SingleSeatPilotPacket::new(id);
        packet.rudder = rudder;
        packet.x = pos[0];
        packet.y = pos[1];
        packet.z = pos[2];
        let mut frame = encode_packet(&packet).unwrap();
        // Offset of the opaque field: 9-byte header, rudder, id.
        frame[17..21].copy_from_slice(&unknown);

        let decoded = decode_one(Origin::Client, &frame);
        let pilot = decoded.downcast_ref::<SingleSeatPilotPacket>().unwrap();
        prop_assert_eq!(pilot.unknown().bytes(), &unknown);
        prop_assert_eq!(pilot.object_id, id);
        prop_assert_eq!(encode_packet(pilot).unwrap(), frame);
    }

    /// Property: Object updates roundtrip including sentinels
    #[test]
    fn object_update_roundtrips(
        objects in prop::collection::vec(any_object(), 0..6),
    ) {
        let packet = ObjectUpdatePacket::new(objects);
        let frame = encode_packet(&packet).unwrap();
        let decoded = decode_one(Origin::Server, &frame);
        prop_assert_eq!(decoded.downcast_ref::<ObjectUpdatePacket>(), Some(&packet));
    }
}

#[test]
fn fully_specified_ships_use_every_field_bit() {
    let common = CommonValues {
        name: Some("Artemis".to_string()),
        position: [1.0, 2.0, 3.0],
        shields: [4.0, 5.0],
    };
    let values = ShipValues {
        common,
        velocity: 0.5,
        shield_max: [80.0, 90.0],
        shield_freqs: [0.1, 0.2, 0.3, 0.4, 0.5],
        handling: [0.5, 1.0, 0.2, 0.7],
        side: 2,
        visibility: Some(0b101),
    };

    let mut player = PlayerShip::new(1);
    values.apply(&mut player.ship);
    player.set_ship_index(3).unwrap();
    player.red_alert = BoolState::True;
    player.reverse = BoolState::False;
    player.set_warp(2).unwrap();
    player.energy = 900.0;
    player.docking_base = 12;

    let mut npc = NpcShip::new(2);
    values.apply(&mut npc.ship);
    npc.enemy = BoolState::True;
    npc.surrendered = BoolState::False;
    npc.in_nebula = BoolState::True;

    let player = ArtemisObject::from(player);
    let npc = ArtemisObject::from(npc);
    assert_eq!(specified_fields(&player), UpdateFields::allowed_for(ObjectKind::PlayerShip));
    assert_eq!(specified_fields(&npc), UpdateFields::allowed_for(ObjectKind::NpcShip));
    assert_eq!(specified_fields(&player) | specified_fields(&npc), UpdateFields::all());

    let packet = ObjectUpdatePacket::new(vec![player, npc]);
    let decoded = decode_one(Origin::Server, &encode_packet(&packet).unwrap());
    assert_eq!(decoded.downcast_ref::<ObjectUpdatePacket>(), Some(&packet));
}

#[test]
fn helm_reverse_reencodes_unknown_bytes() {
    let frame = encode_packet(&HelmToggleReversePacket::new()).unwrap();
    let mut patched = frame.clone();
    patched[9..13].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

    let decoded = decode_one(Origin::Client, &patched);
    assert!(decoded.is::<HelmToggleReversePacket>());
    assert_eq!(encode_packet(decoded.as_ref()).unwrap(), patched);
}

#[test]
fn payload_writer_is_reusable_for_raw_frames() {
    let mut writer = PacketWriter::new();
    writer.write_u8(0);
    let frame = encode_header(artemis_net::protocol::type_code::OBJECT_BIT_STREAM, None, writer.as_slice()).unwrap();
    let decoded = decode_one(Origin::Server, &frame);
    let update = decoded.downcast_ref::<ObjectUpdatePacket>().unwrap();
    assert!(update.objects.is_empty());
}
