//! End-to-end: bytes in, merged world out.

use artemis_core::{BoolState, ObjectKind, Origin};
use artemis_link::{ClientSession, LinkConfig, SessionError, SessionEvent};
use artemis_net::packets::{ObjectDeletePacket, ObjectUpdatePacket, SingleSeatPilotPacket, TitlePacket};
use artemis_net::{encode_header, encode_packet, PacketError};
use artemis_testkit::init_test_tracing;
use artemis_world::{ArtemisObject, NpcShip, PlayerShip, Station, WorldError};

fn session() -> ClientSession {
    init_test_tracing();
    ClientSession::new(LinkConfig::default()).expect("core registry")
}

fn update(objects: Vec<ArtemisObject>) -> Vec<u8> {
    encode_packet(&ObjectUpdatePacket::new(objects)).unwrap()
}

fn changed_ids(events: &[SessionEvent]) -> Vec<i32> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::ObjectsChanged { changed, .. } => Some(changed.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

#[test]
fn partial_updates_accumulate() {
    let mut session = session();

    let mut first = PlayerShip::new(1001);
    first.ship.set_side(3).unwrap();
    let events = session.receive(&update(vec![first.into()])).unwrap();
    assert_eq!(changed_ids(&events), vec![1001]);

    let mut second = PlayerShip::new(1001);
    second.ship.velocity = 0.75;
    session.receive(&update(vec![second.into()])).unwrap();

    let player = session.world().get(1001).and_then(ArtemisObject::as_player).unwrap();
    assert_eq!(player.ship.side(), 3);
    assert_eq!(player.ship.velocity, 0.75);
}

#[test]
fn split_delivery_matches_whole_delivery() {
    let mut npc = NpcShip::new(7);
    npc.enemy = BoolState::True;
    npc.ship.set_visibility(2, true).unwrap();
    let mut station = Station::new(8);
    station.shielded.shields_front = 50.0;
    let bytes = update(vec![npc.into(), station.into()]);

    let mut whole = session();
    whole.receive(&bytes).unwrap();

    let mut split = session();
    for chunk in bytes.chunks(3) {
        split.receive(chunk).unwrap();
    }
    assert_eq!(split.buffered(), 0);
    assert_eq!(whole.world().get(7), split.world().get(7));
    assert_eq!(whole.world().get(8), split.world().get(8));
    assert_eq!(split.world().get(7).unwrap().as_ship().unwrap().visibility(2), BoolState::True);
}

#[test]
fn empty_updates_are_suppressed() {
    let mut session = session();
    let events = session
        .receive(&update(vec![ArtemisObject::new(ObjectKind::Mine, 5)]))
        .unwrap();
    assert!(session.world().is_empty());
    assert!(changed_ids(&events).is_empty());
}

#[test]
fn empty_updates_create_records_when_not_suppressed() {
    let config = LinkConfig {
        suppress_empty_updates: false,
        ..LinkConfig::default()
    };
    let mut session = ClientSession::new(config).unwrap();
    session
        .receive(&update(vec![ArtemisObject::new(ObjectKind::Mine, 5)]))
        .unwrap();
    assert!(session.world().contains(5));
}

#[test]
fn delete_removes_object() {
    let mut session = session();
    let mut mine = ArtemisObject::new(ObjectKind::Mine, 5);
    mine.base_mut().x = 1.0;
    session.receive(&update(vec![mine])).unwrap();
    assert!(session.world().contains(5));

    let events = session
        .receive(&encode_packet(&ObjectDeletePacket::new(ObjectKind::Mine, 5)).unwrap())
        .unwrap();
    assert!(!session.world().contains(5));
    assert!(matches!(
        events.last(),
        Some(SessionEvent::ObjectsChanged { removed, .. }) if removed == &vec![5]
    ));
}

fn kind_change_stream() -> Vec<u8> {
    let mut station = Station::new(9);
    station.shielded.shields_rear = 1.0;
    let mut bystander = NpcShip::new(10);
    bystander.ship.velocity = 2.0;
    let mut stream = update(vec![station.into(), bystander.into()]);
    stream.extend(encode_packet(&TitlePacket::new("after", "", "")).unwrap());
    stream
}

fn seed_npc(session: &mut ClientSession) {
    let mut ship = NpcShip::new(9);
    ship.ship.velocity = 1.0;
    session.receive(&update(vec![ship.into()])).unwrap();
}

#[test]
fn kind_change_halts_the_session() {
    let mut session = session();
    seed_npc(&mut session);

    let events = session.receive(&kind_change_stream()).unwrap();
    assert!(matches!(
        events.last(),
        Some(SessionEvent::Fatal(SessionError::World(WorldError::KindMismatch { id: 9, .. })))
    ));
    assert!(!events.iter().any(|event| matches!(
        event,
        SessionEvent::Packet(packet) if packet.is::<TitlePacket>()
    )));
    assert!(session.is_halted());
    assert!(!session.world().contains(10));
    assert_eq!(session.world().get(9).unwrap().kind(), ObjectKind::NpcShip);
    assert_eq!(
        session.receive(&[]).unwrap_err(),
        SessionError::Packet(PacketError::Desynchronized)
    );

    session.reset();
    assert!(!session.is_halted());
    assert!(session.world().is_empty());
}

#[test]
fn lenient_merge_rejects_entry_and_continues() {
    let config = LinkConfig {
        lenient_merge: true,
        ..LinkConfig::default()
    };
    let mut session = ClientSession::new(config).unwrap();
    seed_npc(&mut session);

    let events = session.receive(&kind_change_stream()).unwrap();
    assert!(events
        .iter()
        .any(|event| matches!(event, SessionEvent::Rejected(SessionError::World(_)))));
    assert!(events.iter().any(|event| matches!(
        event,
        SessionEvent::Packet(packet) if packet.is::<TitlePacket>()
    )));
    assert_eq!(changed_ids(&events), vec![10]);
    assert!(!session.is_halted());
    assert_eq!(session.world().get(9).unwrap().kind(), ObjectKind::NpcShip);
}

#[test]
fn unknown_frames_are_reported_and_skipped() {
    let mut session = session();
    let mut stream = encode_header(0x0bad_c0de, None, &[1, 2, 3]).unwrap();
    stream.extend(encode_packet(&TitlePacket::new("ok", "", "")).unwrap());

    let events = session.receive(&stream).unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], SessionEvent::Unknown(unknown) if unknown.type_code == 0x0bad_c0de));
    assert!(matches!(&events[1], SessionEvent::Packet(_)));
}

#[test]
fn oversized_frame_needs_reset() {
    let config = LinkConfig {
        max_frame_len: 64,
        ..LinkConfig::default()
    };
    let mut session = ClientSession::new(config).unwrap();
    let events = session.receive(&[0x00, 0x10, 0, 0]).unwrap();
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::Fatal(SessionError::Packet(PacketError::FrameTooLarge { .. }))]
    ));
    assert!(session.is_halted());
    assert_eq!(
        session.receive(&[]).unwrap_err(),
        SessionError::Packet(PacketError::Desynchronized)
    );

    session.reset();
    assert!(session
        .receive(&encode_packet(&TitlePacket::new("back", "", "")).unwrap())
        .is_ok());
}

#[test]
fn fatal_framing_error_keeps_earlier_events() {
    let config = LinkConfig {
        max_frame_len: 1024,
        ..LinkConfig::default()
    };
    let mut session = ClientSession::new(config).unwrap();
    let mut npc = NpcShip::new(5);
    npc.ship.velocity = 0.5;

    let mut stream = encode_packet(&TitlePacket::new("first", "", "")).unwrap();
    stream.extend(update(vec![npc.into()]));
    stream.extend([0x00, 0x10, 0, 0, 0x3c, 0x1d, 0x82, 0x4c]);

    let events = session.receive(&stream).unwrap();
    assert_eq!(events.len(), 4);
    assert!(matches!(&events[0], SessionEvent::Packet(packet) if packet.is::<TitlePacket>()));
    assert!(matches!(&events[1], SessionEvent::Packet(packet) if packet.is::<ObjectUpdatePacket>()));
    assert_eq!(changed_ids(&events), vec![5]);
    assert!(matches!(&events[3], SessionEvent::Fatal(err) if err.is_fatal()));
    assert_eq!(session.world().len(), 1);
    assert!(session.is_halted());
}

#[test]
fn world_tracking_can_be_disabled() {
    let config = LinkConfig {
        track_world: false,
        ..LinkConfig::default()
    };
    let mut session = ClientSession::new(config).unwrap();
    let mut player = PlayerShip::new(1);
    player.energy = 10.0;
    let events = session.receive(&update(vec![player.into()])).unwrap();
    assert_eq!(events.len(), 1);
    assert!(session.world().is_empty());
}

#[test]
fn client_side_session_decodes_client_packets() {
    let config = LinkConfig {
        incoming_origin: Origin::Client,
        ..LinkConfig::default()
    };
    let mut session = ClientSession::new(config).unwrap();
    let frame = encode_packet(&SingleSeatPilotPacket::new(4)).unwrap();
    let events = session.receive(&frame).unwrap();
    assert!(matches!(
        &events[0],
        SessionEvent::Packet(packet) if packet.downcast_ref::<SingleSeatPilotPacket>().map(|p| p.object_id) == Some(4)
    ));
    assert_eq!(session.encode(&TitlePacket::new("a", "b", "c")).unwrap()[4..8], [0x79, 0x52, 0x66, 0xee]);
}
