use std::sync::Arc;

use admintools_core::{
    ChannelRef, ConnectionId, DurableId, HostEvent, MenuItemId, ParticipantRef, SelectedItem,
};
use admintools_engine::{Engine, LockedEntry};
use admintools_host_sim::{MoveCommand, ParticipantSpec, SimHost, WorldSpec};

const CONN: ConnectionId = ConnectionId(1);
const LOCAL: ParticipantRef = ParticipantRef(1);

fn participant(participant: u16, durable_id: u64, channel: u64) -> ParticipantSpec {
    ParticipantSpec {
        participant: ParticipantRef(participant),
        durable_id: DurableId(durable_id),
        channel: ChannelRef(channel),
        name: None,
    }
}

fn setup(local_channel: u64, others: Vec<ParticipantSpec>) -> (Arc<SimHost>, Engine) {
    let mut participants = vec![participant(LOCAL.0, 1, local_channel)];
    participants.extend(others);
    let host = Arc::new(SimHost::new(WorldSpec {
        connection: CONN,
        local: LOCAL,
        participants,
        echo_notifications: false,
        failing_moves: Vec::new(),
        failing_lookups: Vec::new(),
    }));
    let engine = Engine::new(host.clone());
    (host, engine)
}

fn deliver(engine: &mut Engine, events: Vec<HostEvent>) {
    for event in events {
        engine.handle(event);
    }
}

/// Settles the simulated world until no more moves are queued.
fn settle(host: &SimHost, engine: &mut Engine) -> usize {
    let mut rounds = 0;
    loop {
        let events = host.settle();
        if events.is_empty() {
            return rounds;
        }
        rounds += 1;
        assert!(rounds < 16, "move policy did not converge");
        deliver(engine, events);
    }
}

fn command(participant: ParticipantRef, destination: u64) -> MoveCommand {
    MoveCommand {
        connection: CONN,
        participant,
        destination: ChannelRef(destination),
    }
}

#[test]
fn locked_participant_is_returned_to_pin() {
    let p = ParticipantRef(7);
    let (host, mut engine) = setup(1, vec![participant(7, 42, 5)]);
    engine.lock(CONN, p).expect("lock should succeed");

    deliver(&mut engine, host.self_move(p, ChannelRef(7)));

    assert_eq!(host.issued_moves(), vec![command(p, 5)]);
    assert_eq!(
        engine.snapshot().locks,
        vec![LockedEntry {
            durable_id: DurableId(42),
            pin: ChannelRef(5),
        }]
    );
}

#[test]
fn follow_joins_then_tracks_target() {
    let q = ParticipantRef(9);
    let (host, mut engine) = setup(1, vec![participant(9, 9, 3)]);

    engine.follow(CONN, q).expect("follow should start");
    assert_eq!(host.issued_moves(), vec![command(LOCAL, 3)]);

    engine.handle(HostEvent::MovedByOther {
        connection: CONN,
        participant: q,
        old_channel: ChannelRef(3),
        new_channel: ChannelRef(8),
        mover: None,
    });

    assert_eq!(host.issued_moves(), vec![command(LOCAL, 3), command(LOCAL, 8)]);
}

#[test]
fn move_to_here_moves_every_listed_participant() {
    let (host, engine) = setup(
        2,
        vec![
            participant(11, 111, 10),
            participant(12, 112, 10),
            participant(13, 113, 10),
        ],
    );

    let report = engine
        .move_to_here(CONN, ChannelRef(10))
        .expect("bulk move should succeed");

    assert_eq!(report.attempted, 3);
    let mut issued = host.issued_moves();
    issued.sort_by_key(|command| command.participant);
    assert_eq!(
        issued,
        vec![
            command(ParticipantRef(11), 2),
            command(ParticipantRef(12), 2),
            command(ParticipantRef(13), 2),
        ]
    );
}

#[test]
fn unlocked_participant_moves_freely() {
    let (host, mut engine) = setup(1, vec![participant(7, 42, 5), participant(8, 43, 5)]);
    engine.lock(CONN, ParticipantRef(7)).expect("lock should succeed");
    let before = engine.snapshot();

    deliver(&mut engine, host.self_move(ParticipantRef(8), ChannelRef(6)));

    assert!(host.issued_moves().is_empty());
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn lock_correction_settles_without_loop() {
    let p = ParticipantRef(7);
    let (host, mut engine) = setup(1, vec![participant(7, 42, 5)]);
    engine.lock(CONN, p).expect("lock should succeed");

    deliver(&mut engine, host.self_move(p, ChannelRef(7)));
    let rounds = settle(&host, &mut engine);

    assert_eq!(rounds, 1);
    assert_eq!(host.channel(p), Some(ChannelRef(5)));
    assert_eq!(host.issued_moves(), vec![command(p, 5)]);
    assert_eq!(engine.snapshot().locks[0].pin, ChannelRef(5));
}

#[test]
fn operator_relocation_of_locked_participant_sticks() {
    let p = ParticipantRef(7);
    let (host, mut engine) = setup(1, vec![participant(7, 42, 5)]);
    engine.lock(CONN, p).expect("lock should succeed");

    let report = engine
        .move_to_here(CONN, ChannelRef(5))
        .expect("bulk move should succeed");
    assert_eq!(report.attempted, 1);
    settle(&host, &mut engine);

    assert_eq!(host.channel(p), Some(ChannelRef(1)));
    assert_eq!(engine.snapshot().locks[0].pin, ChannelRef(1));
    assert_eq!(host.issued_moves(), vec![command(p, 1)]);

    deliver(&mut engine, host.self_move(p, ChannelRef(5)));
    assert_eq!(host.issued_moves(), vec![command(p, 1), command(p, 1)]);
}

#[test]
fn server_kick_repins_to_no_channel() {
    let p = ParticipantRef(7);
    let (host, mut engine) = setup(1, vec![participant(7, 42, 5)]);
    engine.lock(CONN, p).expect("lock should succeed");

    engine.handle(HostEvent::KickedFromServer {
        connection: CONN,
        participant: p,
        old_channel: ChannelRef(5),
        new_channel: ChannelRef::NONE,
        kicker: None,
    });
    assert_eq!(engine.snapshot().locks[0].pin, ChannelRef::NONE);
    assert!(host.issued_moves().is_empty());

    host.disconnect(p);
    let rejoined = ParticipantRef(77);
    deliver(&mut engine, host.connect(rejoined, DurableId(42), ChannelRef(3)));

    assert_eq!(
        host.issued_moves(),
        vec![MoveCommand {
            connection: CONN,
            participant: rejoined,
            destination: ChannelRef::NONE,
        }]
    );
    assert_eq!(host.pending_moves(), 0);
    assert_eq!(host.channel(rejoined), Some(ChannelRef(3)));
    assert_eq!(engine.snapshot().locks[0].pin, ChannelRef::NONE);
}

#[test]
fn echoed_notifications_trigger_one_follow_move() {
    let q = ParticipantRef(9);
    let host = Arc::new(SimHost::new(WorldSpec {
        connection: CONN,
        local: LOCAL,
        participants: vec![participant(LOCAL.0, 1, 3), participant(9, 9, 3)],
        echo_notifications: true,
        failing_moves: Vec::new(),
        failing_lookups: Vec::new(),
    }));
    let mut engine = Engine::new(host.clone());
    engine.follow(CONN, q).expect("follow should start");
    assert!(host.issued_moves().is_empty());

    let events = host.self_move(q, ChannelRef(4));
    assert_eq!(events.len(), 2);
    deliver(&mut engine, events);

    assert_eq!(host.issued_moves(), vec![command(LOCAL, 4)]);
}

#[test]
fn follow_menu_toggles_entries() {
    let (host, mut engine) = setup(1, vec![participant(9, 9, 3)]);
    assert_eq!(host.menu_enabled(MenuItemId::Follow), Some(true));
    assert_eq!(host.menu_enabled(MenuItemId::Unfollow), Some(false));

    engine.handle(HostEvent::MenuItem {
        connection: CONN,
        menu: MenuItemId::Follow,
        selected_item: 9,
    });
    assert_eq!(engine.snapshot().follow_target, Some(DurableId(9)));
    assert_eq!(host.menu_enabled(MenuItemId::Follow), Some(false));
    assert_eq!(host.menu_enabled(MenuItemId::Unfollow), Some(true));
    assert_eq!(host.menu_enabled(MenuItemId::StopFollowing), Some(true));

    engine.handle(HostEvent::MenuItem {
        connection: CONN,
        menu: MenuItemId::StopFollowing,
        selected_item: 0,
    });
    assert_eq!(engine.snapshot().follow_target, None);
    assert_eq!(host.menu_enabled(MenuItemId::Follow), Some(true));
    assert_eq!(host.menu_enabled(MenuItemId::Unfollow), Some(false));
}

#[test]
fn failed_follow_keeps_menus_untouched() {
    let (host, mut engine) = setup(1, vec![participant(9, 9, 3)]);
    host.fail_lookups_for(ParticipantRef(9));

    engine.handle(HostEvent::MenuItem {
        connection: CONN,
        menu: MenuItemId::Follow,
        selected_item: 9,
    });

    assert_eq!(engine.snapshot().follow_target, None);
    assert_eq!(host.menu_enabled(MenuItemId::Follow), Some(true));
    assert!(host.issued_moves().is_empty());
}

#[test]
fn hotkeys_act_on_current_selection() {
    let (host, mut engine) = setup(1, vec![participant(9, 9, 3), participant(7, 42, 5)]);

    engine.handle(HostEvent::Hotkey {
        keyword: "Follow".to_string(),
    });
    assert_eq!(engine.snapshot().follow_target, None);

    engine.handle(HostEvent::ItemSelected {
        connection: CONN,
        item: SelectedItem::Participant {
            participant: ParticipantRef(9),
        },
    });
    engine.handle(HostEvent::Hotkey {
        keyword: "Follow".to_string(),
    });
    assert_eq!(engine.snapshot().follow_target, Some(DurableId(9)));

    engine.handle(HostEvent::ItemSelected {
        connection: CONN,
        item: SelectedItem::Participant {
            participant: ParticipantRef(7),
        },
    });
    engine.handle(HostEvent::Hotkey {
        keyword: "Lock".to_string(),
    });
    engine.handle(HostEvent::Hotkey {
        keyword: "Unfollow".to_string(),
    });

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.follow_target, None);
    assert_eq!(
        snapshot.locks,
        vec![LockedEntry {
            durable_id: DurableId(42),
            pin: ChannelRef(5),
        }]
    );
    assert_eq!(host.issued_moves(), vec![command(LOCAL, 3)]);
}

#[test]
fn channel_hotkeys_need_a_selected_channel() {
    let (host, mut engine) = setup(2, vec![participant(11, 111, 10)]);

    engine.handle(HostEvent::Hotkey {
        keyword: "MoveToOwnChannel".to_string(),
    });
    assert!(host.issued_moves().is_empty());

    engine.handle(HostEvent::ItemSelected {
        connection: ConnectionId(5),
        item: SelectedItem::Channel {
            channel: ChannelRef(10),
        },
    });
    engine.handle(HostEvent::Hotkey {
        keyword: "MoveToOwnChannel".to_string(),
    });
    assert!(host.issued_moves().is_empty());

    engine.handle(HostEvent::ItemSelected {
        connection: CONN,
        item: SelectedItem::Channel {
            channel: ChannelRef(10),
        },
    });
    engine.handle(HostEvent::Hotkey {
        keyword: "MoveToOwnChannel".to_string(),
    });
    assert_eq!(host.issued_moves(), vec![command(ParticipantRef(11), 2)]);

    engine.handle(HostEvent::ItemSelected {
        connection: CONN,
        item: SelectedItem::Other,
    });
    assert_eq!(engine.selection(), None);
}

#[test]
fn shutdown_clears_all_state() {
    let (_host, mut engine) = setup(1, vec![participant(9, 9, 3), participant(7, 42, 5)]);
    engine.follow(CONN, ParticipantRef(9)).expect("follow should start");
    engine.lock(CONN, ParticipantRef(7)).expect("lock should succeed");
    engine.handle(HostEvent::ItemSelected {
        connection: CONN,
        item: SelectedItem::Participant {
            participant: ParticipantRef(7),
        },
    });

    engine.shutdown();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.follow_target, None);
    assert!(snapshot.locks.is_empty());
    assert_eq!(snapshot.selection, None);
}
