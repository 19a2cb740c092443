//! In-memory host client used to drive the engine without a real voice-chat client.

mod scenario;

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
};

use admintools_core::{
    Actor, ChannelRef, ConnectionId, DurableId, HostEvent, MenuItemId, ParticipantRef,
};
use admintools_host::{HostError, HostOps};
use serde::{Deserialize, Serialize};

pub use scenario::{Scenario, ScenarioError, Step};

/// Status the host reports for a stale or invalid client id.
pub const STATUS_CLIENT_INVALID_ID: u32 = 0x0200;
/// Status the host reports when a move targets an invalid channel.
pub const STATUS_CHANNEL_INVALID_ID: u32 = 0x0300;
/// Status the host reports when a request is refused by the server.
pub const STATUS_PERMISSIONS: u32 = 0x0a08;

/// Participant seeded into a simulated world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSpec {
    pub participant: ParticipantRef,
    pub durable_id: DurableId,
    pub channel: ChannelRef,
    #[serde(default)]
    pub name: Option<String>,
}

/// Initial state of a simulated server connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSpec {
    #[serde(default = "default_connection")]
    pub connection: ConnectionId,
    /// The participant the plugin runs as.
    pub local: ParticipantRef,
    pub participants: Vec<ParticipantSpec>,
    /// Deliver every settled notification twice, like hosts that report one move on several callbacks.
    #[serde(default)]
    pub echo_notifications: bool,
    /// Participants whose move requests the host refuses.
    #[serde(default)]
    pub failing_moves: Vec<ParticipantRef>,
    /// Participants whose identity and channel lookups fail.
    #[serde(default)]
    pub failing_lookups: Vec<ParticipantRef>,
}

fn default_connection() -> ConnectionId {
    ConnectionId(1)
}

/// A `request_move` call observed by the simulated host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCommand {
    pub connection: ConnectionId,
    pub participant: ParticipantRef,
    pub destination: ChannelRef,
}

#[derive(Debug, Clone)]
struct SimParticipant {
    durable_id: DurableId,
    channel: ChannelRef,
    name: String,
}

#[derive(Debug)]
struct SimState {
    connection: ConnectionId,
    local: ParticipantRef,
    participants: BTreeMap<ParticipantRef, SimParticipant>,
    echo_notifications: bool,
    failing_moves: BTreeSet<ParticipantRef>,
    failing_lookups: BTreeSet<ParticipantRef>,
    /// Every move request received, accepted or not.
    issued: Vec<MoveCommand>,
    /// Accepted requests the server has not applied yet.
    pending: VecDeque<MoveCommand>,
    menus: BTreeMap<MenuItemId, bool>,
}

/// [`HostOps`] implementation backed by an in-memory world.
///
/// Move requests are recorded and queued; nothing changes until [`SimHost::settle`]
/// applies them and hands back the notifications a real server would send.
#[derive(Debug)]
pub struct SimHost {
    state: Mutex<SimState>,
}

impl SimHost {
    pub fn new(world: WorldSpec) -> Self {
        let participants = world
            .participants
            .into_iter()
            .map(|spec| {
                let name = spec
                    .name
                    .unwrap_or_else(|| format!("participant-{}", spec.participant.0));
                (
                    spec.participant,
                    SimParticipant {
                        durable_id: spec.durable_id,
                        channel: spec.channel,
                        name,
                    },
                )
            })
            .collect();
        let menus = MenuItemId::catalogue()
            .iter()
            .map(|spec| (spec.id, spec.enabled))
            .collect();

        Self {
            state: Mutex::new(SimState {
                connection: world.connection,
                local: world.local,
                participants,
                echo_notifications: world.echo_notifications,
                failing_moves: world.failing_moves.into_iter().collect(),
                failing_lookups: world.failing_lookups.into_iter().collect(),
                issued: Vec::new(),
                pending: VecDeque::new(),
                menus,
            }),
        }
    }

    /// All move requests received so far.
    pub fn issued_moves(&self) -> Vec<MoveCommand> {
        self.state().issued.clone()
    }

    /// Drains the request log, leaving queued moves untouched.
    pub fn take_issued(&self) -> Vec<MoveCommand> {
        std::mem::take(&mut self.state().issued)
    }

    pub fn pending_moves(&self) -> usize {
        self.state().pending.len()
    }

    pub fn channel(&self, participant: ParticipantRef) -> Option<ChannelRef> {
        self.state()
            .participants
            .get(&participant)
            .map(|entry| entry.channel)
    }

    pub fn menu_enabled(&self, menu: MenuItemId) -> Option<bool> {
        self.state().menus.get(&menu).copied()
    }

    pub fn fail_moves_for(&self, participant: ParticipantRef) {
        self.state().failing_moves.insert(participant);
    }

    pub fn fail_lookups_for(&self, participant: ParticipantRef) {
        self.state().failing_lookups.insert(participant);
    }

    /// Participant switches channel on its own; returns the resulting notifications.
    pub fn self_move(&self, participant: ParticipantRef, channel: ChannelRef) -> Vec<HostEvent> {
        let mut state = self.state();
        let connection = state.connection;
        let Some(entry) = state.participants.get_mut(&participant) else {
            return Vec::new();
        };
        if entry.channel == channel {
            return Vec::new();
        }

        let old_channel = entry.channel;
        entry.channel = channel;
        state.notify(HostEvent::ClientMoved {
            connection,
            participant,
            old_channel,
            new_channel: channel,
        })
    }

    /// Participant joins the server, possibly under a new session id.
    pub fn connect(
        &self,
        participant: ParticipantRef,
        durable_id: DurableId,
        channel: ChannelRef,
    ) -> Vec<HostEvent> {
        let mut state = self.state();
        let connection = state.connection;
        state.participants.insert(
            participant,
            SimParticipant {
                durable_id,
                channel,
                name: format!("participant-{}", participant.0),
            },
        );
        state.notify(HostEvent::ClientMoved {
            connection,
            participant,
            old_channel: ChannelRef::NONE,
            new_channel: channel,
        })
    }

    /// Participant leaves the server.
    pub fn disconnect(&self, participant: ParticipantRef) -> Vec<HostEvent> {
        let mut state = self.state();
        let connection = state.connection;
        let Some(entry) = state.participants.remove(&participant) else {
            return Vec::new();
        };
        state.notify(HostEvent::ClientMoved {
            connection,
            participant,
            old_channel: entry.channel,
            new_channel: ChannelRef::NONE,
        })
    }

    /// Applies every queued move and returns the notifications the server sends back.
    ///
    /// Moves of the local participant come back as self moves, moves of anyone
    /// else as moved-by-other with the local participant as mover.
    pub fn settle(&self) -> Vec<HostEvent> {
        let mut state = self.state();
        let mut events = Vec::new();

        while let Some(command) = state.pending.pop_front() {
            let local = state.local;
            let mover = state.participants.get(&local).map(|entry| Actor {
                participant: local,
                name: entry.name.clone(),
                unique_id: format!("uid-{}", entry.durable_id.0),
            });

            let Some(entry) = state.participants.get_mut(&command.participant) else {
                tracing::debug!(participant = command.participant.0, "dropping move for departed participant");
                continue;
            };
            if entry.channel == command.destination {
                continue;
            }

            let old_channel = entry.channel;
            entry.channel = command.destination;

            let event = if command.participant == local {
                HostEvent::ClientMoved {
                    connection: command.connection,
                    participant: command.participant,
                    old_channel,
                    new_channel: command.destination,
                }
            } else {
                HostEvent::MovedByOther {
                    connection: command.connection,
                    participant: command.participant,
                    old_channel,
                    new_channel: command.destination,
                    mover,
                }
            };
            events.extend(state.notify(event));
        }

        events
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SimState {
    fn notify(&self, event: HostEvent) -> Vec<HostEvent> {
        if self.echo_notifications {
            vec![event.clone(), event]
        } else {
            vec![event]
        }
    }

    fn ensure_connection(&self, connection: ConnectionId) -> Result<(), HostError> {
        if connection == self.connection {
            Ok(())
        } else {
            Err(HostError::NotConnected(connection))
        }
    }

    fn lookup(
        &self,
        operation: &'static str,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<&SimParticipant, HostError> {
        self.ensure_connection(connection)?;
        if self.failing_lookups.contains(&participant) {
            return Err(HostError::Status {
                operation,
                code: STATUS_CLIENT_INVALID_ID,
            });
        }
        self.participants
            .get(&participant)
            .ok_or(HostError::UnknownParticipant(participant))
    }
}

impl HostOps for SimHost {
    fn current_connection(&self) -> ConnectionId {
        self.state().connection
    }

    fn local_participant(&self, connection: ConnectionId) -> Result<ParticipantRef, HostError> {
        let state = self.state();
        state.ensure_connection(connection)?;
        Ok(state.local)
    }

    fn channel_of(
        &self,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<ChannelRef, HostError> {
        let state = self.state();
        state
            .lookup("channel_of", connection, participant)
            .map(|entry| entry.channel)
    }

    fn durable_id(
        &self,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<DurableId, HostError> {
        let state = self.state();
        state
            .lookup("durable_id", connection, participant)
            .map(|entry| entry.durable_id)
    }

    fn list_participants(
        &self,
        connection: ConnectionId,
        channel: ChannelRef,
    ) -> Result<Vec<ParticipantRef>, HostError> {
        let state = self.state();
        state.ensure_connection(connection)?;
        if channel == ChannelRef::NONE {
            return Err(HostError::UnknownChannel(channel));
        }
        Ok(state
            .participants
            .iter()
            .filter(|(_, entry)| entry.channel == channel)
            .map(|(participant, _)| *participant)
            .collect())
    }

    fn request_move(
        &self,
        connection: ConnectionId,
        participant: ParticipantRef,
        destination: ChannelRef,
    ) -> Result<(), HostError> {
        let mut state = self.state();
        state.ensure_connection(connection)?;

        let command = MoveCommand {
            connection,
            participant,
            destination,
        };
        state.issued.push(command);

        if destination == ChannelRef::NONE {
            return Err(HostError::Status {
                operation: "request_move",
                code: STATUS_CHANNEL_INVALID_ID,
            });
        }
        if state.failing_moves.contains(&participant) {
            return Err(HostError::Status {
                operation: "request_move",
                code: STATUS_PERMISSIONS,
            });
        }

        state.pending.push_back(command);
        Ok(())
    }

    fn set_menu_enabled(&self, menu: MenuItemId, enabled: bool) {
        self.state().menus.insert(menu, enabled);
    }
}
