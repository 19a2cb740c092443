use serde::{Deserialize, Serialize};

use crate::{ChannelRef, ConnectionId, MenuItemId, ParticipantRef};

/// Participant who caused a move or kick, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Session id of the acting participant.
    pub participant: ParticipantRef,
    /// Display name at the time of the action.
    pub name: String,
    /// Host unique identifier string.
    pub unique_id: String,
}

/// Item highlighted in the host's channel tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectedItem {
    /// A channel row was selected.
    Channel { channel: ChannelRef },
    /// A participant row was selected.
    Participant { participant: ParticipantRef },
    /// The server row or nothing relevant was selected.
    Other,
}

/// Callbacks delivered by the host client, converted once at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Participant changed channel on its own (also used for joins and disconnects).
    ClientMoved {
        connection: ConnectionId,
        participant: ParticipantRef,
        old_channel: ChannelRef,
        new_channel: ChannelRef,
    },
    /// Participant dropped out after a timeout.
    MoveTimeout {
        connection: ConnectionId,
        participant: ParticipantRef,
        old_channel: ChannelRef,
        new_channel: ChannelRef,
    },
    /// Participant was moved by another participant.
    MovedByOther {
        connection: ConnectionId,
        participant: ParticipantRef,
        old_channel: ChannelRef,
        new_channel: ChannelRef,
        #[serde(default)]
        mover: Option<Actor>,
    },
    /// Participant was kicked out of its channel.
    KickedFromChannel {
        connection: ConnectionId,
        participant: ParticipantRef,
        old_channel: ChannelRef,
        new_channel: ChannelRef,
        #[serde(default)]
        kicker: Option<Actor>,
    },
    /// Participant was kicked from the server.
    KickedFromServer {
        connection: ConnectionId,
        participant: ParticipantRef,
        old_channel: ChannelRef,
        new_channel: ChannelRef,
        #[serde(default)]
        kicker: Option<Actor>,
    },
    /// The host info frame switched to a different item.
    ItemSelected {
        connection: ConnectionId,
        item: SelectedItem,
    },
    /// A plugin menu entry was clicked.
    MenuItem {
        connection: ConnectionId,
        menu: MenuItemId,
        /// Channel or client id for channel/client menus, 0 for global menus.
        selected_item: u64,
    },
    /// A plugin hotkey was pressed.
    Hotkey { keyword: String },
}

/// Move notification reduced to the fields move policy consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveNotice {
    pub connection: ConnectionId,
    pub participant: ParticipantRef,
    pub old_channel: ChannelRef,
    pub new_channel: ChannelRef,
    /// False for self-initiated moves, true for moves caused by someone or something else.
    pub was_moved: bool,
}

/// A deduplicated move, consumed by the follow and lock engines.
pub type LogicalMove = MoveNotice;

impl HostEvent {
    /// Converts move-shaped events into a notice; other events yield `None`.
    pub fn move_notice(&self) -> Option<MoveNotice> {
        let (connection, participant, old_channel, new_channel, was_moved) = match self {
            HostEvent::ClientMoved {
                connection,
                participant,
                old_channel,
                new_channel,
            } => (connection, participant, old_channel, new_channel, false),
            HostEvent::MoveTimeout {
                connection,
                participant,
                old_channel,
                new_channel,
            }
            | HostEvent::MovedByOther {
                connection,
                participant,
                old_channel,
                new_channel,
                ..
            }
            | HostEvent::KickedFromChannel {
                connection,
                participant,
                old_channel,
                new_channel,
                ..
            }
            | HostEvent::KickedFromServer {
                connection,
                participant,
                old_channel,
                new_channel,
                ..
            } => (connection, participant, old_channel, new_channel, true),
            HostEvent::ItemSelected { .. } | HostEvent::MenuItem { .. } | HostEvent::Hotkey { .. } => {
                return None;
            }
        };

        Some(MoveNotice {
            connection: *connection,
            participant: *participant,
            old_channel: *old_channel,
            new_channel: *new_channel,
            was_moved,
        })
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::ClientMoved { .. } => "client_moved",
            HostEvent::MoveTimeout { .. } => "move_timeout",
            HostEvent::MovedByOther { .. } => "moved_by_other",
            HostEvent::KickedFromChannel { .. } => "kicked_from_channel",
            HostEvent::KickedFromServer { .. } => "kicked_from_server",
            HostEvent::ItemSelected { .. } => "item_selected",
            HostEvent::MenuItem { .. } => "menu_item",
            HostEvent::Hotkey { .. } => "hotkey",
        }
    }
}
