use serde::{Deserialize, Serialize};

use crate::{AdminError, ChannelRef, ConnectionId, ErrorCode, ParticipantRef};

/// Which host context menu an entry is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    Channel,
    Participant,
    Global,
}

/// Plugin menu entries registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItemId {
    MoveToOwnChannel,
    MoveToSelectedChannel,
    Follow,
    Unfollow,
    Lock,
    Unlock,
    StopFollowing,
}

/// Static description of one menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItemSpec {
    pub id: MenuItemId,
    pub kind: MenuKind,
    pub label: &'static str,
    pub icon: &'static str,
    /// Whether the entry starts out clickable.
    pub enabled: bool,
}

const MENU_ITEMS: [MenuItemSpec; 7] = [
    MenuItemSpec {
        id: MenuItemId::MoveToOwnChannel,
        kind: MenuKind::Channel,
        label: "Move all users from this channel to your channel",
        icon: "1.png",
        enabled: true,
    },
    MenuItemSpec {
        id: MenuItemId::MoveToSelectedChannel,
        kind: MenuKind::Channel,
        label: "Move all users from your channel to this channel",
        icon: "2.png",
        enabled: true,
    },
    MenuItemSpec {
        id: MenuItemId::Follow,
        kind: MenuKind::Participant,
        label: "Follow",
        icon: "3.png",
        enabled: true,
    },
    MenuItemSpec {
        id: MenuItemId::Unfollow,
        kind: MenuKind::Participant,
        label: "Unfollow",
        icon: "4.png",
        enabled: false,
    },
    MenuItemSpec {
        id: MenuItemId::Lock,
        kind: MenuKind::Participant,
        label: "Lock in channel",
        icon: "5.png",
        enabled: true,
    },
    MenuItemSpec {
        id: MenuItemId::Unlock,
        kind: MenuKind::Participant,
        label: "Unlock",
        icon: "6.png",
        enabled: true,
    },
    MenuItemSpec {
        id: MenuItemId::StopFollowing,
        kind: MenuKind::Global,
        label: "Stop following",
        icon: "4.png",
        enabled: false,
    },
];

impl MenuItemId {
    /// All entries in registration order.
    pub fn catalogue() -> &'static [MenuItemSpec] {
        &MENU_ITEMS
    }

    /// Numeric id handed to the host at registration.
    pub fn id(self) -> u32 {
        match self {
            MenuItemId::MoveToOwnChannel => 0,
            MenuItemId::MoveToSelectedChannel => 1,
            MenuItemId::Follow => 2,
            MenuItemId::Unfollow => 3,
            MenuItemId::Lock => 4,
            MenuItemId::Unlock => 5,
            MenuItemId::StopFollowing => 6,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        MENU_ITEMS.iter().map(|spec| spec.id).find(|item| item.id() == id)
    }

    pub fn spec(self) -> &'static MenuItemSpec {
        &MENU_ITEMS[self.id() as usize]
    }
}

/// Hotkeys registered with the host, identified by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hotkey {
    MoveToOwnChannel,
    MoveToSelectedChannel,
    Follow,
    Unfollow,
    Lock,
    Unlock,
}

impl Hotkey {
    pub const ALL: [Hotkey; 6] = [
        Hotkey::MoveToOwnChannel,
        Hotkey::MoveToSelectedChannel,
        Hotkey::Follow,
        Hotkey::Unfollow,
        Hotkey::Lock,
        Hotkey::Unlock,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Hotkey::MoveToOwnChannel => "MoveToOwnChannel",
            Hotkey::MoveToSelectedChannel => "MoveToSelectedChannel",
            Hotkey::Follow => "Follow",
            Hotkey::Unfollow => "Unfollow",
            Hotkey::Lock => "Lock",
            Hotkey::Unlock => "Unlock",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Hotkey::MoveToOwnChannel => "Move clients from selected channel to my channel",
            Hotkey::MoveToSelectedChannel => "Move clients from my channel to selected channel",
            Hotkey::Follow => "Follow user",
            Hotkey::Unfollow => "Unfollow user",
            Hotkey::Lock => "Lock user in current channel",
            Hotkey::Unlock => "Unlock user",
        }
    }

    /// Exact keyword match; unknown keywords belong to other plugins.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hotkey| hotkey.keyword() == keyword)
    }
}

/// Core operation requested through a menu entry or hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Move everyone in `channel` into the local participant's channel.
    MoveToOwnChannel {
        connection: ConnectionId,
        channel: ChannelRef,
    },
    /// Move everyone in the local participant's channel into `channel`.
    MoveToSelectedChannel {
        connection: ConnectionId,
        channel: ChannelRef,
    },
    Follow {
        connection: ConnectionId,
        participant: ParticipantRef,
    },
    Unfollow,
    Lock {
        connection: ConnectionId,
        participant: ParticipantRef,
    },
    Unlock {
        connection: ConnectionId,
        participant: ParticipantRef,
    },
    /// Global menu variant of `Unfollow`.
    GlobalUnfollow,
}

impl Action {
    /// Maps a clicked menu entry and the host's selected item id onto an action.
    pub fn from_menu(
        connection: ConnectionId,
        menu: MenuItemId,
        selected_item: u64,
    ) -> Result<Self, AdminError> {
        let action = match menu {
            MenuItemId::MoveToOwnChannel => Action::MoveToOwnChannel {
                connection,
                channel: ChannelRef(selected_item),
            },
            MenuItemId::MoveToSelectedChannel => Action::MoveToSelectedChannel {
                connection,
                channel: ChannelRef(selected_item),
            },
            MenuItemId::Follow => Action::Follow {
                connection,
                participant: participant_from_item(menu, selected_item)?,
            },
            MenuItemId::Unfollow => Action::Unfollow,
            MenuItemId::Lock => Action::Lock {
                connection,
                participant: participant_from_item(menu, selected_item)?,
            },
            MenuItemId::Unlock => Action::Unlock {
                connection,
                participant: participant_from_item(menu, selected_item)?,
            },
            MenuItemId::StopFollowing => Action::GlobalUnfollow,
        };
        Ok(action)
    }
}

fn participant_from_item(menu: MenuItemId, selected_item: u64) -> Result<ParticipantRef, AdminError> {
    u16::try_from(selected_item)
        .map(ParticipantRef)
        .map_err(|_| AdminError {
            code: ErrorCode::InvalidRequest,
            message: format!("menu item {menu:?} selected an invalid participant id"),
            detail: Some(format!("selected_item={selected_item}")),
        })
}
