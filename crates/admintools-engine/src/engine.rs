use std::sync::Arc;

use admintools_core::{
    Action, AdminError, ChannelRef, ConnectionId, DurableId, ErrorCode, HostEvent, Hotkey,
    MenuItemId, MoveNotice, ParticipantRef, SelectedItem,
};
use admintools_host::HostOps;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    bulk::{self, BulkReport},
    dedup::{Dedup, MoveDeduplicator},
    follow::FollowEngine,
    lock::LockEngine,
};

/// Item last selected in the host UI, consumed by hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub connection: ConnectionId,
    pub item: SelectedItem,
}

/// Locked participant and its pin, as reported in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockedEntry {
    pub durable_id: DurableId,
    pub pin: ChannelRef,
}

/// Point-in-time view of engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSnapshot {
    pub follow_target: Option<DurableId>,
    pub locks: Vec<LockedEntry>,
    pub selection: Option<Selection>,
}

/// Owns all plugin state and routes host events to it.
///
/// Built once when the plugin loads; [`Engine::shutdown`] clears everything on unload.
pub struct Engine {
    host: Arc<dyn HostOps>,
    dedup: MoveDeduplicator,
    follow: FollowEngine,
    locks: LockEngine,
    selection: Option<Selection>,
}

impl Engine {
    pub fn new(host: Arc<dyn HostOps>) -> Self {
        Self {
            host,
            dedup: MoveDeduplicator::new(),
            follow: FollowEngine::new(),
            locks: LockEngine::new(),
            selection: None,
        }
    }

    pub fn handle(&mut self, event: HostEvent) {
        debug!(kind = event.kind(), "host event");

        match event {
            HostEvent::ItemSelected { connection, item } => self.select(connection, item),
            HostEvent::MenuItem {
                connection,
                menu,
                selected_item,
            } => match Action::from_menu(connection, menu, selected_item) {
                Ok(action) => self.apply(action),
                Err(err) => report("menu item", &err),
            },
            HostEvent::Hotkey { keyword } => self.on_hotkey(&keyword),
            other => {
                if let Some(notice) = other.move_notice() {
                    self.on_move(notice);
                }
            }
        }
    }

    /// Runs one move notice through dedup, then the follow and lock checks.
    pub fn on_move(&mut self, notice: MoveNotice) {
        let logical = match self.dedup.process(notice) {
            Dedup::Logical(logical) => logical,
            Dedup::Duplicate => {
                debug!(
                    participant = notice.participant.0,
                    old_channel = notice.old_channel.0,
                    new_channel = notice.new_channel.0,
                    "dropping duplicate move notification"
                );
                return;
            }
        };

        let host = self.host.as_ref();
        if let Err(err) = self.follow.on_move(host, &logical) {
            report("follow", &err);
        }
        if let Err(err) = self.locks.on_move(host, &logical) {
            report("lock", &err);
        }
    }

    pub fn apply(&mut self, action: Action) {
        let result = match action {
            Action::MoveToOwnChannel {
                connection,
                channel,
            } => self.move_to_here(connection, channel).map(drop),
            Action::MoveToSelectedChannel {
                connection,
                channel,
            } => self.move_from_here(connection, channel).map(drop),
            Action::Follow {
                connection,
                participant,
            } => self.follow(connection, participant).map(drop),
            Action::Unfollow => {
                self.unfollow();
                Ok(())
            }
            Action::GlobalUnfollow => {
                self.global_unfollow();
                Ok(())
            }
            Action::Lock {
                connection,
                participant,
            } => self.lock(connection, participant).map(drop),
            Action::Unlock {
                connection,
                participant,
            } => self.unlock(connection, participant).map(drop),
        };

        if let Err(err) = result {
            report("action", &err);
        }
    }

    /// Moves everyone in the local participant's channel into `channel`.
    pub fn move_from_here(
        &self,
        connection: ConnectionId,
        channel: ChannelRef,
    ) -> Result<BulkReport, AdminError> {
        bulk::move_to_selected_channel(self.host.as_ref(), connection, channel)
    }

    /// Moves everyone in `channel` into the local participant's channel.
    pub fn move_to_here(
        &self,
        connection: ConnectionId,
        channel: ChannelRef,
    ) -> Result<BulkReport, AdminError> {
        bulk::move_to_own_channel(self.host.as_ref(), connection, channel)
    }

    pub fn follow(
        &mut self,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<DurableId, AdminError> {
        let target = self
            .follow
            .enable(self.host.as_ref(), connection, participant)?;
        self.set_follow_menus(true);
        Ok(target)
    }

    /// Stops following; returns whether a follow was active.
    pub fn unfollow(&mut self) -> bool {
        let was_following = self.follow.disable();
        self.set_follow_menus(false);
        was_following
    }

    /// Global menu variant of [`Engine::unfollow`].
    pub fn global_unfollow(&mut self) -> bool {
        self.unfollow()
    }

    pub fn lock(
        &mut self,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<(DurableId, ChannelRef), AdminError> {
        self.locks.lock(self.host.as_ref(), connection, participant)
    }

    pub fn unlock(
        &mut self,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<(DurableId, ChannelRef), AdminError> {
        self.locks.unlock(self.host.as_ref(), connection, participant)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            follow_target: self.follow.target(),
            locks: self
                .locks
                .entries()
                .map(|(durable_id, pin)| LockedEntry { durable_id, pin })
                .collect(),
            selection: self.selection,
        }
    }

    /// Drops all follow, lock, dedup and selection state.
    pub fn shutdown(&mut self) {
        self.follow.disable();
        self.locks.clear();
        self.dedup.reset();
        self.selection = None;
        info!("engine state cleared");
    }

    fn select(&mut self, connection: ConnectionId, item: SelectedItem) {
        self.selection = match item {
            SelectedItem::Other => None,
            item => Some(Selection { connection, item }),
        };
    }

    fn on_hotkey(&mut self, keyword: &str) {
        let Some(hotkey) = Hotkey::from_keyword(keyword) else {
            debug!(keyword, "ignoring unknown hotkey");
            return;
        };

        match self.hotkey_action(hotkey) {
            Some(action) => {
                info!(keyword, ?action, "hotkey triggered");
                self.apply(action);
            }
            None => debug!(keyword, "hotkey has no matching selection"),
        }
    }

    fn hotkey_action(&self, hotkey: Hotkey) -> Option<Action> {
        let connection = self.host.current_connection();
        let selected = self
            .selection
            .filter(|selection| selection.connection == connection)
            .map(|selection| selection.item);

        match (hotkey, selected) {
            (Hotkey::MoveToOwnChannel, Some(SelectedItem::Channel { channel })) => {
                Some(Action::MoveToOwnChannel {
                    connection,
                    channel,
                })
            }
            (Hotkey::MoveToSelectedChannel, Some(SelectedItem::Channel { channel })) => {
                Some(Action::MoveToSelectedChannel {
                    connection,
                    channel,
                })
            }
            (Hotkey::Follow, Some(SelectedItem::Participant { participant })) => {
                Some(Action::Follow {
                    connection,
                    participant,
                })
            }
            (Hotkey::Unfollow, _) if self.follow.target().is_some() => Some(Action::Unfollow),
            (Hotkey::Lock, Some(SelectedItem::Participant { participant })) => {
                Some(Action::Lock {
                    connection,
                    participant,
                })
            }
            (Hotkey::Unlock, Some(SelectedItem::Participant { participant })) => {
                Some(Action::Unlock {
                    connection,
                    participant,
                })
            }
            _ => None,
        }
    }

    fn set_follow_menus(&self, following: bool) {
        self.host.set_menu_enabled(MenuItemId::Follow, !following);
        self.host.set_menu_enabled(MenuItemId::Unfollow, following);
        self.host.set_menu_enabled(MenuItemId::StopFollowing, following);
    }
}

fn report(context: &'static str, err: &AdminError) {
    match err.code {
        ErrorCode::HostQuery => debug!(context, error = %err, detail = ?err.detail, "host lookup failed"),
        _ => warn!(context, error = %err, detail = ?err.detail, "operation rejected"),
    }
}
