use admintools_core::{ChannelRef, ConnectionId, DurableId, MenuItemId, ParticipantRef};
use thiserror::Error;

/// Queries and commands the host client exposes to the plugin.
///
/// Every call is synchronous and returns immediately. `request_move` only
/// submits the request; its outcome arrives later as a move notification.
pub trait HostOps: Send + Sync {
    /// Connection tab currently focused in the host UI.
    fn current_connection(&self) -> ConnectionId;

    /// Session id of the local participant on a connection.
    fn local_participant(&self, connection: ConnectionId) -> Result<ParticipantRef, HostError>;

    /// Channel a participant currently sits in.
    fn channel_of(
        &self,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<ChannelRef, HostError>;

    /// Stable identity of a connected participant.
    fn durable_id(
        &self,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<DurableId, HostError>;

    /// Participants currently in a channel. The adapter releases any host-owned buffer.
    fn list_participants(
        &self,
        connection: ConnectionId,
        channel: ChannelRef,
    ) -> Result<Vec<ParticipantRef>, HostError>;

    /// Asks the server to move a participant. Fire-and-forget.
    fn request_move(
        &self,
        connection: ConnectionId,
        participant: ParticipantRef,
        destination: ChannelRef,
    ) -> Result<(), HostError>;

    /// Greys out or re-enables one of the plugin's menu entries.
    fn set_menu_enabled(&self, menu: MenuItemId, enabled: bool);
}

/// Errors reported by a host adapter.
#[derive(Debug, Error)]
pub enum HostError {
    /// Host call returned a non-success status code.
    #[error("{operation} failed with host status {code:#06x}")]
    Status { operation: &'static str, code: u32 },
    /// Connection handler is unknown or disconnected.
    #[error("connection {0} is not connected")]
    NotConnected(ConnectionId),
    /// Participant is not visible on the connection.
    #[error("participant {0} not found")]
    UnknownParticipant(ParticipantRef),
    /// Channel does not exist on the server.
    #[error("channel {0} not found")]
    UnknownChannel(ChannelRef),
}
