use std::collections::BTreeMap;

use admintools_core::{
    AdminError, ChannelRef, ConnectionId, DurableId, ErrorCode, LogicalMove, ParticipantRef,
};
use admintools_host::HostOps;
use tracing::info;

use crate::error::{command_error, query_error};

/// What the lock check did with a logical move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// Nobody is locked, or the mover is not locked.
    Ignored,
    /// Locked participant moved into its pin; nothing to do.
    Held,
    /// Spontaneous move away from the pin; a move back was requested.
    Reverted { pin: ChannelRef },
    /// Caused move; the new channel became the pin.
    Repinned { from: ChannelRef, to: ChannelRef },
}

/// Pins locked participants to a channel.
///
/// Spontaneous moves away from the pin are reverted. Moves caused by someone
/// else (including this engine's own corrections) are accepted as the new pin,
/// which keeps corrections from looping.
#[derive(Debug, Default)]
pub struct LockEngine {
    pins: BTreeMap<DurableId, ChannelRef>,
}

impl LockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins `participant` to the channel it currently sits in.
    pub fn lock(
        &mut self,
        host: &dyn HostOps,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<(DurableId, ChannelRef), AdminError> {
        let durable_id = host
            .durable_id(connection, participant)
            .map_err(|err| query_error("resolve participant to lock", err))?;
        if self.pins.contains_key(&durable_id) {
            return Err(AdminError {
                code: ErrorCode::AlreadyLocked,
                message: format!("participant {durable_id} is already locked"),
                detail: None,
            });
        }

        let channel = host
            .channel_of(connection, participant)
            .map_err(|err| query_error("resolve channel to lock", err))?;
        self.pins.insert(durable_id, channel);
        info!(
            participant = participant.0,
            durable_id = durable_id.0,
            pin = channel.0,
            "participant locked"
        );
        Ok((durable_id, channel))
    }

    /// Releases a locked participant, returning its last pin.
    pub fn unlock(
        &mut self,
        host: &dyn HostOps,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<(DurableId, ChannelRef), AdminError> {
        if self.pins.is_empty() {
            return Err(AdminError {
                code: ErrorCode::LockSetEmpty,
                message: "no participants are locked".to_string(),
                detail: None,
            });
        }

        let durable_id = host
            .durable_id(connection, participant)
            .map_err(|err| query_error("resolve participant to unlock", err))?;
        let Some(pin) = self.pins.remove(&durable_id) else {
            return Err(AdminError {
                code: ErrorCode::NotLocked,
                message: format!("participant {durable_id} is not locked"),
                detail: None,
            });
        };

        info!(
            participant = participant.0,
            durable_id = durable_id.0,
            pin = pin.0,
            "participant unlocked"
        );
        Ok((durable_id, pin))
    }

    pub fn on_move(
        &mut self,
        host: &dyn HostOps,
        logical: &LogicalMove,
    ) -> Result<LockOutcome, AdminError> {
        if self.pins.is_empty() {
            return Ok(LockOutcome::Ignored);
        }

        let durable_id = host
            .durable_id(logical.connection, logical.participant)
            .map_err(|err| query_error("resolve moved participant", err))?;
        let Some(pin) = self.pins.get_mut(&durable_id) else {
            return Ok(LockOutcome::Ignored);
        };

        if logical.was_moved {
            let from = *pin;
            *pin = logical.new_channel;
            info!(
                durable_id = durable_id.0,
                from = from.0,
                to = logical.new_channel.0,
                "locked participant repinned"
            );
            return Ok(LockOutcome::Repinned {
                from,
                to: logical.new_channel,
            });
        }

        if logical.new_channel == *pin {
            return Ok(LockOutcome::Held);
        }

        let pin = *pin;
        host.request_move(logical.connection, logical.participant, pin)
            .map_err(|err| command_error("return locked participant", err))?;
        info!(
            participant = logical.participant.0,
            durable_id = durable_id.0,
            left_to = logical.new_channel.0,
            pin = pin.0,
            "reverting locked participant"
        );
        Ok(LockOutcome::Reverted { pin })
    }

    pub fn pinned(&self, durable_id: DurableId) -> Option<ChannelRef> {
        self.pins.get(&durable_id).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (DurableId, ChannelRef)> + '_ {
        self.pins.iter().map(|(durable_id, pin)| (*durable_id, *pin))
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn clear(&mut self) {
        self.pins.clear();
    }
}
