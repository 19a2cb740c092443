use admintools_core::{
    AdminError, ChannelRef, ConnectionId, DurableId, LogicalMove, ParticipantRef,
};
use admintools_host::HostOps;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{command_error, query_error};

/// Whether the local participant is tracking someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FollowState {
    #[default]
    Disabled,
    Following { target: DurableId },
}

/// What a follow check did with a logical move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// Not following, or the move belongs to someone else.
    Ignored,
    /// Local participant already sits in the target's channel.
    InPlace,
    /// A move of the local participant was requested.
    Moved { destination: ChannelRef },
}

/// Keeps the local participant in the same channel as the follow target.
#[derive(Debug, Default)]
pub struct FollowEngine {
    state: FollowState,
}

impl FollowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn target(&self) -> Option<DurableId> {
        match self.state {
            FollowState::Disabled => None,
            FollowState::Following { target } => Some(target),
        }
    }

    /// Starts following `participant` and joins its channel right away.
    ///
    /// Fails without touching state when the target's identity cannot be
    /// resolved. A failed join is logged; following stays enabled.
    pub fn enable(
        &mut self,
        host: &dyn HostOps,
        connection: ConnectionId,
        participant: ParticipantRef,
    ) -> Result<DurableId, AdminError> {
        let target = host
            .durable_id(connection, participant)
            .map_err(|err| query_error("resolve follow target", err))?;

        self.state = FollowState::Following { target };
        info!(
            connection = connection.0,
            participant = participant.0,
            target = target.0,
            "follow enabled"
        );

        let joined = host
            .channel_of(connection, participant)
            .map_err(|err| query_error("resolve follow target channel", err))
            .and_then(|channel| relocate_local(host, connection, channel));
        if let Err(err) = joined {
            warn!(error = %err, target = target.0, "failed to join follow target");
        }

        Ok(target)
    }

    /// Stops following. Returns whether a follow was active.
    pub fn disable(&mut self) -> bool {
        let previous = std::mem::take(&mut self.state);
        if let FollowState::Following { target } = previous {
            info!(target = target.0, "follow disabled");
            return true;
        }
        false
    }

    pub fn on_move(
        &mut self,
        host: &dyn HostOps,
        logical: &LogicalMove,
    ) -> Result<FollowOutcome, AdminError> {
        let FollowState::Following { target } = self.state else {
            return Ok(FollowOutcome::Ignored);
        };

        let moved = host
            .durable_id(logical.connection, logical.participant)
            .map_err(|err| query_error("resolve moved participant", err))?;
        if moved != target {
            return Ok(FollowOutcome::Ignored);
        }

        relocate_local(host, logical.connection, logical.new_channel)
    }
}

fn relocate_local(
    host: &dyn HostOps,
    connection: ConnectionId,
    destination: ChannelRef,
) -> Result<FollowOutcome, AdminError> {
    let local = host
        .local_participant(connection)
        .map_err(|err| query_error("resolve local participant", err))?;
    let current = host
        .channel_of(connection, local)
        .map_err(|err| query_error("resolve local channel", err))?;

    if current == destination {
        return Ok(FollowOutcome::InPlace);
    }

    host.request_move(connection, local, destination)
        .map_err(|err| command_error("move local participant to follow target", err))?;
    info!(
        connection = connection.0,
        from = current.0,
        to = destination.0,
        "following target"
    );
    Ok(FollowOutcome::Moved { destination })
}
