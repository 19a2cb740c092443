use admintools_core::{AdminError, ChannelRef, ConnectionId};
use admintools_host::HostOps;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::query_error;

/// Summary of one bulk move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub source: ChannelRef,
    pub destination: ChannelRef,
    /// Move requests issued, including the ones the host refused.
    pub attempted: usize,
    pub failed: usize,
}

/// Moves everyone in the local participant's channel into `channel`.
pub fn move_to_selected_channel(
    host: &dyn HostOps,
    connection: ConnectionId,
    channel: ChannelRef,
) -> Result<BulkReport, AdminError> {
    let own = own_channel(host, connection)?;
    move_all(host, connection, own, channel)
}

/// Moves everyone in `channel` into the local participant's channel.
pub fn move_to_own_channel(
    host: &dyn HostOps,
    connection: ConnectionId,
    channel: ChannelRef,
) -> Result<BulkReport, AdminError> {
    let own = own_channel(host, connection)?;
    move_all(host, connection, channel, own)
}

fn own_channel(host: &dyn HostOps, connection: ConnectionId) -> Result<ChannelRef, AdminError> {
    let local = host
        .local_participant(connection)
        .map_err(|err| query_error("resolve local participant", err))?;
    host.channel_of(connection, local)
        .map_err(|err| query_error("resolve local channel", err))
}

fn move_all(
    host: &dyn HostOps,
    connection: ConnectionId,
    source: ChannelRef,
    destination: ChannelRef,
) -> Result<BulkReport, AdminError> {
    let mut report = BulkReport {
        source,
        destination,
        attempted: 0,
        failed: 0,
    };
    let participants = host
        .list_participants(connection, source)
        .map_err(|err| query_error("list source channel", err))?;

    for participant in participants {
        report.attempted += 1;
        if let Err(err) = host.request_move(connection, participant, destination) {
            report.failed += 1;
            warn!(
                error = %err,
                participant = participant.0,
                destination = destination.0,
                "bulk move request failed"
            );
        }
    }

    info!(
        connection = connection.0,
        source = source.0,
        destination = destination.0,
        attempted = report.attempted,
        failed = report.failed,
        "bulk move issued"
    );
    Ok(report)
}
