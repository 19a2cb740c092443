use std::{fs, io, path::Path};

use admintools_core::{ChannelRef, DurableId, HostEvent, ParticipantRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::WorldSpec;

/// Scripted replay: a starting world plus the steps applied to it in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub world: WorldSpec,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Deliver a raw host callback.
    Event { event: HostEvent },
    /// Participant changes channel on its own.
    SelfMove {
        participant: ParticipantRef,
        channel: ChannelRef,
    },
    /// Participant joins the server.
    Connect {
        participant: ParticipantRef,
        durable_id: DurableId,
        channel: ChannelRef,
    },
    /// Participant leaves the server.
    Disconnect { participant: ParticipantRef },
    /// Apply queued move requests until the world stops changing.
    Settle,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode scenario: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }
}
