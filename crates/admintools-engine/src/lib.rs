//! Follow/lock move arbitration driven by host client events.

mod bulk;
mod dedup;
mod engine;
mod error;
mod follow;
mod lock;
mod pump;

pub use bulk::{BulkReport, move_to_own_channel, move_to_selected_channel};
pub use dedup::{Dedup, MoveDeduplicator};
pub use engine::{Engine, EngineSnapshot, LockedEntry, Selection};
pub use follow::{FollowEngine, FollowOutcome, FollowState};
pub use lock::{LockEngine, LockOutcome};
pub use pump::{EventPump, PumpError, PumpHandle};
