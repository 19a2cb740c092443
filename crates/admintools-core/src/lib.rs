pub mod config;
pub mod errors;
pub mod event;
pub mod ids;
pub mod trigger;

pub use config::{HOTKEY_PREFIX, LOG_ENV, PLUGIN_NAME, log_filter};
pub use errors::{AdminError, ErrorCode};
pub use event::{Actor, HostEvent, LogicalMove, MoveNotice, SelectedItem};
pub use ids::{ChannelRef, ConnectionId, DurableId, ParticipantRef};
pub use trigger::{Action, Hotkey, MenuItemId, MenuItemSpec, MenuKind};
