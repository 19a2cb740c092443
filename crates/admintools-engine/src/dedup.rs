use admintools_core::{ChannelRef, LogicalMove, MoveNotice, ParticipantRef};

/// Result of running a notice through the deduplicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dedup {
    Logical(LogicalMove),
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MoveKey {
    participant: ParticipantRef,
    old_channel: ChannelRef,
    new_channel: ChannelRef,
    was_moved: bool,
}

impl From<&MoveNotice> for MoveKey {
    fn from(notice: &MoveNotice) -> Self {
        Self {
            participant: notice.participant,
            old_channel: notice.old_channel,
            new_channel: notice.new_channel,
            was_moved: notice.was_moved,
        }
    }
}

/// Collapses a notice that repeats the one right before it.
///
/// Only the last notice is remembered and the memo is cleared after a match,
/// so a third identical notice in a row counts as a new move.
#[derive(Debug, Default)]
pub struct MoveDeduplicator {
    last: Option<MoveKey>,
}

impl MoveDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, notice: MoveNotice) -> Dedup {
        let key = MoveKey::from(&notice);
        if self.last == Some(key) {
            self.last = None;
            return Dedup::Duplicate;
        }

        self.last = Some(key);
        Dedup::Logical(notice)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{Dedup, MoveDeduplicator};
    use admintools_core::{ChannelRef, ConnectionId, MoveNotice, ParticipantRef};

    fn notice(was_moved: bool) -> MoveNotice {
        MoveNotice {
            connection: ConnectionId(1),
            participant: ParticipantRef(7),
            old_channel: ChannelRef(5),
            new_channel: ChannelRef(7),
            was_moved,
        }
    }

    #[test]
    fn second_identical_notice_is_duplicate() {
        let mut dedup = MoveDeduplicator::new();

        assert_eq!(dedup.process(notice(false)), Dedup::Logical(notice(false)));
        assert_eq!(dedup.process(notice(false)), Dedup::Duplicate);
    }

    #[test]
    fn third_identical_notice_is_logical_again() {
        let mut dedup = MoveDeduplicator::new();

        assert!(matches!(dedup.process(notice(true)), Dedup::Logical(_)));
        assert_eq!(dedup.process(notice(true)), Dedup::Duplicate);
        assert!(matches!(dedup.process(notice(true)), Dedup::Logical(_)));
        assert_eq!(dedup.process(notice(true)), Dedup::Duplicate);
    }

    #[test]
    fn differing_flag_or_channel_is_not_duplicate() {
        let mut dedup = MoveDeduplicator::new();

        assert!(matches!(dedup.process(notice(false)), Dedup::Logical(_)));
        assert!(matches!(dedup.process(notice(true)), Dedup::Logical(_)));

        let mut other = notice(true);
        other.new_channel = ChannelRef(8);
        assert!(matches!(dedup.process(other), Dedup::Logical(_)));
    }

    #[test]
    fn connection_is_ignored_when_comparing() {
        let mut dedup = MoveDeduplicator::new();
        let mut other_tab = notice(false);
        other_tab.connection = ConnectionId(2);

        assert!(matches!(dedup.process(notice(false)), Dedup::Logical(_)));
        assert_eq!(dedup.process(other_tab), Dedup::Duplicate);
    }

    #[test]
    fn reset_forgets_last_notice() {
        let mut dedup = MoveDeduplicator::new();

        assert!(matches!(dedup.process(notice(false)), Dedup::Logical(_)));
        dedup.reset();
        assert!(matches!(dedup.process(notice(false)), Dedup::Logical(_)));
    }
}
