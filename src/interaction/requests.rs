#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Selection,
    Hover,
}

impl RequestKind {
    fn slot(self) -> usize {
        match self {
            Self::Selection => 0,
            Self::Hover => 1,
        }
    }
}

/// Tags one outstanding fetch. Only the latest token of a kind is current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken {
    kind: RequestKind,
    sequence: u64,
}

impl RequestToken {
    pub fn kind(self) -> RequestKind {
        self.kind
    }

    pub fn sequence(self) -> u64 {
        self.sequence
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestTracker {
    latest: [u64; 2],
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, kind: RequestKind) -> RequestToken {
        let slot = &mut self.latest[kind.slot()];
        *slot += 1;
        RequestToken {
            kind,
            sequence: *slot,
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest[token.kind.slot()] == token.sequence
    }

    pub fn invalidate(&mut self, kind: RequestKind) {
        self.latest[kind.slot()] += 1;
    }

    pub fn invalidate_all(&mut self) {
        self.invalidate(RequestKind::Selection);
        self.invalidate(RequestKind::Hover);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_token_is_current() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue(RequestKind::Selection);
        let second = tracker.issue(RequestKind::Selection);

        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
        assert!(second.sequence() > first.sequence());
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let mut tracker = RequestTracker::new();
        let selection = tracker.issue(RequestKind::Selection);
        let hover = tracker.issue(RequestKind::Hover);
        tracker.issue(RequestKind::Hover);

        assert!(tracker.is_current(selection));
        assert!(!tracker.is_current(hover));
    }

    #[test]
    fn invalidate_all_stales_every_kind() {
        let mut tracker = RequestTracker::new();
        let selection = tracker.issue(RequestKind::Selection);
        let hover = tracker.issue(RequestKind::Hover);

        tracker.invalidate_all();

        assert!(!tracker.is_current(selection));
        assert!(!tracker.is_current(hover));
    }
}
