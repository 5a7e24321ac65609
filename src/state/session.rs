use crate::state::reconcile::{Reconciled, reconcile};
use legends_api::Snapshot;

/// Identifies one refresh request. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Orders overlapping refreshes so that only the newest data lands.
#[derive(Debug, Default)]
pub struct RefreshGuard {
    issued: u64,
    applied: u64,
    outstanding: usize,
}

impl RefreshGuard {
    pub fn begin(&mut self) -> RefreshTicket {
        self.issued += 1;
        self.outstanding += 1;
        RefreshTicket(self.issued)
    }

    /// Marks `ticket` as finished. Returns false when a newer ticket has
    /// already been applied and this response must be dropped.
    pub fn settle(&mut self, ticket: RefreshTicket) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }

    pub fn in_flight(&self) -> bool {
        self.outstanding > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    /// Nothing fetched yet.
    #[default]
    Pending,
    Ready,
    /// Last fetch failed; the collections were reset to empty.
    Failed { message: String },
}

/// Client-side session: the generated code awaiting a registration and the
/// last roster fetched from the backend.
#[derive(Debug, Default)]
pub struct Session {
    held_code: Option<String>,
    snapshot: Snapshot,
    model: Reconciled,
    fetch: FetchState,
    guard: RefreshGuard,
}

impl Session {
    pub fn held_code(&self) -> Option<&str> {
        self.held_code.as_deref()
    }

    pub fn hold_code(&mut self, code: String) {
        self.held_code = Some(code);
    }

    pub fn clear_code(&mut self) {
        self.held_code = None;
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.guard.begin()
    }

    pub fn refresh_in_flight(&self) -> bool {
        self.guard.in_flight()
    }

    /// Replaces the roster wholesale. Stale tickets are ignored.
    pub fn apply_snapshot(&mut self, ticket: RefreshTicket, snapshot: Snapshot) -> bool {
        if !self.guard.settle(ticket) {
            return false;
        }
        self.model = reconcile(&snapshot);
        self.snapshot = snapshot;
        self.fetch = FetchState::Ready;
        true
    }

    pub fn apply_failure(&mut self, ticket: RefreshTicket, message: String) -> bool {
        if !self.guard.settle(ticket) {
            return false;
        }
        self.snapshot = Snapshot::default();
        self.model = Reconciled::default();
        self.fetch = FetchState::Failed { message };
        true
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn model(&self) -> &Reconciled {
        &self.model
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }
}
