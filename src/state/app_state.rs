use crate::app::MenuItem;
use crate::state::form::RegistrationForm;
use crate::state::messages::Mutation;
use crate::state::session::Session;
use crate::view::TableKind;
use legends_api::TeamStatus;
use std::time::{Duration, Instant};

/// Success banners disappear on their own after this long.
pub const SUCCESS_TTL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Banner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
    pub posted: Instant,
}

impl Notice {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self { severity, text: text.into(), posted: Instant::now() }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.severity == Severity::Success && now.duration_since(self.posted) >= SUCCESS_TTL
    }
}

// ---------------------------------------------------------------------------
// Modal prompts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// y/n before a promote or delete goes out.
    Confirm { mutation: Mutation },
    /// Online/offline picker for a leaderboard team.
    StatusPicker { id: String, name: String, choice: TeamStatus },
}

impl Modal {
    pub fn cycle_choice(&mut self) {
        if let Modal::StatusPicker { choice, .. } = self {
            *choice = match choice {
                TeamStatus::Online => TeamStatus::Offline,
                TeamStatus::Offline => TeamStatus::Online,
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Table selection
// ---------------------------------------------------------------------------

/// Highlighted row per table, kept across refreshes and clamped to the
/// current row count.
#[derive(Debug, Default, Clone, Copy)]
pub struct Selection {
    registrations: usize,
    all_teams: usize,
    leaderboard: usize,
}

impl Selection {
    pub fn get(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Registrations => self.registrations,
            TableKind::AllTeams => self.all_teams,
            TableKind::Leaderboard => self.leaderboard,
        }
    }

    fn slot(&mut self, kind: TableKind) -> &mut usize {
        match kind {
            TableKind::Registrations => &mut self.registrations,
            TableKind::AllTeams => &mut self.all_teams,
            TableKind::Leaderboard => &mut self.leaderboard,
        }
    }

    pub fn down(&mut self, kind: TableKind, rows: usize) {
        let slot = self.slot(kind);
        if *slot + 1 < rows {
            *slot += 1;
        }
    }

    pub fn up(&mut self, kind: TableKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_sub(1);
    }

    pub fn clamp(&mut self, kind: TableKind, rows: usize) {
        let slot = self.slot(kind);
        *slot = (*slot).min(rows.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Root state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub session: Session,
    pub form: RegistrationForm,
    pub notice: Option<Notice>,
    pub modal: Option<Modal>,
    pub selection: Selection,
}

impl AppState {
    pub fn post(&mut self, severity: Severity, text: impl Into<String>) {
        self.notice = Some(Notice::new(severity, text));
    }

    pub fn expire_notice(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
            return true;
        }
        false
    }
}
