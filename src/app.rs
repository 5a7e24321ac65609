use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Modal, Severity};
use crate::state::messages::{Mutation, NetworkRequest};
use crate::state::session::RefreshTicket;
use crate::view::{self, DashboardView, RowAction, RowView, TableKind};
use legends_api::{Registered, Snapshot, TeamStatus};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Registrations,
    AllTeams,
    Leaderboard,
    Analytics,
    Register,
    Help,
}

impl MenuItem {
    pub fn table(&self) -> Option<TableKind> {
        match self {
            MenuItem::Registrations => Some(TableKind::Registrations),
            MenuItem::AllTeams => Some(TableKind::AllTeams),
            MenuItem::Leaderboard => Some(TableKind::Leaderboard),
            _ => None,
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self { settings, state: AppState::default() };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    /// Current projection of the session. Recomputed on demand.
    pub fn view(&self) -> DashboardView {
        let session = &self.state.session;
        view::render(session.model(), session.fetch_state(), &self.settings.capabilities())
    }

    // -----------------------------------------------------------------------
    // Refresh cycle
    // -----------------------------------------------------------------------

    /// Issues a refresh ticket. Scheduled refreshes are skipped while one is
    /// still outstanding; forced ones (startup, after a mutation, `r`) always go.
    pub fn request_refresh(&mut self, force: bool) -> Option<NetworkRequest> {
        if !force && self.state.session.refresh_in_flight() {
            return None;
        }
        let ticket = self.state.session.begin_refresh();
        Some(NetworkRequest::Refresh { ticket, source: self.settings.source })
    }

    /// `partial` is set when one collection failed and was read as empty.
    pub fn on_data_loaded(&mut self, ticket: RefreshTicket, snapshot: Snapshot, partial: Option<String>) {
        if !self.state.session.apply_snapshot(ticket, snapshot) {
            info!("dropping stale roster for {ticket:?}");
            return;
        }
        if !self.state.session.model().ranking_follows_points {
            warn!("leaderboard is not ordered by points; ranks follow backend order");
        }
        if let Some(partial) = partial {
            self.state.post(Severity::Warning, partial);
        }
        self.clamp_selection();
    }

    pub fn on_data_failed(&mut self, ticket: RefreshTicket, message: String, transport: bool) {
        if !self.state.session.apply_failure(ticket, message.clone()) {
            return;
        }
        let text = if transport { view::UNREACHABLE.to_string() } else { format!("Failed to load teams: {message}") };
        self.state.post(Severity::Error, text);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let view = self.view();
        for kind in TableKind::ALL {
            self.state.selection.clamp(kind, view.table(kind).rows().len());
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    pub fn generate_code(&mut self) -> Option<NetworkRequest> {
        self.settings.capabilities().register.then_some(NetworkRequest::GenerateCode)
    }

    pub fn on_code_generated(&mut self, code: String) {
        self.state.session.hold_code(code);
        self.state.post(Severity::Success, "Unique code generated successfully!");
    }

    pub fn on_code_failed(&mut self, message: String) {
        warn!("code generation failed: {message}");
        self.state.post(Severity::Error, "Error generating code. Please try again.");
    }

    pub fn submit_registration(&mut self) -> Option<NetworkRequest> {
        if !self.settings.capabilities().register || self.state.form.submitting {
            return None;
        }
        match self.state.form.validate(self.state.session.held_code()) {
            Ok(registration) => {
                self.state.form.submitting = true;
                Some(NetworkRequest::Register { registration })
            }
            Err(e) => {
                let severity = if e.is_warning() { Severity::Warning } else { Severity::Error };
                self.state.post(severity, e.to_string());
                None
            }
        }
    }

    /// Returns the refetch that follows every successful registration.
    pub fn on_registered(&mut self, ack: Registered) -> Option<NetworkRequest> {
        info!("registered team with code {}", ack.unique_code);
        self.state.form.reset();
        self.state.session.clear_code();
        let text = if ack.unique_code.is_empty() {
            ack.message
        } else {
            format!("{} - Code: {}", ack.message, ack.unique_code)
        };
        self.state.post(Severity::Success, text);
        self.request_refresh(true)
    }

    pub fn on_registration_failed(&mut self, message: String) {
        self.state.form.submitting = false;
        self.state.post(Severity::Error, format!("Registration failed: {message}"));
    }

    // -----------------------------------------------------------------------
    // Row actions
    // -----------------------------------------------------------------------

    pub fn selected_row(&self) -> Option<RowView> {
        let kind = self.state.active_tab.table()?;
        let view = self.view();
        view.table(kind).rows().get(self.state.selection.get(kind)).cloned()
    }

    pub fn select_next(&mut self) {
        if let Some(kind) = self.state.active_tab.table() {
            let rows = self.view().table(kind).rows().len();
            self.state.selection.down(kind, rows);
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(kind) = self.state.active_tab.table() {
            self.state.selection.up(kind);
        }
    }

    pub fn request_promote(&mut self) {
        let Some(row) = self.selected_row() else { return };
        if row.action(|a| matches!(a, RowAction::Promote)).is_some() {
            let mutation = Mutation::Promote { id: row.team_id, name: row.team_name };
            self.state.modal = Some(Modal::Confirm { mutation });
        }
    }

    pub fn request_delete(&mut self) {
        let Some(row) = self.selected_row() else { return };
        if row.action(|a| matches!(a, RowAction::Delete)).is_some() {
            let mutation = Mutation::Delete { id: row.team_id, name: row.team_name };
            self.state.modal = Some(Modal::Confirm { mutation });
        }
    }

    pub fn request_status_change(&mut self) {
        let Some(row) = self.selected_row() else { return };
        if let Some(RowAction::SetStatus { current }) =
            row.action(|a| matches!(a, RowAction::SetStatus { .. }))
        {
            let choice = match current {
                TeamStatus::Online => TeamStatus::Offline,
                TeamStatus::Offline => TeamStatus::Online,
            };
            self.state.modal = Some(Modal::StatusPicker { id: row.team_id, name: row.team_name, choice });
        }
    }

    pub fn confirm_modal(&mut self) -> Option<NetworkRequest> {
        let mutation = match self.state.modal.take()? {
            Modal::Confirm { mutation } => mutation,
            Modal::StatusPicker { id, name, choice } => Mutation::SetStatus { id, name, status: choice },
        };
        Some(NetworkRequest::Mutate { mutation })
    }

    pub fn cancel_modal(&mut self) {
        self.state.modal = None;
    }

    pub fn on_mutation_succeeded(&mut self, mutation: Mutation, message: String) -> Option<NetworkRequest> {
        info!("{} ({}): {message}", mutation.team_name(), mutation.id());
        self.state.post(Severity::Success, message);
        self.request_refresh(true)
    }

    pub fn on_mutation_failed(&mut self, mutation: Mutation, message: String) {
        warn!("{mutation:?} failed: {message}");
        self.state.post(Severity::Error, format!("{}: {message}", mutation.failure_prefix()));
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    pub fn export_pdf(&self) -> Option<NetworkRequest> {
        let dir: PathBuf = self.settings.export_dir.clone();
        self.settings.capabilities().export.then_some(NetworkRequest::ExportPdf { dir })
    }

    pub fn on_exported(&mut self, path: PathBuf, count: usize) {
        self.state.post(Severity::Success, format!("Exported {count} teams to {}", path.display()));
    }

    pub fn on_export_failed(&mut self, message: String) {
        self.state.post(Severity::Error, format!("PDF export failed: {message}"));
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        if next == MenuItem::Register && !self.settings.capabilities().register {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_to_previous(&mut self) {
        if matches!(self.state.active_tab, MenuItem::Help | MenuItem::Register) {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn dismiss_notice(&mut self) {
        self.state.notice = None;
    }

    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.state.expire_notice(now)
    }
}
