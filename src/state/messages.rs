use crate::state::app_settings::FeedSource;
use crate::state::network::LoadingState;
use crate::state::session::RefreshTicket;
use crossterm::event::KeyEvent;
use legends_api::{NewRegistration, Registered, Snapshot, TeamStatus};
use std::path::PathBuf;

/// A state-changing call against one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Promote { id: String, name: String },
    Delete { id: String, name: String },
    SetStatus { id: String, name: String, status: TeamStatus },
}

impl Mutation {
    pub fn id(&self) -> &str {
        match self {
            Mutation::Promote { id, .. } | Mutation::Delete { id, .. } | Mutation::SetStatus { id, .. } => id,
        }
    }

    pub fn team_name(&self) -> &str {
        match self {
            Mutation::Promote { name, .. }
            | Mutation::Delete { name, .. }
            | Mutation::SetStatus { name, .. } => name,
        }
    }

    /// Question asked before the call goes out, if any.
    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            Mutation::Promote { .. } => Some("Move this team to leaderboard?"),
            Mutation::Delete { .. } => Some("Delete this team? This action cannot be undone."),
            Mutation::SetStatus { .. } => None,
        }
    }

    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Mutation::Promote { .. } => "Failed to move to leaderboard",
            Mutation::Delete { .. } => "Deletion failed",
            Mutation::SetStatus { .. } => "Failed to update status",
        }
    }
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    Refresh { ticket: RefreshTicket, source: FeedSource },
    GenerateCode,
    Register { registration: NewRegistration },
    Mutate { mutation: Mutation },
    ExportPdf { dir: PathBuf },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    DataLoaded { ticket: RefreshTicket, snapshot: Snapshot, partial: Option<String> },
    DataFailed { ticket: RefreshTicket, message: String, transport: bool },
    CodeGenerated { code: String },
    CodeFailed { message: String },
    Registered { ack: Registered },
    RegistrationFailed { message: String },
    MutationSucceeded { mutation: Mutation, message: String },
    MutationFailed { mutation: Mutation, message: String },
    Exported { path: PathBuf, count: usize },
    ExportFailed { message: String },
}

impl NetworkResponse {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            NetworkResponse::DataFailed { .. }
                | NetworkResponse::CodeFailed { .. }
                | NetworkResponse::RegistrationFailed { .. }
                | NetworkResponse::MutationFailed { .. }
                | NetworkResponse::ExportFailed { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Periodic refresh timer fired.
    RefreshDue,
    /// Housekeeping tick; expires success banners.
    Tick,
}
