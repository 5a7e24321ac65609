pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types: canonical model, independent of the backend's two schemas
// ---------------------------------------------------------------------------

/// Which backend collection a record was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SourceKind {
    #[default]
    Registration,
    Leaderboard,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Registration => "REGISTRATION",
            SourceKind::Leaderboard => "LEADERBOARD",
        }
    }

    /// Parse the `collection` tag attached by `/api/all-data`.
    pub fn from_collection(tag: &str) -> Option<Self> {
        match tag.trim() {
            "participants" => Some(SourceKind::Registration),
            "leaderboard" => Some(SourceKind::Leaderboard),
            _ => None,
        }
    }
}

/// Presence flag of a leaderboard team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Online,
    Offline,
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Online => "online",
            TeamStatus::Offline => "offline",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TeamStatus::Online => "ONLINE",
            TeamStatus::Offline => "OFFLINE",
        }
    }

    /// Only `online`/`offline` are presence values. Registration states such
    /// as `registered` or `in_leaderboard` yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => Some(TeamStatus::Online),
            "offline" => Some(TeamStatus::Offline),
            _ => None,
        }
    }
}

/// A team record after field-name normalization. Both the registration shape
/// (`teamName`, `leaderboard_points`, ...) and the leaderboard shape (`name`,
/// `totalPoints`, ...) map onto this one type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub id: String,
    pub source: SourceKind,
    /// `teamName`, else `name`, else empty.
    pub team_name: String,
    /// The record carried a non-empty `name` key (leaderboard shape).
    pub has_leaderboard_name: bool,
    pub participant1: String,
    pub participant2: String,
    pub phone1: String,
    pub phone2: String,
    pub unique_code: String,
    pub status: Option<TeamStatus>,
    /// `in_leaderboard` join flag emitted by `GET /api/participants`.
    pub joined_leaderboard: bool,
    pub points: u32,
    pub wins: u32,
    pub games_played: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// The two collections as returned by one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub participants: Vec<Team>,
    pub leaderboard: Vec<Team>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.participants.len() + self.leaderboard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Body of `POST /api/participants`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewRegistration {
    pub participant1: String,
    pub participant2: String,
    pub phone1: String,
    pub phone2: String,
    #[serde(rename = "teamName")]
    pub team_name: String,
}

/// Successful registration acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub message: String,
    pub unique_code: String,
    pub id: Option<String>,
}
