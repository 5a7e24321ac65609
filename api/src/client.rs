use crate::wire::{
    AllDataResponse, ErrorBody, GenerateCodeResponse, MessageResponse, TeamRecord, text_from_value,
};
use crate::{NewRegistration, Registered, SourceKind, Snapshot, Team, TeamStatus};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
/// Shown when the backend fails without an `error` string.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Client for the tournament registration backend.
#[derive(Debug, Clone)]
pub struct LegendsApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for LegendsApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never got an answer (connection refused, timeout, ...).
    #[error("Cannot connect to {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    /// The backend answered with an error payload or a failure status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Parse error for {1}: {0}")]
    Parsing(#[source] serde_json::Error, String),
    #[error("Error: {0}")]
    Other(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(..))
    }
}

impl LegendsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client: Client::builder()
                .user_agent("legends-tui/0.1 (tournament console)")
                .build()
                .unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the backend for a fresh unique team code.
    pub async fn generate_code(&self) -> ApiResult<String> {
        let url = self.url("/api/generate-code");
        let raw: GenerateCodeResponse = self.send(self.client.get(&url), &url).await?;
        raw.unique_code
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| ApiError::Other("response did not include a unique code".into()))
    }

    /// Registration records, with the optional leaderboard join fields.
    pub async fn fetch_participants(&self) -> ApiResult<Vec<Team>> {
        let url = self.url("/api/participants");
        let raw: Vec<TeamRecord> = self.send(self.client.get(&url), &url).await?;
        Ok(normalize_all(raw, SourceKind::Registration))
    }

    /// Leaderboard records, sorted by points on the backend.
    pub async fn fetch_leaderboard(&self) -> ApiResult<Vec<Team>> {
        let url = self.url("/api/leaderboard");
        let raw: Vec<TeamRecord> = self.send(self.client.get(&url), &url).await?;
        Ok(normalize_all(raw, SourceKind::Leaderboard))
    }

    /// Both collections in one round trip.
    pub async fn fetch_all_data(&self) -> ApiResult<Snapshot> {
        let url = self.url("/api/all-data");
        let raw: AllDataResponse = self.send(self.client.get(&url), &url).await?;
        Ok(Snapshot {
            participants: normalize_all(
                raw.participants.unwrap_or_default(),
                SourceKind::Registration,
            ),
            leaderboard: normalize_all(raw.leaderboard.unwrap_or_default(), SourceKind::Leaderboard),
        })
    }

    pub async fn register_team(&self, registration: &NewRegistration) -> ApiResult<Registered> {
        let url = self.url("/api/participants");
        let raw: MessageResponse = self
            .send(self.client.post(&url).json(registration), &url)
            .await?;
        Ok(Registered {
            message: raw
                .message
                .unwrap_or_else(|| "Team registered successfully!".into()),
            unique_code: raw.unique_code.unwrap_or_default(),
            id: raw.id,
        })
    }

    pub async fn delete_team(&self, id: &str) -> ApiResult<String> {
        let url = self.url(&format!("/api/participants/{}", urlencoding::encode(id)));
        let raw: MessageResponse = self.send(self.client.delete(&url), &url).await?;
        Ok(raw.message.unwrap_or_else(|| "Team deleted successfully".into()))
    }

    pub async fn move_to_leaderboard(&self, id: &str) -> ApiResult<String> {
        let url = self.url(&format!("/api/move-to-leaderboard/{}", urlencoding::encode(id)));
        let raw: MessageResponse = self.send(self.client.post(&url), &url).await?;
        Ok(raw.message.unwrap_or_else(|| "Team moved to leaderboard".into()))
    }

    pub async fn set_status(&self, id: &str, status: TeamStatus) -> ApiResult<String> {
        let url = self.url(&format!("/api/leaderboard/{}/status", urlencoding::encode(id)));
        let body = serde_json::json!({ "status": status.as_str() });
        let raw: MessageResponse = self.send(self.client.post(&url).json(&body), &url).await?;
        Ok(raw.message.unwrap_or_else(|| "Status updated".into()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> ApiResult<T> {
        debug!("request {url}");
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        if let Some(message) = error_message(&body) {
            return Err(ApiError::Rejected { status: status.as_u16(), message });
        }
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: UNKNOWN_ERROR.to_owned(),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

/// Pull the `error` string out of an application-level failure body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if !value.is_object() {
        return None;
    }
    let parsed: ErrorBody = serde_json::from_value(value).ok()?;
    match parsed.error? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => Some(UNKNOWN_ERROR.to_owned()),
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Normalization: the backend's two record schemas → canonical Team
// ---------------------------------------------------------------------------

fn normalize_all(raw: Vec<TeamRecord>, origin: SourceKind) -> Vec<Team> {
    raw.into_iter().map(|r| normalize_team(r, origin)).collect()
}

/// Map one raw record onto the canonical `Team`.
///
/// `origin` is the collection the record arrived in; an explicit
/// `collection` tag overrides it. Text fields take the first non-empty key,
/// counters the first non-zero key.
pub fn normalize_team(raw: TeamRecord, origin: SourceKind) -> Team {
    let source = raw
        .collection
        .as_deref()
        .and_then(SourceKind::from_collection)
        .unwrap_or(origin);

    let has_leaderboard_name = present(&raw.name).is_some();
    let team_name = first_text(&raw.team_name, &raw.name);

    let status = raw
        .status
        .as_deref()
        .and_then(TeamStatus::parse)
        .or_else(|| raw.leaderboard_status.as_deref().and_then(TeamStatus::parse));

    let created_at = raw
        .created_at
        .as_ref()
        .or(raw.created_at_camel.as_ref())
        .and_then(parse_timestamp);

    Team {
        id: raw.id.unwrap_or_default(),
        source,
        team_name,
        has_leaderboard_name,
        participant1: first_text(&raw.participant1, &raw.participant_1),
        participant2: first_text(&raw.participant2, &raw.participant_2),
        phone1: raw.phone1.unwrap_or_default(),
        phone2: raw.phone2.unwrap_or_default(),
        unique_code: first_text(&raw.unique_code_camel, &raw.unique_code),
        status,
        joined_leaderboard: raw.in_leaderboard.unwrap_or(false),
        points: first_count(&[raw.total_points, raw.points, raw.leaderboard_points]),
        wins: first_count(&[raw.wins, raw.leaderboard_wins]),
        games_played: first_count(&[raw.games_played_camel, raw.games_played]),
        created_at,
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn first_text(primary: &Option<String>, fallback: &Option<String>) -> String {
    present(primary)
        .or_else(|| present(fallback))
        .unwrap_or_default()
        .to_owned()
}

fn first_count(candidates: &[Option<u32>]) -> u32 {
    candidates.iter().flatten().copied().find(|n| *n != 0).unwrap_or(0)
}

/// Firestore timestamps arrive as `{_seconds, _nanoseconds}`, as an HTTP
/// date or RFC 3339 string, or as epoch seconds/millis.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => {
            let seconds = map
                .get("_seconds")
                .or_else(|| map.get("seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("_nanoseconds")
                .or_else(|| map.get("nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            if raw.abs() >= 100_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        Value::String(_) => {
            let text = text_from_value(value)?;
            DateTime::parse_from_rfc3339(text.trim())
                .or_else(|_| DateTime::parse_from_rfc2822(text.trim()))
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn record(value: Value) -> TeamRecord {
        serde_json::from_value(value).expect("fixture should parse")
    }

    // -----------------------------------------------------------------------
    // Normalization, pinned to both historical shapes
    // -----------------------------------------------------------------------

    #[test]
    fn registration_shape_with_join_fields_normalizes() {
        let team = normalize_team(
            record(json!({
                "id": "p1",
                "teamName": "Knock Knock",
                "participant1": "Ann",
                "participant2": "Bob",
                "phone1": "+15551234567",
                "phone2": "5551234567",
                "uniqueCode": "AB12CD34",
                "status": "in_leaderboard",
                "in_leaderboard": true,
                "leaderboard_status": "online",
                "leaderboard_points": 12,
                "leaderboard_wins": 3,
                "games_played": 4,
                "created_at": { "_seconds": 1_700_000_000, "_nanoseconds": 0 }
            })),
            SourceKind::Registration,
        );
        assert_eq!(team.id, "p1");
        assert_eq!(team.source, SourceKind::Registration);
        assert_eq!(team.team_name, "Knock Knock");
        assert!(!team.has_leaderboard_name);
        assert!(team.joined_leaderboard);
        assert_eq!(team.status, Some(TeamStatus::Online));
        assert_eq!((team.points, team.wins, team.games_played), (12, 3, 4));
        assert_eq!(team.unique_code, "AB12CD34");
        assert_eq!(team.created_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn leaderboard_shape_normalizes() {
        let team = normalize_team(
            record(json!({
                "id": "l1",
                "name": "Dad Jokes",
                "status": "offline",
                "totalPoints": 30,
                "wins": 5,
                "gamesPlayed": 7,
                "collection": "leaderboard",
                "unique_code": "ZZ99"
            })),
            SourceKind::Registration,
        );
        assert_eq!(team.source, SourceKind::Leaderboard, "collection tag wins over origin");
        assert_eq!(team.team_name, "Dad Jokes");
        assert!(team.has_leaderboard_name);
        assert_eq!(team.status, Some(TeamStatus::Offline));
        assert_eq!((team.points, team.wins, team.games_played), (30, 5, 7));
        assert_eq!(team.unique_code, "ZZ99");
    }

    #[test]
    fn team_name_prefers_team_name_over_name() {
        let team = normalize_team(
            record(json!({ "teamName": "Primary", "name": "Secondary" })),
            SourceKind::Leaderboard,
        );
        assert_eq!(team.team_name, "Primary");

        let team = normalize_team(record(json!({ "teamName": "", "name": "Fallback" })), SourceKind::Leaderboard);
        assert_eq!(team.team_name, "Fallback");

        let team = normalize_team(record(json!({})), SourceKind::Leaderboard);
        assert_eq!(team.team_name, "");
    }

    #[test]
    fn zero_camel_case_counter_falls_through_to_snake_case() {
        let team = normalize_team(
            record(json!({ "totalPoints": 0, "leaderboard_points": 9, "wins": 0, "leaderboard_wins": 0 })),
            SourceKind::Leaderboard,
        );
        assert_eq!(team.points, 9);
        assert_eq!(team.wins, 0);
    }

    #[test]
    fn plain_points_key_is_accepted() {
        let team = normalize_team(
            record(json!({ "points": 12, "leaderboard_points": 3 })),
            SourceKind::Leaderboard,
        );
        assert_eq!(team.points, 12);
    }

    #[test]
    fn registration_status_is_not_a_presence_value() {
        let team = normalize_team(record(json!({ "status": "registered" })), SourceKind::Registration);
        assert_eq!(team.status, None);
    }

    #[test]
    fn participant_snake_case_fallback() {
        let team = normalize_team(
            record(json!({ "participant_1": "Cy", "participant_2": "Di" })),
            SourceKind::Leaderboard,
        );
        assert_eq!(team.participant1, "Cy");
        assert_eq!(team.participant2, "Di");
    }

    #[test]
    fn timestamps_parse_from_strings_and_numbers() {
        assert_eq!(
            parse_timestamp(&json!("Tue, 14 Nov 2023 22:13:20 GMT")).map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(
            parse_timestamp(&json!("2023-11-14T22:13:20Z")).map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(
            parse_timestamp(&json!(1_700_000_000_000i64)).map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(error_message(r#"{"error":"Team not found"}"#).as_deref(), Some("Team not found"));
        assert_eq!(error_message(r#"{"error":""}"#).as_deref(), Some(UNKNOWN_ERROR));
        assert_eq!(error_message(r#"{"message":"ok"}"#), None);
        assert_eq!(error_message(r#"[{"error":"x"}]"#), None);
        assert_eq!(error_message(r#"[{"id":"a","teamName":"Solo"}]"#), None);
        assert_eq!(error_message("<html>"), None);
    }

    // -----------------------------------------------------------------------
    // HTTP surface against a mock backend
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn generate_code_reads_unique_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/generate-code")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"uniqueCode":"QW12ER34"}"#)
            .create_async()
            .await;

        let api = LegendsApi::new(server.url());
        assert_eq!(api.generate_code().await.unwrap(), "QW12ER34");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn all_data_splits_collections() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/all-data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "participants": [
                        { "id": "a", "teamName": "Alpha", "collection": "participants" }
                    ],
                    "leaderboard": [
                        { "id": "b", "name": "Beta", "totalPoints": 4, "collection": "leaderboard" },
                        { "id": "c", "name": "Gamma", "collection": "leaderboard" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let snapshot = LegendsApi::new(server.url()).fetch_all_data().await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.participants[0].source, SourceKind::Registration);
        assert_eq!(snapshot.leaderboard[0].team_name, "Beta");
        assert_eq!(snapshot.leaderboard[0].points, 4);
        assert_eq!(snapshot.leaderboard[1].status, None);
    }

    #[tokio::test]
    async fn leaderboard_endpoint_keeps_backend_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/leaderboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"x","name":"Low","points":1},{"id":"y","name":"High","points":8}]"#)
            .create_async()
            .await;

        let teams = LegendsApi::new(server.url()).fetch_leaderboard().await.unwrap();
        let names: Vec<&str> = teams.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, ["Low", "High"]);
        assert!(teams.iter().all(|t| t.source == SourceKind::Leaderboard));
    }

    #[tokio::test]
    async fn all_data_missing_collections_read_as_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/all-data")
            .with_status(200)
            .with_body(r#"{"participants":null}"#)
            .create_async()
            .await;

        let snapshot = LegendsApi::new(server.url()).fetch_all_data().await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn register_posts_camel_case_team_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/participants")
            .match_body(Matcher::Json(json!({
                "participant1": "Ann",
                "participant2": "Bob",
                "phone1": "+15551234567",
                "phone2": "5551234567",
                "teamName": "Knock Knock"
            })))
            .with_status(200)
            .with_body(r#"{"message":"Team registered successfully!","uniqueCode":"AB12CD34","id":"p9"}"#)
            .create_async()
            .await;

        let registration = NewRegistration {
            participant1: "Ann".into(),
            participant2: "Bob".into(),
            phone1: "+15551234567".into(),
            phone2: "5551234567".into(),
            team_name: "Knock Knock".into(),
        };
        let ack = LegendsApi::new(server.url())
            .register_team(&registration)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(ack.unique_code, "AB12CD34");
        assert_eq!(ack.id.as_deref(), Some("p9"));
    }

    #[tokio::test]
    async fn server_error_string_is_surfaced_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/move-to-leaderboard/abc")
            .with_status(400)
            .with_body(r#"{"error":"Team already in leaderboard"}"#)
            .create_async()
            .await;

        let err = LegendsApi::new(server.url())
            .move_to_leaderboard("abc")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
        assert_eq!(err.to_string(), "Team already in leaderboard");
    }

    #[tokio::test]
    async fn failure_without_error_field_uses_generic_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/participants/abc")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let err = LegendsApi::new(server.url()).delete_team("abc").await.unwrap_err();
        assert_eq!(err.to_string(), UNKNOWN_ERROR);
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn error_payload_with_success_status_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/participants")
            .with_status(200)
            .with_body(r#"{"error":"Database not initialized"}"#)
            .create_async()
            .await;

        let err = LegendsApi::new(server.url())
            .fetch_participants()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Database not initialized");
    }

    #[tokio::test]
    async fn set_status_sends_lowercase_status_and_encodes_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(r"^/api/leaderboard/a%20b/status$".into()))
            .match_body(Matcher::Json(json!({ "status": "online" })))
            .with_status(200)
            .with_body(r#"{"message":"Status updated"}"#)
            .create_async()
            .await;

        let message = LegendsApi::new(server.url())
            .set_status("a b", TeamStatus::Online)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(message, "Status updated");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let api = LegendsApi::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        let err = api.fetch_all_data().await.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err}");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(LegendsApi::new("http://host:5000/").base_url(), "http://host:5000");
    }
}
