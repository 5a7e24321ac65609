use crate::export;
use crate::state::app_settings::FeedSource;
use crate::state::messages::{Mutation, NetworkRequest, NetworkResponse};
use crate::state::session::RefreshTicket;
use legends_api::client::{ApiResult, LegendsApi};
use legends_api::{NewRegistration, Snapshot, Team};
use log::{debug, error, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: LegendsApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: LegendsApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let response = match request {
                NetworkRequest::Refresh { ticket, source } => self.handle_refresh(ticket, source).await,
                NetworkRequest::GenerateCode => self.handle_generate_code().await,
                NetworkRequest::Register { registration } => self.handle_register(registration).await,
                NetworkRequest::Mutate { mutation } => self.handle_mutation(mutation).await,
                NetworkRequest::ExportPdf { dir } => self.handle_export_pdf(dir).await,
            };

            debug!("network request complete");
            self.stop_loading_animation(!response.is_failure()).await;

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_refresh(&self, ticket: RefreshTicket, source: FeedSource) -> NetworkResponse {
        debug!("refreshing roster ({source:?}, {ticket:?})");
        match load_roster(&self.client, source).await {
            Ok(Roster { snapshot, partial }) => NetworkResponse::DataLoaded { ticket, snapshot, partial },
            Err(e) => {
                warn!("roster fetch failed: {e}");
                NetworkResponse::DataFailed { ticket, transport: e.is_transport(), message: e.to_string() }
            }
        }
    }

    async fn handle_generate_code(&self) -> NetworkResponse {
        debug!("generating unique code");
        match self.client.generate_code().await {
            Ok(code) => NetworkResponse::CodeGenerated { code },
            Err(e) => NetworkResponse::CodeFailed { message: e.to_string() },
        }
    }

    async fn handle_register(&self, registration: NewRegistration) -> NetworkResponse {
        debug!("registering team {}", registration.team_name);
        match self.client.register_team(&registration).await {
            Ok(ack) => NetworkResponse::Registered { ack },
            Err(e) => NetworkResponse::RegistrationFailed { message: e.to_string() },
        }
    }

    async fn handle_mutation(&self, mutation: Mutation) -> NetworkResponse {
        debug!("applying {mutation:?}");
        let result = match &mutation {
            Mutation::Promote { id, .. } => self.client.move_to_leaderboard(id).await,
            Mutation::Delete { id, .. } => self.client.delete_team(id).await,
            Mutation::SetStatus { id, status, .. } => self.client.set_status(id, *status).await,
        };
        match result {
            Ok(message) => NetworkResponse::MutationSucceeded { mutation, message },
            Err(e) => NetworkResponse::MutationFailed { mutation, message: e.to_string() },
        }
    }

    async fn handle_export_pdf(&self, dir: PathBuf) -> NetworkResponse {
        debug!("exporting participants to {}", dir.display());
        match export::export_pdf(&self.client, &dir).await {
            Ok((path, count)) => NetworkResponse::Exported { path, count },
            Err(e) => NetworkResponse::ExportFailed { message: e.to_string() },
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

/// A fetched roster. `partial` names the collection that failed to load when
/// the other one still came back.
#[derive(Debug, Default)]
pub struct Roster {
    pub snapshot: Snapshot,
    pub partial: Option<String>,
}

/// One fetch of the roster from the configured endpoint.
pub async fn load_roster(client: &LegendsApi, source: FeedSource) -> ApiResult<Roster> {
    match source {
        FeedSource::Combined => Ok(Roster { snapshot: client.fetch_all_data().await?, partial: None }),
        FeedSource::Registrations => Ok(Roster {
            snapshot: Snapshot {
                participants: client.fetch_participants().await?,
                leaderboard: Vec::new(),
            },
            partial: None,
        }),
        FeedSource::Split => {
            let (participants, leaderboard) =
                tokio::join!(client.fetch_participants(), client.fetch_leaderboard());
            let (participants, leaderboard) = match (participants, leaderboard) {
                (Err(e), Err(other)) => {
                    warn!("leaderboard fetch failed too: {other}");
                    return Err(e);
                }
                pair => pair,
            };

            let mut failures = Vec::new();
            let participants = or_empty(participants, "registrations", &mut failures);
            let leaderboard = or_empty(leaderboard, "leaderboard", &mut failures);
            Ok(Roster {
                snapshot: Snapshot { participants, leaderboard },
                partial: (!failures.is_empty()).then(|| failures.join("; ")),
            })
        }
    }
}

fn or_empty(result: ApiResult<Vec<Team>>, collection: &str, failures: &mut Vec<String>) -> Vec<Team> {
    result.unwrap_or_else(|e| {
        warn!("{collection} fetch failed, showing it empty: {e}");
        failures.push(format!("Could not load {collection}: {e}"));
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn mock_json(server: &mut mockito::Server, path: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn registrations_source_reads_participants_only() {
        let mut server = mockito::Server::new_async().await;
        mock_json(&mut server, "/api/participants", r#"[{"id":"a","teamName":"Alpha"}]"#).await;
        let leaderboard = server
            .mock("GET", "/api/leaderboard")
            .expect(0)
            .create_async()
            .await;

        let snapshot = load_roster(&LegendsApi::new(server.url()), FeedSource::Registrations)
            .await
            .unwrap()
            .snapshot;
        assert_eq!(snapshot.participants.len(), 1);
        assert!(snapshot.leaderboard.is_empty());
        leaderboard.assert_async().await;
    }

    #[tokio::test]
    async fn split_source_joins_both_endpoints() {
        let mut server = mockito::Server::new_async().await;
        mock_json(&mut server, "/api/participants", r#"[{"id":"a","teamName":"Alpha"}]"#).await;
        mock_json(&mut server, "/api/leaderboard", r#"[{"id":"b","name":"Beta","totalPoints":3}]"#).await;

        let roster = load_roster(&LegendsApi::new(server.url()), FeedSource::Split).await.unwrap();
        assert!(roster.partial.is_none());
        let snapshot = roster.snapshot;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.leaderboard[0].points, 3);
    }

    #[tokio::test]
    async fn split_source_keeps_participants_when_leaderboard_fails() {
        let mut server = mockito::Server::new_async().await;
        mock_json(
            &mut server,
            "/api/participants",
            r#"[{"id":"a","teamName":"Alpha"},{"id":"b","teamName":"Bravo"}]"#,
        )
        .await;
        server
            .mock("GET", "/api/leaderboard")
            .with_status(500)
            .with_body(r#"{"error":"boom"}"#)
            .create_async()
            .await;

        let roster = load_roster(&LegendsApi::new(server.url()), FeedSource::Split).await.unwrap();
        let names: Vec<&str> = roster.snapshot.participants.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Bravo"]);
        assert!(roster.snapshot.leaderboard.is_empty());
        assert_eq!(roster.partial.as_deref(), Some("Could not load leaderboard: boom"));
    }

    #[tokio::test]
    async fn split_source_keeps_leaderboard_when_participants_fail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/participants")
            .with_status(500)
            .create_async()
            .await;
        mock_json(&mut server, "/api/leaderboard", r#"[{"id":"l","name":"Lima","points":4}]"#).await;

        let roster = load_roster(&LegendsApi::new(server.url()), FeedSource::Split).await.unwrap();
        assert!(roster.snapshot.participants.is_empty());
        assert_eq!(roster.snapshot.leaderboard.len(), 1);
        assert_eq!(
            roster.partial.as_deref(),
            Some("Could not load registrations: Unknown error occurred")
        );
    }

    #[tokio::test]
    async fn split_source_fails_only_when_both_sides_fail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/participants")
            .with_status(500)
            .with_body(r#"{"error":"down"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/leaderboard")
            .with_status(500)
            .with_body(r#"{"error":"boom"}"#)
            .create_async()
            .await;

        let err = load_roster(&LegendsApi::new(server.url()), FeedSource::Split)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "down");
    }
}
