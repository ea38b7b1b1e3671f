use crate::state::messages::{AdminCommand, NetworkRequest, NetworkResponse};
use courtside_api::AuthRequest;
use courtside_api::client::{ApiError, StatsApi};
use log::{debug, error, info, warn};
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

/// Owns the API client and serves requests one at a time.
pub struct NetworkWorker {
    client: StatsApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: StatsApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self { client, requests, responses, is_loading: Arc::new(AtomicBool::new(false)) }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            if let NetworkRequest::SetToken(token) = request {
                debug!("network worker token {}", if token.is_some() { "set" } else { "cleared" });
                self.client.set_token(token);
                continue;
            }

            self.start_loading_animation().await;
            let result = self.handle(request).await;
            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = match result {
                Ok(response) => response,
                Err(err) if err.is_unauthorized() => {
                    warn!("session rejected by server: {err}");
                    self.client.set_token(None);
                    NetworkResponse::Unauthorized { message: err.to_string() }
                }
                Err(err) => NetworkResponse::Error { message: err.to_string() },
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&mut self, request: NetworkRequest) -> Result<NetworkResponse, ApiError> {
        match request {
            NetworkRequest::LoadTournament => {
                debug!("loading tournament bracket");
                let data = self.client.fetch_tournament().await?;
                info!("tournament loaded: {} games", data.game_count());
                Ok(NetworkResponse::TournamentLoaded { data })
            }
            NetworkRequest::LoadGames { date } => {
                debug!("loading games for {date}");
                let games = self.client.fetch_games(date).await?;
                Ok(NetworkResponse::GamesLoaded { date, games })
            }
            NetworkRequest::LoadTeams => {
                let teams = self.client.fetch_teams().await?;
                Ok(NetworkResponse::TeamsLoaded { teams })
            }
            NetworkRequest::LoadConferences => {
                let conferences = self.client.fetch_teams_by_conference().await?;
                Ok(NetworkResponse::ConferencesLoaded { conferences })
            }
            NetworkRequest::LoadTeamPage { team_id, year } => {
                debug!("loading team {team_id} for {year}");
                let page = self.client.fetch_team_page(team_id, year).await?;
                Ok(NetworkResponse::TeamPageLoaded { page })
            }
            NetworkRequest::LoadStats => {
                let keys = self.client.fetch_stats().await?;
                Ok(NetworkResponse::StatsLoaded { keys })
            }
            NetworkRequest::LoadStatSummary { key, slot } => {
                debug!("loading stat summary {key} ({slot:?})");
                let summary = self.client.fetch_stat_summary(&key).await?;
                Ok(NetworkResponse::StatSummaryLoaded { slot, summary })
            }
            NetworkRequest::LoadScheduleStatus => {
                let status = self.client.admin_schedule_status().await?;
                Ok(NetworkResponse::ScheduleStatusLoaded { status })
            }
            NetworkRequest::Login { username, password } => {
                let token = self.client.authenticate(&AuthRequest { username, password }).await?;
                self.client.set_token(Some(token.clone()));
                info!("authenticated");
                Ok(NetworkResponse::LoggedIn { token })
            }
            NetworkRequest::Admin(command) => {
                let message = match command {
                    AdminCommand::Schedule(action) => {
                        info!("admin: {}", action.label());
                        self.client.admin_schedule(action).await?
                    }
                    AdminCommand::RunModel(model) => {
                        info!("admin: run model {model}");
                        self.client.run_model(&model).await?
                    }
                };
                Ok(NetworkResponse::AdminCompleted { message })
            }
            NetworkRequest::SetToken(_) => Err(ApiError::Other("token updates are not requests".into())),
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self.responses.send(NetworkResponse::LoadingStateChanged { loading_state }).await;

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
                let _ = responses.send(NetworkResponse::LoadingStateChanged { loading_state }).await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;

    /// Feed `requests` through a worker and collect every non-spinner response.
    async fn exchange(client: StatsApi, requests: Vec<NetworkRequest>) -> Vec<NetworkResponse> {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(256);
        let task = tokio::spawn(NetworkWorker::new(client, req_rx, resp_tx).run());
        for request in requests {
            req_tx.send(request).await.unwrap();
        }
        drop(req_tx);
        task.await.unwrap();

        let mut out = Vec::new();
        while let Ok(response) = resp_rx.try_recv() {
            if !matches!(response, NetworkResponse::LoadingStateChanged { .. }) {
                out.push(response);
            }
        }
        out
    }

    #[tokio::test]
    async fn tournament_is_delivered() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tournament")
            .with_status(200)
            .with_body(
                json!({
                    "result": "SUCCESS",
                    "message": "",
                    "data": { "roots": [{ "game": { "id": 9, "date": "2024-04-08" } }] }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let responses = exchange(StatsApi::with_base_url(server.url()), vec![NetworkRequest::LoadTournament]).await;
        match responses.as_slice() {
            [NetworkResponse::TournamentLoaded { data }] => assert_eq!(data.game_count(), 1),
            other => panic!("unexpected responses: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_token_becomes_unauthorized() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/stats").with_status(401).create_async().await;

        let mut client = StatsApi::with_base_url(server.url());
        client.set_token(Some("stale".into()));
        let responses = exchange(client, vec![NetworkRequest::LoadStats]).await;
        assert!(matches!(responses.as_slice(), [NetworkResponse::Unauthorized { .. }]));
    }

    #[tokio::test]
    async fn login_token_is_used_for_later_requests() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/authenticate")
            .with_status(200)
            .with_body(json!({ "result": "SUCCESS", "message": "", "data": { "token": "fresh" } }).to_string())
            .create_async()
            .await;
        let stats = server
            .mock("GET", "/stats")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(json!(["ppg", "rpg"]).to_string())
            .create_async()
            .await;

        let responses = exchange(
            StatsApi::with_base_url(server.url()),
            vec![
                NetworkRequest::Login { username: "coach".into(), password: "pw".into() },
                NetworkRequest::LoadStats,
            ],
        )
        .await;
        stats.assert_async().await;
        match responses.as_slice() {
            [NetworkResponse::LoggedIn { token }, NetworkResponse::StatsLoaded { keys }] => {
                assert_eq!(token, "fresh");
                assert_eq!(keys.len(), 2);
            }
            other => panic!("unexpected responses: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failures_surface_as_errors() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/teams").with_status(500).create_async().await;

        let responses = exchange(StatsApi::with_base_url(server.url()), vec![NetworkRequest::LoadTeams]).await;
        assert!(matches!(responses.as_slice(), [NetworkResponse::Error { .. }]));
    }
}
