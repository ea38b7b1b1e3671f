use crate::validation::{Validate, ValidationError, validate_data, validate_response};
use crate::wire::{Ack, Payload};
use crate::{
    AuthRequest, AuthResponse, ConferencesResponse, GamesByDate, ScheduleAction, ScheduleStatus,
    StatSummary, TeamPage, TeamsResponse, TournamentData, games_path,
};
use chrono::{Local, NaiveDate};
use log::{debug, error, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Client for the college-basketball stats backend.
#[derive(Debug, Clone)]
pub struct StatsApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for StatsApi {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(StatusCode, String),
    Parsing(serde_json::Error, String),
    /// 401. The stored token is no longer accepted; the caller should re-authenticate.
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Validation(ValidationError),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(status, url) => write!(f, "API error for {url}: {status}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Unauthorized(url) => write!(f, "Unauthorized: {url}"),
            ApiError::Forbidden(url) => write!(f, "Forbidden: {url}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Validation(e) => write!(f, "{e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl StatsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("courtside/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.trim().is_empty());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// `GET /tournament`: the bracket forest.
    pub async fn fetch_tournament(&self) -> ApiResult<TournamentData> {
        self.get("/tournament").await
    }

    /// `GET /teams`: every team with its conference and record.
    pub async fn fetch_teams(&self) -> ApiResult<TeamsResponse> {
        self.get_validated("/teams").await
    }

    /// `GET /teams-by-conference`.
    pub async fn fetch_teams_by_conference(&self) -> ApiResult<ConferencesResponse> {
        self.get_validated("/teams-by-conference").await
    }

    /// Games scheduled on `date`. Today's slate uses the bare `/games` endpoint.
    pub async fn fetch_games(&self, date: NaiveDate) -> ApiResult<GamesByDate> {
        let today = Local::now().date_naive();
        self.get(&games_path(date, today)).await
    }

    /// `GET /team/{id}?year=`: season page for one team.
    pub async fn fetch_team_page(&self, team_id: i64, year: u16) -> ApiResult<TeamPage> {
        self.get_validated(&format!("/team/{team_id}?year={year}")).await
    }

    /// `GET /stats`: keys of every statistic the backend tracks.
    pub async fn fetch_stats(&self) -> ApiResult<Vec<String>> {
        self.get("/stats").await
    }

    /// `GET /stats/{key}/summary`.
    pub async fn fetch_stat_summary(&self, key: &str) -> ApiResult<StatSummary> {
        self.get(&format!("/stats/{key}/summary")).await
    }

    /// `POST /authenticate`. Returns the bearer token on success.
    pub async fn authenticate(&self, request: &AuthRequest) -> ApiResult<String> {
        validate_data(request)?;
        let response: AuthResponse = self
            .send(self.request(Method::POST, "/authenticate").json(request), "/authenticate")
            .await?;
        validate_response(&response, "/authenticate")?;
        match response.data {
            Some(data) => Ok(data.token),
            None if response.message.is_empty() => {
                Err(ApiError::Other(format!("authentication {}", response.result)))
            }
            None => Err(ApiError::Other(response.message)),
        }
    }

    /// `GET /admin/schedule/status`.
    pub async fn admin_schedule_status(&self) -> ApiResult<ScheduleStatus> {
        self.get("/admin/schedule/status").await
    }

    /// Trigger one of the schedule loading operations. Returns the server's message.
    pub async fn admin_schedule(&self, action: ScheduleAction) -> ApiResult<String> {
        self.post_ack(&action.path()).await
    }

    /// `POST /admin/stats/{model}/run`.
    pub async fn run_model(&self, model: &str) -> ApiResult<String> {
        self.post_ack(&format!("/admin/stats/{model}/run")).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json");
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let payload = self
            .send_with(self.request(Method::GET, path), path, Payload::<T>::from_body)
            .await?;
        payload.into_data().map_err(|msg| ApiError::NotFound(format!("{path}: {msg}")))
    }

    async fn get_validated<T: DeserializeOwned + Validate>(&self, path: &str) -> ApiResult<T> {
        let value: T = self.get(path).await?;
        validate_response(&value, path)?;
        Ok(value)
    }

    async fn post_ack(&self, path: &str) -> ApiResult<String> {
        let ack: Ack = self
            .send(self.request(Method::POST, path).json(&EmptyBody {}), path)
            .await?;
        Ok(if ack.message.is_empty() { ack.result } else { ack.message })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> ApiResult<T> {
        self.send_with(request, path, |body| serde_json::from_str(body)).await
    }

    async fn send_with<T>(
        &self,
        request: RequestBuilder,
        path: &str,
        decode: impl FnOnce(&str) -> serde_json::Result<T>,
    ) -> ApiResult<T> {
        debug!("API {path}");
        let url = self.url(path);
        let response = request.send().await.map_err(|e| {
            error!("No response received from {url}: {e}");
            ApiError::Network(e, url.clone())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => {
                    warn!("Unauthorized: {url}");
                    ApiError::Unauthorized(url)
                }
                StatusCode::FORBIDDEN => {
                    error!("Forbidden access: {url}");
                    ApiError::Forbidden(url)
                }
                StatusCode::NOT_FOUND => {
                    error!("Resource not found: {url}");
                    ApiError::NotFound(url)
                }
                _ => {
                    error!("API error {status}: {url}");
                    ApiError::Api(status, url)
                }
            });
        }

        debug!("API {path} - {}", status.as_u16());
        let body = response.text().await.map_err(|e| ApiError::Network(e, url.clone()))?;
        decode(&body).map_err(|e| {
            error!("Could not parse response from {url}: {e}");
            debug!("Response body from {url}: {body}");
            ApiError::Parsing(e, url)
        })
    }
}

#[derive(Serialize)]
struct EmptyBody {}
