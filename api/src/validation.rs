use crate::{
    AuthRequest, AuthResponse, Conference, ConferenceGroup, ConferencesResponse, Standing, Team,
    TeamGame, TeamListing, TeamPage, TeamsResponse,
};
use log::{debug, error};
use reqwest::Url;
use std::fmt;

/// One structural problem found in a response, e.g. `teams[3].logoUrl: invalid url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} issue", self.message, self.issues.len())?;
        if self.issues.len() != 1 {
            write!(f, "s")?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for ValidationError {}

/// Structural checks serde alone can't express: non-empty fields, URL shape.
pub trait Validate {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>);
}

/// Check `value`, returning every issue found.
pub fn validate_data<T: Validate>(value: &T) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    value.validate("", &mut issues);
    if issues.is_empty() {
        return Ok(());
    }
    error!("Validation error: {}", join_issues(&issues));
    Err(ValidationError { message: "Data validation failed".into(), issues })
}

/// Like [`validate_data`], but names the endpoint the value came from.
pub fn validate_response<T: Validate>(value: &T, endpoint: &str) -> Result<(), ValidationError> {
    debug!("Validating response from {endpoint}");
    let mut issues = Vec::new();
    value.validate("", &mut issues);
    if issues.is_empty() {
        return Ok(());
    }
    error!("API response validation failed for {endpoint}: {}", join_issues(&issues));
    Err(ValidationError {
        message: format!("Invalid response format from {endpoint}"),
        issues,
    })
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

fn field(path: &str, name: &str) -> String {
    if path.is_empty() { name.to_string() } else { format!("{path}.{name}") }
}

fn index(path: &str, name: &str, i: usize) -> String {
    format!("{}[{i}]", field(path, name))
}

fn require_non_empty(path: &str, name: &str, value: &str, message: &str, issues: &mut Vec<ValidationIssue>) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue { path: field(path, name), message: message.into() });
    }
}

fn optional_url(path: &str, name: &str, value: Option<&str>, issues: &mut Vec<ValidationIssue>) {
    if let Some(raw) = value
        && Url::parse(raw).is_err()
    {
        issues.push(ValidationIssue { path: field(path, name), message: format!("invalid url {raw:?}") });
    }
}

impl Validate for Team {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        optional_url(path, "logoUrl", self.logo_url.as_deref(), issues);
    }
}

impl Validate for TeamListing {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        optional_url(path, "logoUrl", self.logo_url.as_deref(), issues);
        optional_url(path, "conferenceLogoUrl", self.conference_logo_url.as_deref(), issues);
    }
}

impl Validate for TeamsResponse {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        for (i, team) in self.teams.iter().enumerate() {
            team.validate(&index(path, "teams", i), issues);
        }
    }
}

impl Validate for ConferenceGroup {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        optional_url(path, "logoUrl", self.logo_url.as_deref(), issues);
        for (i, team) in self.teams.iter().enumerate() {
            optional_url(&index(path, "teams", i), "logoUrl", team.logo_url.as_deref(), issues);
        }
    }
}

impl Validate for ConferencesResponse {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        for (i, conference) in self.conferences.iter().enumerate() {
            conference.validate(&index(path, "conferences", i), issues);
        }
    }
}

impl Validate for Standing {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        self.team.validate(&field(path, "team"), issues);
    }
}

impl Validate for Conference {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        optional_url(path, "logoUrl", self.logo_url.as_deref(), issues);
        for (i, standing) in self.standings.iter().enumerate() {
            standing.validate(&index(path, "standings", i), issues);
        }
    }
}

impl Validate for TeamGame {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        self.opponent.validate(&field(path, "opponent"), issues);
    }
}

impl Validate for TeamPage {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        self.team.validate(&field(path, "team"), issues);
        self.conference.validate(&field(path, "conference"), issues);
        for (i, game) in self.games.iter().enumerate() {
            game.validate(&index(path, "games", i), issues);
        }
    }
}

impl Validate for AuthRequest {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        require_non_empty(path, "username", &self.username, "Username is required", issues);
        require_non_empty(path, "password", &self.password, "Password is required", issues);
    }
}

impl Validate for AuthResponse {
    fn validate(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        if let Some(data) = &self.data {
            require_non_empty(&field(path, "data"), "token", &data.token, "Token is empty", issues);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthToken, Record};

    fn listing(logo: Option<&str>) -> TeamListing {
        TeamListing {
            id: 1,
            name: "Gonzaga".into(),
            logo_url: logo.map(Into::into),
            record: Record { name: None, wins: 20, losses: 3 },
            ..Default::default()
        }
    }

    #[test]
    fn valid_teams_response_passes() {
        let resp = TeamsResponse {
            teams: vec![listing(Some("https://cdn.example.com/zags.png")), listing(None)],
        };
        assert!(validate_response(&resp, "/teams").is_ok());
    }

    #[test]
    fn bad_logo_url_is_reported_with_path() {
        let resp = TeamsResponse { teams: vec![listing(None), listing(Some("not a url"))] };
        let err = validate_response(&resp, "/teams").unwrap_err();
        assert_eq!(err.message, "Invalid response format from /teams");
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "teams[1].logoUrl");
    }

    #[test]
    fn login_requires_username_and_password() {
        let err = validate_data(&AuthRequest::default()).unwrap_err();
        let paths: Vec<&str> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["username", "password"]);
        assert_eq!(err.issues[0].message, "Username is required");
        assert_eq!(err.to_string(), "Data validation failed (2 issues)");
    }

    #[test]
    fn auth_response_with_empty_token_fails() {
        let resp = AuthResponse {
            result: "SUCCESS".into(),
            message: String::new(),
            data: Some(AuthToken { token: " ".into() }),
        };
        let err = validate_data(&resp).unwrap_err();
        assert_eq!(err.issues[0].path, "data.token");

        let denied = AuthResponse { result: "FAILURE".into(), message: "bad creds".into(), data: None };
        assert!(validate_data(&denied).is_ok());
    }

    #[test]
    fn team_page_walks_nested_teams() {
        let page = TeamPage {
            team: Team { logo_url: Some("ftp//broken".into()), ..Default::default() },
            conference: Conference {
                standings: vec![Standing {
                    team: Team { logo_url: Some("bad".into()), ..Default::default() },
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_response(&page, "/team/7").unwrap_err();
        let paths: Vec<&str> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["team.logoUrl", "conference.standings[0].team.logoUrl"]);
    }
}
