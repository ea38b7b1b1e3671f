pub mod bracket;
pub mod client;
pub mod validation;
pub mod wire;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use bracket::{BracketIndex, Edge, GameColumn, Side};

// ---------------------------------------------------------------------------
// Tournament bracket: a forest of games, each owning the games that fed it
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentData {
    /// Most-advanced games first (the championship, or the latest round played).
    pub roots: Vec<GameNode>,
    #[serde(default)]
    pub tournament: Option<TournamentInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub current_round: Option<String>,
}

/// One game plus the earlier games whose winners occupy its two slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameNode {
    pub game: Game,
    #[serde(default)]
    pub home_source: Option<Box<GameNode>>,
    #[serde(default)]
    pub away_source: Option<Box<GameNode>>,
}

impl GameNode {
    pub fn leaf(game: Game) -> Self {
        Self { game, home_source: None, away_source: None }
    }

    pub fn with_sources(game: Game, home: Option<GameNode>, away: Option<GameNode>) -> Self {
        Self {
            game,
            home_source: home.map(Box::new),
            away_source: away.map(Box::new),
        }
    }

    /// First-round games have no known feeders.
    pub fn is_leaf(&self) -> bool {
        self.home_source.is_none() && self.away_source.is_none()
    }

    /// Feeder games in traversal order: home first, then away.
    pub fn sources(&self) -> impl Iterator<Item = (Side, &GameNode)> {
        self.home_source
            .as_deref()
            .map(|n| (Side::Home, n))
            .into_iter()
            .chain(self.away_source.as_deref().map(|n| (Side::Away, n)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    #[serde(default)]
    pub season: u16,
    /// Date key exactly as the API sent it. Bracket columns group on this string.
    pub date: String,
    #[serde(default)]
    pub home_team: Option<Team>,
    #[serde(default)]
    pub away_team: Option<Team>,
    #[serde(default)]
    pub home_team_seed: Option<u8>,
    #[serde(default)]
    pub away_team_seed: Option<u8>,
    #[serde(default)]
    pub home_score: Option<u16>,
    #[serde(default)]
    pub away_score: Option<u16>,
}

impl Game {
    pub fn status(&self) -> GameStatus {
        match (self.home_score, self.away_score) {
            (Some(_), Some(_)) => GameStatus::Final,
            _ => GameStatus::Scheduled,
        }
    }

    /// `Some(true)` when the home side outscored the away side. Unplayed games
    /// have no winner.
    pub fn home_won(&self) -> Option<bool> {
        let (home, away) = self.home_score.zip(self.away_score)?;
        Some(home > away)
    }

    pub fn home_name(&self) -> &str {
        self.home_team.as_ref().map(|t| t.name.as_str()).unwrap_or("TBD")
    }

    pub fn away_name(&self) -> &str {
        self.away_team.as_ref().map(|t| t.name.as_str()).unwrap_or("TBD")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    Scheduled,
    Final,
}

// ---------------------------------------------------------------------------
// Teams and conferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub name: Option<String>,
    pub wins: u32,
    pub losses: u32,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Records {
    pub conference: Record,
    pub overall: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub team: Team,
    pub conference_record: Record,
    pub overall_record: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub standings: Vec<Standing>,
}

/// Row of `GET /teams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListing {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub conference_logo_url: Option<String>,
    #[serde(default)]
    pub conference_id: i64,
    pub record: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<TeamListing>,
}

/// Row of `GET /teams-by-conference`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceTeam {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub conference_id: i64,
    pub overall_record: Record,
    pub conference_record: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceGroup {
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub teams: Vec<ConferenceTeam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConferencesResponse {
    pub conferences: Vec<ConferenceGroup>,
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// Row of `GET /games/{yyyymmdd}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    pub id: i64,
    #[serde(default)]
    pub season: u16,
    pub date: String,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub home_team_seed: Option<u8>,
    #[serde(default)]
    pub away_team_seed: Option<u8>,
    #[serde(default)]
    pub home_score: Option<u16>,
    #[serde(default)]
    pub away_score: Option<u16>,
    #[serde(default)]
    pub is_neutral: bool,
    #[serde(default)]
    pub conference_game: Option<Conference>,
    #[serde(default)]
    pub spread: Option<String>,
    #[serde(default)]
    pub over_under: Option<f64>,
    #[serde(default)]
    pub home_money_line: Option<i32>,
    #[serde(default)]
    pub away_money_line: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamesByDate {
    #[serde(default)]
    pub season: u16,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub games: Vec<GameDetail>,
}

/// One line of a team's season schedule, from the team's point of view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGame {
    pub id: i64,
    pub opponent: Team,
    pub at_vs: String,
    #[serde(default)]
    pub is_neutral_site: bool,
    pub date: String,
    pub score: u16,
    pub opp_score: u16,
    pub w_or_l: String,
    #[serde(default)]
    pub spread: Option<f64>,
    #[serde(default)]
    pub spread_description: Option<String>,
    #[serde(default)]
    pub spread_covered: Option<bool>,
    #[serde(default)]
    pub over_under: Option<f64>,
    #[serde(default)]
    pub over_or_under: Option<String>,
    #[serde(default)]
    pub money_line: Option<i32>,
    #[serde(default)]
    pub money_line_paid: Option<bool>,
    #[serde(default)]
    pub opp_money_line: Option<i32>,
    #[serde(default)]
    pub opp_money_line_paid: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPage {
    pub season: u16,
    pub team: Team,
    pub records: Records,
    pub conference: Conference,
    pub games: Vec<TeamGame>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStub {
    pub date: String,
    pub n: u32,
    pub min: f64,
    pub q1: f64,
    pub med: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    #[serde(default)]
    pub percentile95: f64,
    #[serde(default)]
    pub percentile99: f64,
    #[serde(default)]
    pub skewness: f64,
    #[serde(default)]
    pub kurtosis: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    pub rank: u32,
    pub rank_tie_best: u32,
    pub rank_tie_avg: f64,
    pub team: Team,
    pub statistic_value: f64,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSummary {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub season_year: u16,
    #[serde(default)]
    pub as_of: String,
    #[serde(default)]
    pub is_higher_better: bool,
    #[serde(default)]
    pub decimal_places: u8,
    #[serde(default)]
    pub as_of_summary: Option<SummaryStub>,
    #[serde(default)]
    pub summary_stubs: Vec<SummaryStub>,
    #[serde(default)]
    pub statistics: Vec<StatEntry>,
}

impl StatSummary {
    /// Historical summaries in chronological order.
    pub fn stubs_by_date(&self) -> Vec<&SummaryStub> {
        let mut stubs: Vec<&SummaryStub> = self.summary_stubs.iter().collect();
        stubs.sort_by(|a, b| bracket::compare_date_keys(&a.date, &b.date));
        stubs
    }

    pub fn format_value(&self, value: f64) -> String {
        format!("{value:.prec$}", prec = usize::from(self.decimal_places))
    }
}

// ---------------------------------------------------------------------------
// Auth and admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub result: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<AuthToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatus {
    pub year: u16,
    #[serde(default)]
    pub teams: u32,
    #[serde(default)]
    pub conferences: u32,
    #[serde(default)]
    pub games: u32,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStatus {
    #[serde(default)]
    pub teams: u32,
    #[serde(default)]
    pub conferences: u32,
    #[serde(default)]
    pub seasons: Vec<SeasonStatus>,
}

/// Data-loading operations the backend exposes under `/admin/schedule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    LoadTeams,
    DropTeams,
    LoadConferences,
    DropConferences,
    CreateSeason(u16),
    ReloadSeason(u16),
    RefreshSeason(u16),
    DropSeason(u16),
}

impl ScheduleAction {
    pub fn path(&self) -> String {
        match self {
            ScheduleAction::LoadTeams => "/admin/schedule/teams/load".into(),
            ScheduleAction::DropTeams => "/admin/schedule/teams/drop".into(),
            ScheduleAction::LoadConferences => "/admin/schedule/conferences/load".into(),
            ScheduleAction::DropConferences => "/admin/schedule/conferences/drop".into(),
            ScheduleAction::CreateSeason(year) => format!("/admin/schedule/seasons/{year}"),
            ScheduleAction::ReloadSeason(year) => format!("/admin/schedule/seasons/{year}/reload"),
            ScheduleAction::RefreshSeason(year) => format!("/admin/schedule/seasons/{year}/refresh"),
            ScheduleAction::DropSeason(year) => format!("/admin/schedule/seasons/{year}/drop"),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ScheduleAction::LoadTeams => "Load teams".into(),
            ScheduleAction::DropTeams => "Drop teams".into(),
            ScheduleAction::LoadConferences => "Load conferences".into(),
            ScheduleAction::DropConferences => "Drop conferences".into(),
            ScheduleAction::CreateSeason(year) => format!("Create season {year}"),
            ScheduleAction::ReloadSeason(year) => format!("Reload season {year}"),
            ScheduleAction::RefreshSeason(year) => format!("Refresh season {year}"),
            ScheduleAction::DropSeason(year) => format!("Drop season {year}"),
        }
    }
}

/// `GET /games` serves today's slate; any other day is addressed as `yyyymmdd`.
pub fn games_path(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "/games".to_string()
    } else {
        format!("/games/{}", date.format("%Y%m%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_status_requires_both_scores() {
        let mut game = Game { id: 1, date: "2024-03-01".into(), ..Default::default() };
        assert_eq!(game.status(), GameStatus::Scheduled);
        game.home_score = Some(70);
        assert_eq!(game.status(), GameStatus::Scheduled);
        game.away_score = Some(64);
        assert_eq!(game.status(), GameStatus::Final);
        assert_eq!(game.home_won(), Some(true));
    }

    #[test]
    fn missing_teams_render_as_tbd() {
        let game = Game { id: 9, date: "2024-03-01".into(), ..Default::default() };
        assert_eq!(game.home_name(), "TBD");
        assert_eq!(game.away_name(), "TBD");
        assert_eq!(game.home_won(), None);
    }

    #[test]
    fn game_node_deserializes_nested_sources() {
        let json = r#"{
            "roots": [{
                "game": {"id": 3, "season": 2024, "date": "2024-03-03"},
                "homeSource": {"game": {"id": 1, "date": "2024-03-01"}, "homeSource": null, "awaySource": null},
                "awaySource": null
            }],
            "tournament": {"name": "Big Dance", "year": 2024, "currentRound": "Final"}
        }"#;
        let data: TournamentData = serde_json::from_str(json).unwrap();
        assert_eq!(data.roots.len(), 1);
        let root = &data.roots[0];
        assert_eq!(root.game.id, 3);
        assert_eq!(root.home_source.as_ref().map(|n| n.game.id), Some(1));
        assert!(root.away_source.is_none());
        assert_eq!(data.tournament.and_then(|t| t.current_round).as_deref(), Some("Final"));
    }

    #[test]
    fn games_path_uses_bare_endpoint_for_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        assert_eq!(games_path(today, today), "/games");
        let other = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(games_path(other, today), "/games/20250302");
    }

    #[test]
    fn schedule_action_paths() {
        assert_eq!(ScheduleAction::LoadTeams.path(), "/admin/schedule/teams/load");
        assert_eq!(ScheduleAction::RefreshSeason(2024).path(), "/admin/schedule/seasons/2024/refresh");
        assert_eq!(ScheduleAction::DropSeason(2023).label(), "Drop season 2023");
    }

    #[test]
    fn stat_summary_formats_with_decimal_places() {
        let summary = StatSummary { decimal_places: 2, ..Default::default() };
        assert_eq!(summary.format_value(71.456), "71.46");
        let whole = StatSummary::default();
        assert_eq!(whole.format_value(3.6), "4");
    }

    #[test]
    fn record_displays_wins_dash_losses() {
        let record = Record { name: None, wins: 24, losses: 9 };
        assert_eq!(record.to_string(), "24-9");
    }
}
