use crate::state::network::LoadingState;
use chrono::NaiveDate;
use courtside_api::{
    ConferencesResponse, GamesByDate, ScheduleAction, ScheduleStatus, StatSummary, TeamPage,
    TeamsResponse, TournamentData,
};
use crossterm::event::KeyEvent;

/// Which stats panel a summary is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySlot {
    Primary,
    Comparison,
}

#[derive(Debug, Clone)]
pub enum AdminCommand {
    Schedule(ScheduleAction),
    RunModel(String),
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadTournament,
    LoadGames { date: NaiveDate },
    LoadTeams,
    LoadConferences,
    LoadTeamPage { team_id: i64, year: u16 },
    LoadStats,
    LoadStatSummary { key: String, slot: SummarySlot },
    LoadScheduleStatus,
    Login { username: String, password: String },
    Admin(AdminCommand),
    /// Replace (or drop) the bearer token used for later requests.
    SetToken(Option<String>),
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TournamentLoaded { data: TournamentData },
    GamesLoaded { date: NaiveDate, games: GamesByDate },
    TeamsLoaded { teams: TeamsResponse },
    ConferencesLoaded { conferences: ConferencesResponse },
    TeamPageLoaded { page: TeamPage },
    StatsLoaded { keys: Vec<String> },
    StatSummaryLoaded { slot: SummarySlot, summary: StatSummary },
    ScheduleStatusLoaded { status: ScheduleStatus },
    LoggedIn { token: String },
    AdminCompleted { message: String },
    /// The backend rejected our token; the UI should fall back to login.
    Unauthorized { message: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    /// Pointer moved or clicked at an absolute terminal cell.
    Mouse { column: u16, row: u16, clicked: bool },
    Resize,
    AppStarted,
    RefreshTick,
    ToastExpired(u64),
}
