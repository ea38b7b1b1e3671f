use crate::app::MenuItem;
use crate::bracket::connector::Direction;
use crate::bracket::layout::MeasuredLayout;
use crate::state::messages::AdminCommand;
use crate::state::toasts::Toasts;
use crate::stats::correlation::Correlation;
use chrono::{Datelike, Local, NaiveDate};
use courtside_api::{
    BracketIndex, ConferenceGroup, ConferenceTeam, GameNode, GamesByDate, ScheduleAction, ScheduleStatus,
    StatSummary, TeamListing, TeamPage, TournamentData,
};

/// Season a date belongs to. Seasons are named after the year they end in,
/// and practice starts in November.
pub fn season_for(date: NaiveDate) -> u16 {
    let year = date.year() as u16;
    if date.month() >= 11 { year + 1 } else { year }
}

/// Single-line text field used by search boxes and the login form.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    pub value: String,
    pub active: bool,
}

impl TextInput {
    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.active = false;
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.is_empty() || text.to_lowercase().contains(&self.value.trim().to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

/// Scroll offsets and measured card geometry, owned by the bracket widget.
#[derive(Debug, Default)]
pub struct BracketViewport {
    pub first_column: usize,
    pub scroll_offset: u16,
    pub layout: MeasuredLayout,
}

#[derive(Debug, Default)]
pub struct BracketState {
    pub data: Option<TournamentData>,
    /// Built once per snapshot in [`BracketState::load`].
    pub index: BracketIndex,
    /// Game ids of each date column, left to right, as of the last load.
    columns: Vec<Vec<i64>>,
    pub selected_column: usize,
    pub selected_game: usize,
    pub direction: Direction,
    /// Root-first path to the selected game.
    pub highlight: Vec<i64>,
    pub hover: Option<i64>,
    pub viewport: BracketViewport,
}

impl BracketState {
    /// Install a fresh snapshot, keeping the selected game when it survives.
    pub fn load(&mut self, data: TournamentData) {
        let previous = self.selected_game_id();
        self.index = BracketIndex::build(&data);
        self.columns = data
            .collect_by_date()
            .iter()
            .map(|column| column.games.iter().map(|n| n.game.id).collect())
            .collect();
        self.data = Some(data);
        self.selected_column = 0;
        self.selected_game = 0;
        if let Some(id) = previous {
            self.select(id);
        }
        self.hover = self.hover.filter(|id| self.index.contains(*id));
        self.viewport.layout.clear();
        self.refresh_highlight();
    }

    /// Number of games in each date column, left to right.
    pub fn column_sizes(&self) -> Vec<usize> {
        self.columns.iter().map(Vec::len).collect()
    }

    pub fn selected_game_id(&self) -> Option<i64> {
        self.columns.get(self.selected_column)?.get(self.selected_game).copied()
    }

    pub fn selected_node(&self) -> Option<&GameNode> {
        self.index.get(self.data.as_ref()?, self.selected_game_id()?)
    }

    pub fn move_column(&mut self, delta: isize) {
        if self.columns.is_empty() {
            return;
        }
        self.selected_column = self.selected_column.saturating_add_signed(delta).min(self.columns.len() - 1);
        let len = self.columns[self.selected_column].len();
        self.selected_game = self.selected_game.min(len.saturating_sub(1));
        self.refresh_highlight();
    }

    pub fn move_game(&mut self, delta: isize) {
        let Some(len) = self.columns.get(self.selected_column).map(Vec::len) else {
            return;
        };
        self.selected_game = self.selected_game.saturating_add_signed(delta).min(len.saturating_sub(1));
        self.refresh_highlight();
    }

    /// Select a game by id, e.g. after a click. Returns false when the id isn't shown.
    pub fn select(&mut self, game_id: i64) -> bool {
        if !self.index.contains(game_id) {
            return false;
        }
        let found = self.columns.iter().enumerate().find_map(|(c, column)| {
            column.iter().position(|&id| id == game_id).map(|g| (c, g))
        });
        let Some((column, game)) = found else {
            return false;
        };
        self.selected_column = column;
        self.selected_game = game;
        self.refresh_highlight();
        true
    }

    /// Returns true when the hovered game changed.
    pub fn set_hover(&mut self, game_id: Option<i64>) -> bool {
        if self.hover == game_id {
            return false;
        }
        self.hover = game_id;
        true
    }

    pub fn toggle_direction(&mut self) {
        self.direction = match self.direction {
            Direction::LeftToRight => Direction::RightToLeft,
            Direction::RightToLeft => Direction::LeftToRight,
        };
        self.viewport.layout.mark_stale();
    }

    fn refresh_highlight(&mut self) {
        self.highlight = self.selected_game_id().map(|id| self.index.path_to(id)).unwrap_or_default();
        self.viewport.layout.mark_stale();
    }
}

// ---------------------------------------------------------------------------
// Games by date
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct GamesState {
    pub date: NaiveDate,
    pub data: Option<GamesByDate>,
    pub selected: usize,
}

impl Default for GamesState {
    fn default() -> Self {
        Self { date: Local::now().date_naive(), data: None, selected: 0 }
    }
}

impl GamesState {
    /// Move by `days` and return the date to fetch.
    pub fn shift(&mut self, days: i64) -> NaiveDate {
        self.date += chrono::Duration::days(days);
        self.selected = 0;
        self.data = None;
        self.date
    }

    pub fn today(&mut self) -> NaiveDate {
        self.date = Local::now().date_naive();
        self.selected = 0;
        self.data = None;
        self.date
    }

    pub fn load(&mut self, date: NaiveDate, games: GamesByDate) {
        // A slow response for a day we've already left is dropped.
        if date != self.date {
            return;
        }
        self.selected = self.selected.min(games.games.len().saturating_sub(1));
        self.data = Some(games);
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.data.as_ref().map_or(0, |d| d.games.len());
        self.selected = self.selected.saturating_add_signed(delta).min(len.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamsState {
    pub teams: Vec<TeamListing>,
    pub search: TextInput,
    pub conference_filter: Option<String>,
    pub selected: usize,
    pub page: Option<TeamPage>,
}

impl TeamsState {
    pub fn load(&mut self, teams: Vec<TeamListing>) {
        self.teams = teams;
        self.teams.sort_by(|a, b| a.name.cmp(&b.name));
        self.clamp_selection();
    }

    /// Distinct conference names, sorted.
    pub fn conferences(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.teams.iter().filter_map(|t| t.conference.as_deref()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn filtered(&self) -> Vec<&TeamListing> {
        self.teams
            .iter()
            .filter(|t| self.search.matches(&t.name) || self.search.matches(&t.nickname))
            .filter(|t| match &self.conference_filter {
                Some(conf) => t.conference.as_deref() == Some(conf.as_str()),
                None => true,
            })
            .collect()
    }

    /// All → first conference → … → last conference → all.
    pub fn cycle_conference(&mut self) {
        let next = {
            let names = self.conferences();
            match &self.conference_filter {
                None => names.first().map(|s| s.to_string()),
                Some(current) => names
                    .iter()
                    .position(|n| n == current)
                    .and_then(|i| names.get(i + 1))
                    .map(|s| s.to_string()),
            }
        };
        self.conference_filter = next;
        self.selected = 0;
    }

    pub fn selected_team(&self) -> Option<&TeamListing> {
        self.filtered().get(self.selected).copied()
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add_signed(delta);
        self.clamp_selection();
    }

    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.filtered().len().saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Conferences
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ConferencesState {
    pub groups: Vec<ConferenceGroup>,
    pub search: TextInput,
    pub scroll_offset: u16,
}

impl ConferencesState {
    /// Groups with at least one team matching the search. A search that names
    /// the conference keeps every team in it.
    pub fn filtered(&self) -> Vec<(&ConferenceGroup, Vec<&ConferenceTeam>)> {
        self.groups
            .iter()
            .filter_map(|group| {
                let teams: Vec<&ConferenceTeam> = if !self.search.is_empty() && self.search.matches(&group.name) {
                    group.teams.iter().collect()
                } else {
                    group
                        .teams
                        .iter()
                        .filter(|t| self.search.matches(&t.name) || self.search.matches(&t.nickname))
                        .collect()
                };
                (!teams.is_empty()).then_some((group, teams))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StatsState {
    pub keys: Vec<String>,
    pub selected: usize,
    pub comparison: Option<usize>,
    pub summary: Option<StatSummary>,
    pub comparison_summary: Option<StatSummary>,
    pub correlation: Option<Correlation>,
    pub scroll_offset: u16,
}

impl StatsState {
    pub fn load_keys(&mut self, mut keys: Vec<String>) {
        keys.sort();
        self.keys = keys;
        self.selected = self.selected.min(self.keys.len().saturating_sub(1));
        self.comparison = None;
        self.comparison_summary = None;
        self.correlation = None;
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.keys.get(self.selected).map(String::as_str)
    }

    pub fn comparison_key(&self) -> Option<&str> {
        self.comparison.and_then(|i| self.keys.get(i)).map(String::as_str)
    }

    /// Returns the newly selected key when the selection moved.
    pub fn move_selection(&mut self, delta: isize) -> Option<String> {
        let next = self.selected.saturating_add_signed(delta).min(self.keys.len().saturating_sub(1));
        if next == self.selected || self.keys.is_empty() {
            return None;
        }
        self.selected = next;
        self.summary = None;
        self.scroll_offset = 0;
        if self.comparison == Some(next) {
            self.comparison = None;
            self.comparison_summary = None;
        }
        self.correlation = None;
        self.selected_key().map(String::from)
    }

    /// Step the comparison stat through every key except the selected one,
    /// then back to none. Returns the key to fetch, if any.
    pub fn cycle_comparison(&mut self) -> Option<String> {
        let len = self.keys.len();
        let mut candidate = self.comparison.map_or(0, |i| i + 1);
        if candidate == self.selected {
            candidate += 1;
        }
        self.comparison_summary = None;
        self.correlation = None;
        if candidate >= len {
            self.comparison = None;
            return None;
        }
        self.comparison = Some(candidate);
        self.comparison_key().map(String::from)
    }

    pub fn set_summary(&mut self, summary: StatSummary) {
        if Some(summary.key.as_str()) != self.selected_key() {
            return;
        }
        self.summary = Some(summary);
        self.update_correlation();
    }

    pub fn set_comparison(&mut self, summary: StatSummary) {
        if Some(summary.key.as_str()) != self.comparison_key() {
            return;
        }
        self.comparison_summary = Some(summary);
        self.update_correlation();
    }

    fn update_correlation(&mut self) {
        self.correlation = match (&self.summary, &self.comparison_summary) {
            (Some(primary), Some(other)) => Some(Correlation::between(primary, other)),
            _ => None,
        };
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    LoadTeams,
    DropTeams,
    LoadConferences,
    DropConferences,
    CreateSeason,
    ReloadSeason,
    RefreshSeason,
    DropSeason,
    RunModel,
}

pub const ADMIN_ACTIONS: [AdminAction; 9] = [
    AdminAction::LoadTeams,
    AdminAction::DropTeams,
    AdminAction::LoadConferences,
    AdminAction::DropConferences,
    AdminAction::CreateSeason,
    AdminAction::ReloadSeason,
    AdminAction::RefreshSeason,
    AdminAction::DropSeason,
    AdminAction::RunModel,
];

#[derive(Debug)]
pub struct AdminState {
    pub status: Option<ScheduleStatus>,
    pub selected: usize,
    pub season: u16,
    pub model: TextInput,
    pub last_message: Option<String>,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            status: None,
            selected: 0,
            season: season_for(Local::now().date_naive()),
            model: TextInput { value: "elo".into(), active: false },
            last_message: None,
        }
    }
}

impl AdminState {
    pub fn move_selection(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add_signed(delta).min(ADMIN_ACTIONS.len() - 1);
    }

    pub fn adjust_season(&mut self, delta: i32) {
        self.season = (i32::from(self.season) + delta).clamp(1900, 2999) as u16;
    }

    pub fn command(&self) -> Option<AdminCommand> {
        let season = self.season;
        let action = match ADMIN_ACTIONS[self.selected] {
            AdminAction::LoadTeams => ScheduleAction::LoadTeams,
            AdminAction::DropTeams => ScheduleAction::DropTeams,
            AdminAction::LoadConferences => ScheduleAction::LoadConferences,
            AdminAction::DropConferences => ScheduleAction::DropConferences,
            AdminAction::CreateSeason => ScheduleAction::CreateSeason(season),
            AdminAction::ReloadSeason => ScheduleAction::ReloadSeason(season),
            AdminAction::RefreshSeason => ScheduleAction::RefreshSeason(season),
            AdminAction::DropSeason => ScheduleAction::DropSeason(season),
            AdminAction::RunModel => {
                let model = self.model.value.trim();
                return (!model.is_empty()).then(|| AdminCommand::RunModel(model.to_string()));
            }
        };
        Some(AdminCommand::Schedule(action))
    }

    pub fn label(&self, action: AdminAction) -> String {
        match action {
            AdminAction::RunModel => format!("Run model {}", self.model.value.trim()),
            AdminAction::LoadTeams => ScheduleAction::LoadTeams.label(),
            AdminAction::DropTeams => ScheduleAction::DropTeams.label(),
            AdminAction::LoadConferences => ScheduleAction::LoadConferences.label(),
            AdminAction::DropConferences => ScheduleAction::DropConferences.label(),
            AdminAction::CreateSeason => ScheduleAction::CreateSeason(self.season).label(),
            AdminAction::ReloadSeason => ScheduleAction::ReloadSeason(self.season).label(),
            AdminAction::RefreshSeason => ScheduleAction::RefreshSeason(self.season).label(),
            AdminAction::DropSeason => ScheduleAction::DropSeason(self.season).label(),
        }
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub submitting: bool,
    /// Tab to return to once authenticated.
    pub resume_tab: MenuItem,
}

impl LoginState {
    pub fn push(&mut self, c: char) {
        match self.focus {
            LoginField::Username => self.username.push(c),
            LoginField::Password => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            LoginField::Username => self.username.pop(),
            LoginField::Password => self.password.pop(),
        };
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub token: Option<String>,
    pub bracket: BracketState,
    pub games: GamesState,
    pub teams: TeamsState,
    pub conferences: ConferencesState,
    pub stats: StatsState,
    pub admin: AdminState,
    pub login: LoginState,
    pub toasts: Toasts,
}
