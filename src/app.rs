use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, season_for};
use crate::state::auth::TokenStore;
use crate::state::messages::{NetworkRequest, SummarySlot};
use crate::state::toasts::Toasts;
use chrono::{Local, NaiveDate};
use courtside_api::{
    ConferencesResponse, GamesByDate, ScheduleStatus, StatSummary, TeamPage, TeamsResponse,
    TournamentData,
};
use log::{error, info, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Games,
    Teams,
    Conferences,
    Stats,
    Admin,
    Help,
    Login,
}

impl MenuItem {
    /// Tabs shown in the tab bar, in hotkey order.
    pub const TABS: [MenuItem; 6] = [
        MenuItem::Bracket,
        MenuItem::Games,
        MenuItem::Teams,
        MenuItem::Conferences,
        MenuItem::Stats,
        MenuItem::Admin,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::Bracket => "Bracket",
            MenuItem::Games => "Games",
            MenuItem::Teams => "Teams",
            MenuItem::Conferences => "Conferences",
            MenuItem::Stats => "Stats",
            MenuItem::Admin => "Admin",
            MenuItem::Help => "Help",
            MenuItem::Login => "Login",
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    tokens: TokenStore,
}

impl App {
    pub fn new(settings: AppSettings, tokens: TokenStore, toasts: Toasts) -> Self {
        let mut app = Self { state: AppState { toasts, ..Default::default() }, settings, tokens };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }
        for warning in app.settings.warnings.clone() {
            warn!("{warning}");
            app.state.toasts.error(warning);
        }

        app.state.token = app.tokens.load();
        if app.state.token.is_none() {
            app.require_login(MenuItem::Bracket);
        }
        app
    }

    /// Requests to send once the UI loop is running.
    pub fn startup_requests(&self) -> Vec<NetworkRequest> {
        match &self.state.token {
            Some(token) => {
                let mut requests = vec![NetworkRequest::SetToken(Some(token.clone()))];
                requests.extend(self.requests_for_tab(self.state.active_tab, false));
                requests
            }
            None => Vec::new(),
        }
    }

    /// Data a tab needs. With `force`, reload even what's already cached.
    pub fn requests_for_tab(&self, tab: MenuItem, force: bool) -> Vec<NetworkRequest> {
        if self.state.token.is_none() {
            return Vec::new();
        }
        let request = match tab {
            MenuItem::Bracket if force || self.state.bracket.data.is_none() => NetworkRequest::LoadTournament,
            MenuItem::Games if force || self.state.games.data.is_none() => {
                NetworkRequest::LoadGames { date: self.state.games.date }
            }
            MenuItem::Teams if force || self.state.teams.teams.is_empty() => NetworkRequest::LoadTeams,
            MenuItem::Conferences if force || self.state.conferences.groups.is_empty() => {
                NetworkRequest::LoadConferences
            }
            MenuItem::Stats if force || self.state.stats.keys.is_empty() => NetworkRequest::LoadStats,
            MenuItem::Admin => NetworkRequest::LoadScheduleStatus,
            _ => return Vec::new(),
        };
        vec![request]
    }

    /// Periodic reload of the views that show live scores.
    pub fn refresh_requests(&self) -> Vec<NetworkRequest> {
        match self.state.active_tab {
            MenuItem::Bracket | MenuItem::Games => self.requests_for_tab(self.state.active_tab, true),
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) -> Vec<NetworkRequest> {
        if self.state.active_tab == next || self.state.active_tab == MenuItem::Login {
            return Vec::new();
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if next == MenuItem::Bracket {
            self.state.bracket.viewport.layout.mark_stale();
        }
        self.requests_for_tab(next, false)
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_tournament_loaded(&mut self, data: TournamentData) {
        if data.roots.is_empty() {
            self.state.toasts.info("No tournament games yet");
        }
        self.state.bracket.load(data);
    }

    pub fn on_games_loaded(&mut self, date: NaiveDate, games: GamesByDate) {
        self.state.games.load(date, games);
    }

    pub fn on_teams_loaded(&mut self, teams: TeamsResponse) {
        self.state.teams.load(teams.teams);
    }

    pub fn on_conferences_loaded(&mut self, conferences: ConferencesResponse) {
        self.state.conferences.groups = conferences.conferences;
        self.state.conferences.scroll_offset = 0;
    }

    pub fn on_team_page_loaded(&mut self, page: TeamPage) {
        self.state.teams.page = Some(page);
    }

    /// Returns the summary request for whichever stat ends up selected.
    pub fn on_stats_loaded(&mut self, keys: Vec<String>) -> Vec<NetworkRequest> {
        self.state.stats.load_keys(keys);
        self.state
            .stats
            .selected_key()
            .map(|key| NetworkRequest::LoadStatSummary { key: key.to_string(), slot: SummarySlot::Primary })
            .into_iter()
            .collect()
    }

    pub fn on_stat_summary_loaded(&mut self, slot: SummarySlot, summary: StatSummary) {
        match slot {
            SummarySlot::Primary => self.state.stats.set_summary(summary),
            SummarySlot::Comparison => self.state.stats.set_comparison(summary),
        }
    }

    pub fn on_schedule_status_loaded(&mut self, status: ScheduleStatus) {
        self.state.admin.status = Some(status);
    }

    pub fn on_admin_completed(&mut self, message: String) -> Vec<NetworkRequest> {
        info!("admin: {message}");
        self.state.toasts.success(message.clone());
        self.state.admin.last_message = Some(message);
        vec![NetworkRequest::LoadScheduleStatus]
    }

    pub fn on_logged_in(&mut self, token: String) -> Vec<NetworkRequest> {
        if let Err(e) = self.tokens.save(&token) {
            error!("could not save session token to {}: {e}", self.tokens.path().display());
        }
        self.state.token = Some(token);
        let login = std::mem::take(&mut self.state.login);
        self.state.active_tab = login.resume_tab;
        self.state.toasts.success(format!("Signed in as {}", login.username));
        self.requests_for_tab(self.state.active_tab, true)
    }

    /// The server no longer accepts our token: forget it and ask for credentials.
    pub fn on_unauthorized(&mut self, message: String) {
        warn!("{message}");
        let resume = match self.state.active_tab {
            MenuItem::Login | MenuItem::Help => MenuItem::Bracket,
            tab => tab,
        };
        if self.state.active_tab == MenuItem::Login {
            self.state.login.submitting = false;
            self.state.login.error = Some("Invalid username or password".into());
            return;
        }
        self.forget_token();
        self.require_login(resume);
        self.state.toasts.error("Session expired, please sign in again");
    }

    pub fn on_error(&mut self, message: String) {
        if self.state.active_tab == MenuItem::Login {
            self.state.login.submitting = false;
            self.state.login.error = Some(message.clone());
        }
        self.state.toasts.error(message);
    }

    pub fn on_toast_expired(&mut self, id: u64) -> bool {
        self.state.toasts.remove(id)
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub fn submit_login(&mut self) -> Option<NetworkRequest> {
        let login = &mut self.state.login;
        if login.submitting {
            return None;
        }
        login.error = None;
        login.submitting = true;
        Some(NetworkRequest::Login { username: login.username.trim().to_string(), password: login.password.clone() })
    }

    pub fn logout(&mut self) -> Vec<NetworkRequest> {
        self.forget_token();
        self.require_login(self.state.active_tab);
        self.state.toasts.info("Signed out");
        vec![NetworkRequest::SetToken(None)]
    }

    fn forget_token(&mut self) {
        self.state.token = None;
        if let Err(e) = self.tokens.clear() {
            error!("could not remove session token: {e}");
        }
    }

    fn require_login(&mut self, resume_tab: MenuItem) {
        self.state.login = Default::default();
        self.state.login.resume_tab = match resume_tab {
            MenuItem::Login | MenuItem::Help => MenuItem::Bracket,
            tab => tab,
        };
        self.state.active_tab = MenuItem::Login;
    }

    // -----------------------------------------------------------------------
    // Bracket interaction
    // -----------------------------------------------------------------------

    /// Measure card positions from the frame that was just committed. Returns
    /// true when connectors need another draw to match.
    pub fn after_draw(&mut self) -> bool {
        if self.state.active_tab != MenuItem::Bracket {
            return false;
        }
        let layout = &mut self.state.bracket.viewport.layout;
        layout.is_stale() && layout.remeasure()
    }

    pub fn on_mouse(&mut self, column: u16, row: u16, clicked: bool) -> bool {
        if self.state.active_tab != MenuItem::Bracket {
            return false;
        }
        let bracket = &mut self.state.bracket;
        let hit = bracket.viewport.layout.cards.card_at(column, row).map(|c| c.game_id);
        let mut changed = bracket.set_hover(hit);
        if clicked && let Some(id) = hit {
            changed |= bracket.select(id);
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Stats / teams helpers that produce requests
    // -----------------------------------------------------------------------

    pub fn stats_move(&mut self, delta: isize) -> Vec<NetworkRequest> {
        let mut requests = Vec::new();
        if let Some(key) = self.state.stats.move_selection(delta) {
            requests.push(NetworkRequest::LoadStatSummary { key, slot: SummarySlot::Primary });
            if let Some(other) = self.state.stats.comparison_key() {
                requests.push(NetworkRequest::LoadStatSummary {
                    key: other.to_string(),
                    slot: SummarySlot::Comparison,
                });
            }
        }
        requests
    }

    pub fn stats_cycle_comparison(&mut self) -> Vec<NetworkRequest> {
        self.state
            .stats
            .cycle_comparison()
            .map(|key| NetworkRequest::LoadStatSummary { key, slot: SummarySlot::Comparison })
            .into_iter()
            .collect()
    }

    pub fn open_selected_team(&mut self) -> Option<NetworkRequest> {
        let team_id = self.state.teams.selected_team()?.id;
        self.state.teams.page = None;
        Some(NetworkRequest::LoadTeamPage { team_id, year: season_for(Local::now().date_naive()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_without_token() -> App {
        let dir = std::env::temp_dir().join(format!("courtside-app-{}", std::process::id()));
        let mut app = App::new(AppSettings::default(), TokenStore::new(dir.join("token")), Toasts::default());
        app.state.token = None;
        app.state.active_tab = MenuItem::Login;
        app
    }

    #[test]
    fn nothing_is_requested_before_login() {
        let app = app_without_token();
        assert!(app.startup_requests().is_empty());
        assert!(app.requests_for_tab(MenuItem::Teams, true).is_empty());
    }

    #[test]
    fn login_resumes_pending_tab_and_loads_it() {
        let mut app = app_without_token();
        app.state.login.resume_tab = MenuItem::Stats;
        app.state.login.username = "coach".into();
        app.state.login.password = "pw".into();

        assert!(matches!(app.submit_login(), Some(NetworkRequest::Login { .. })));
        assert!(app.submit_login().is_none());

        let requests = app.on_logged_in("header.payload.sig".into());
        assert_eq!(app.state.active_tab, MenuItem::Stats);
        assert!(matches!(requests.as_slice(), [NetworkRequest::LoadStats]));
        assert!(!app.state.toasts.is_empty());
        let _ = app.tokens.clear();
    }

    #[test]
    fn unauthorized_returns_to_login() {
        let mut app = app_without_token();
        app.state.token = Some("old".into());
        app.state.active_tab = MenuItem::Games;

        app.on_unauthorized("Unauthorized: /games".into());
        assert_eq!(app.state.active_tab, MenuItem::Login);
        assert_eq!(app.state.login.resume_tab, MenuItem::Games);
        assert!(app.state.token.is_none());
    }

    #[test]
    fn failed_login_stays_on_login_screen() {
        let mut app = app_without_token();
        app.state.login.username = "coach".into();
        app.submit_login();
        app.on_unauthorized("Unauthorized: /authenticate".into());
        assert_eq!(app.state.active_tab, MenuItem::Login);
        assert!(!app.state.login.submitting);
        assert!(app.state.login.error.is_some());
    }

    #[test]
    fn tabs_only_fetch_missing_data() {
        let mut app = app_without_token();
        app.state.token = Some("t".into());
        app.state.active_tab = MenuItem::Bracket;

        assert!(matches!(app.update_tab(MenuItem::Teams).as_slice(), [NetworkRequest::LoadTeams]));
        app.state.teams.load(vec![Default::default()]);
        app.update_tab(MenuItem::Bracket);
        assert!(app.update_tab(MenuItem::Teams).is_empty());
        assert!(matches!(app.refresh_requests().as_slice(), []));
    }
}
