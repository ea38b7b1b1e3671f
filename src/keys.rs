use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    let requests = if guard.state.active_tab == MenuItem::Login {
        handle_login_keys(key_event, &mut guard)
    } else if text_input_active(&guard) {
        handle_text_input(key_event, &mut guard);
        Vec::new()
    } else {
        handle_view_keys(key_event, &mut guard)
    };

    drop(guard);
    for request in requests {
        let _ = network_requests.send(request).await;
    }
}

fn text_input_active(app: &App) -> bool {
    match app.state.active_tab {
        MenuItem::Teams => app.state.teams.search.active,
        MenuItem::Conferences => app.state.conferences.search.active,
        MenuItem::Admin => app.state.admin.model.active,
        _ => false,
    }
}

fn handle_login_keys(key_event: KeyEvent, app: &mut App) -> Vec<NetworkRequest> {
    let login = &mut app.state.login;
    match key_event.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => login.toggle_focus(),
        KeyCode::Backspace => login.backspace(),
        KeyCode::Esc => login.error = None,
        KeyCode::Enter => return app.submit_login().into_iter().collect(),
        Char(c) => login.push(c),
        _ => {}
    }
    Vec::new()
}

fn handle_text_input(key_event: KeyEvent, app: &mut App) {
    let state = &mut app.state;
    let input = match state.active_tab {
        MenuItem::Teams => &mut state.teams.search,
        MenuItem::Conferences => &mut state.conferences.search,
        _ => &mut state.admin.model,
    };
    match key_event.code {
        KeyCode::Esc if state.active_tab != MenuItem::Admin => input.clear(),
        KeyCode::Esc | KeyCode::Enter => input.active = false,
        KeyCode::Backspace => input.backspace(),
        Char(c) => input.push(c),
        _ => {}
    }
    match state.active_tab {
        MenuItem::Teams => state.teams.clamp_selection(),
        MenuItem::Conferences => state.conferences.scroll_offset = 0,
        _ => {}
    }
}

fn handle_view_keys(key_event: KeyEvent, app: &mut App) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();

    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => requests = app.update_tab(MenuItem::Bracket),
        (_, Char('2'), _) => requests = app.update_tab(MenuItem::Games),
        (_, Char('3'), _) => requests = app.update_tab(MenuItem::Teams),
        (_, Char('4'), _) => requests = app.update_tab(MenuItem::Conferences),
        (_, Char('5'), _) => requests = app.update_tab(MenuItem::Stats),
        (_, Char('6'), _) => requests = app.update_tab(MenuItem::Admin),
        (_, Char('?'), _) => {
            app.update_tab(MenuItem::Help);
        }
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Bracket
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => app.state.bracket.move_column(1),
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => app.state.bracket.move_column(-1),
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => app.state.bracket.move_game(1),
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => app.state.bracket.move_game(-1),
        (MenuItem::Bracket, Char('m'), _) => app.state.bracket.toggle_direction(),

        // Games
        (MenuItem::Games, Char('h') | KeyCode::Left, _) => {
            let date = app.state.games.shift(-1);
            requests.push(NetworkRequest::LoadGames { date });
        }
        (MenuItem::Games, Char('l') | KeyCode::Right, _) => {
            let date = app.state.games.shift(1);
            requests.push(NetworkRequest::LoadGames { date });
        }
        (MenuItem::Games, Char('t'), _) => {
            let date = app.state.games.today();
            requests.push(NetworkRequest::LoadGames { date });
        }
        (MenuItem::Games, Char('j') | KeyCode::Down, _) => app.state.games.move_selection(1),
        (MenuItem::Games, Char('k') | KeyCode::Up, _) => app.state.games.move_selection(-1),

        // Teams
        (MenuItem::Teams, Char('/'), _) => app.state.teams.search.active = true,
        (MenuItem::Teams, Char('c'), _) => app.state.teams.cycle_conference(),
        (MenuItem::Teams, Char('j') | KeyCode::Down, _) => app.state.teams.move_selection(1),
        (MenuItem::Teams, Char('k') | KeyCode::Up, _) => app.state.teams.move_selection(-1),
        (MenuItem::Teams, KeyCode::Enter, _) => requests.extend(app.open_selected_team()),
        (MenuItem::Teams, KeyCode::Esc, _) => {
            app.state.teams.page = None;
            app.state.teams.search.clear();
            app.state.teams.conference_filter = None;
        }

        // Conferences
        (MenuItem::Conferences, Char('/'), _) => app.state.conferences.search.active = true,
        (MenuItem::Conferences, Char('j') | KeyCode::Down, _) => {
            app.state.conferences.scroll_offset = app.state.conferences.scroll_offset.saturating_add(1);
        }
        (MenuItem::Conferences, Char('k') | KeyCode::Up, _) => {
            app.state.conferences.scroll_offset = app.state.conferences.scroll_offset.saturating_sub(1);
        }
        (MenuItem::Conferences, KeyCode::Esc, _) => app.state.conferences.search.clear(),

        // Stats
        (MenuItem::Stats, Char('j') | KeyCode::Down, _) => requests = app.stats_move(1),
        (MenuItem::Stats, Char('k') | KeyCode::Up, _) => requests = app.stats_move(-1),
        (MenuItem::Stats, Char('c'), _) => requests = app.stats_cycle_comparison(),
        (MenuItem::Stats, Char('J'), _) => {
            app.state.stats.scroll_offset = app.state.stats.scroll_offset.saturating_add(1);
        }
        (MenuItem::Stats, Char('K'), _) => {
            app.state.stats.scroll_offset = app.state.stats.scroll_offset.saturating_sub(1);
        }

        // Admin
        (MenuItem::Admin, Char('j') | KeyCode::Down, _) => app.state.admin.move_selection(1),
        (MenuItem::Admin, Char('k') | KeyCode::Up, _) => app.state.admin.move_selection(-1),
        (MenuItem::Admin, Char('+') | Char('='), _) => app.state.admin.adjust_season(1),
        (MenuItem::Admin, Char('-'), _) => app.state.admin.adjust_season(-1),
        (MenuItem::Admin, Char('e'), _) => app.state.admin.model.active = true,
        (MenuItem::Admin, KeyCode::Enter, _) => {
            if let Some(command) = app.state.admin.command() {
                requests.push(NetworkRequest::Admin(command));
            }
        }

        // Global
        (_, Char('r'), _) => requests = app.requests_for_tab(app.state.active_tab, true),
        (_, Char('L'), _) => requests = app.logout(),
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }

    requests
}
