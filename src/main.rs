mod app;
mod bracket;
mod components;
mod draw;
mod keys;
mod state;
mod stats;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::auth::TokenStore;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crate::state::toasts::Toasts;
use courtside_api::client::StatsApi;
use crossterm::event::{self as crossterm_event, Event, MouseButton, MouseEventKind};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let settings = AppSettings::load();
    info!("using API at {}", settings.api_url);
    let client = StatsApi::with_base_url(settings.api_url.clone());

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    let app = Arc::new(Mutex::new(App::new(
        settings,
        TokenStore::default_location(),
        Toasts::with_expiry(ui_event_tx.clone()),
    )));

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Live views reload every minute
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("courtside {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "courtside - college basketball stats dashboard

Usage:
  courtside
  courtside --help
  courtside --version

Environment:
  COURTSIDE_API_URL   Base URL of the stats backend (default http://localhost:3000/api)
  COURTSIDE_TOKEN     Session token to use instead of signing in
  COURTSIDE_LOG       Log level for the log pane (error, warn, info, debug, trace)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw {
                    redraw(&mut terminal, &app, loading).await;
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    redraw(&mut terminal, &app, loading).await;
                }
            }
        }
    }
}

/// Draw, then draw once more if the bracket's measured card positions moved,
/// so connectors always match the frame on screen.
async fn redraw(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &Arc<Mutex<App>>, loading: LoadingState) {
    let mut app_guard = app.lock().await;
    draw::draw(terminal, &mut app_guard, loading);
    if app_guard.after_draw() {
        draw::draw(terminal, &mut app_guard, loading);
        app_guard.after_draw();
    }
}

async fn send_all(network_requests: &mpsc::Sender<NetworkRequest>, requests: Vec<NetworkRequest>) {
    for request in requests {
        if let Err(e) = network_requests.send(request).await {
            error!("network worker is gone: {e}");
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            send_all(network_requests, requests).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Mouse { column, row, clicked } => app.lock().await.on_mouse(column, row, clicked),
        UiEvent::Resize => {
            app.lock().await.state.bracket.viewport.layout.mark_stale();
            true
        }
        UiEvent::RefreshTick => {
            let requests = app.lock().await.refresh_requests();
            send_all(network_requests, requests).await;
            false
        }
        UiEvent::ToastExpired(id) => app.lock().await.on_toast_expired(id),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    let mut guard = app.lock().await;
    let follow_up = match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::TournamentLoaded { data } => {
            guard.on_tournament_loaded(data);
            Vec::new()
        }
        NetworkResponse::GamesLoaded { date, games } => {
            guard.on_games_loaded(date, games);
            Vec::new()
        }
        NetworkResponse::TeamsLoaded { teams } => {
            guard.on_teams_loaded(teams);
            Vec::new()
        }
        NetworkResponse::ConferencesLoaded { conferences } => {
            guard.on_conferences_loaded(conferences);
            Vec::new()
        }
        NetworkResponse::TeamPageLoaded { page } => {
            guard.on_team_page_loaded(page);
            Vec::new()
        }
        NetworkResponse::StatsLoaded { keys } => guard.on_stats_loaded(keys),
        NetworkResponse::StatSummaryLoaded { slot, summary } => {
            guard.on_stat_summary_loaded(slot, summary);
            Vec::new()
        }
        NetworkResponse::ScheduleStatusLoaded { status } => {
            guard.on_schedule_status_loaded(status);
            Vec::new()
        }
        NetworkResponse::LoggedIn { token } => guard.on_logged_in(token),
        NetworkResponse::AdminCompleted { message } => guard.on_admin_completed(message),
        NetworkResponse::Unauthorized { message } => {
            guard.on_unauthorized(message);
            Vec::new()
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            guard.on_error(message);
            Vec::new()
        }
    };
    drop(guard);
    send_all(network_requests, follow_up).await;
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Moved => {
                        Some(UiEvent::Mouse { column: mouse.column, row: mouse.row, clicked: false })
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        Some(UiEvent::Mouse { column: mouse.column, row: mouse.row, clicked: true })
                    }
                    _ => None,
                },
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::Hide);
    let _ = execute!(stdout, terminal::EnterAlternateScreen);
    let _ = execute!(stdout, crossterm_event::EnableMouseCapture);
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    if let Err(e) = terminal::enable_raw_mode() {
        eprintln!("could not enable raw mode: {e}");
    }
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, crossterm_event::DisableMouseCapture);
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
