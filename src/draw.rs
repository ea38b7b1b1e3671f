use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::bracket::connector::Direction;
use crate::components::bracket::BracketView;
use crate::components::theme::{ThemeColor, resolve, toast_color};
use crate::state::app_state::{ADMIN_ACTIONS, LoginField};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::stats::correlation::Correlation;
use crate::ui::layout::LayoutAreas;
use courtside_api::{GameDetail, StatSummary, SummaryStub, TeamGame};
use log::error;

const HELP_LINES: &[&str] = &[
    "Global",
    "  1-6       switch tab            ?         this help (Esc to leave)",
    "  r         reload current tab    L         sign out",
    "  f         toggle full screen    \"         toggle log pane",
    "  q         quit                  Ctrl-C    quit from anywhere",
    "",
    "Bracket",
    "  h/l       previous/next date    j/k       previous/next game",
    "  m         mirror direction      mouse     hover or click a game",
    "",
    "Games",
    "  h/l       previous/next day     t         today     j/k  move",
    "",
    "Teams / Conferences",
    "  /         search                c         cycle conference filter",
    "  Enter     open team page        Esc       clear search and filters",
    "",
    "Stats",
    "  j/k       select stat           c         cycle comparison stat",
    "  J/K       scroll rankings",
    "",
    "Admin",
    "  j/k       select action         +/-       change season",
    "  e         edit model name       Enter     run selected action",
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Games => draw_games(f, layout.main, app),
            MenuItem::Teams => draw_teams(f, layout.main, app),
            MenuItem::Conferences => draw_conferences(f, layout.main, app),
            MenuItem::Stats => draw_stats(f, layout.main, app),
            MenuItem::Admin => draw_admin(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
            MenuItem::Login => draw_login(f, layout.main, app),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_toasts(f, f.area(), app);
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = MenuItem::TABS
        .iter()
        .position(|t| *t == app.state.active_tab)
        .unwrap_or(0);

    let titles: Vec<Line> = MenuItem::TABS
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bracket = &mut app.state.bracket;
    let Some(data) = bracket.data.as_ref() else {
        draw_message(f, inner, "Loading bracket data...");
        return;
    };
    if data.roots.is_empty() {
        draw_message(f, inner, "No tournament games have been scheduled yet");
        return;
    }

    let [header, key_legend, content, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let info = data.tournament.as_ref();
    let name = info.and_then(|t| t.name.as_deref()).unwrap_or("Tournament");
    let mut header_text = name.to_string();
    if let Some(year) = info.and_then(|t| t.year) {
        header_text.push_str(&format!(" {year}"));
    }
    if let Some(round) = info.and_then(|t| t.current_round.as_deref()) {
        header_text.push_str(&format!(" | {round}"));
    }
    header_text.push_str(&format!(" | {} games", data.game_count()));
    f.render_widget(Paragraph::new(header_text).style(resolve(ThemeColor::Accent)), header);

    let direction = match bracket.direction {
        Direction::LeftToRight => "→",
        Direction::RightToLeft => "←",
    };
    f.render_widget(
        Paragraph::new(format!("Keys: h/l=date  j/k=game  m=mirror ({direction})  click=select  r=reload"))
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let view = BracketView {
        data,
        selected: (bracket.selected_column, bracket.selected_game),
        highlight: &bracket.highlight,
        hover: bracket.hover,
        direction: bracket.direction,
    };
    f.render_stateful_widget(view, content, &mut bracket.viewport);

    let selected = bracket.selected_node();
    if let Some(node) = selected {
        let game = &node.game;
        let score = match (game.home_score, game.away_score) {
            (Some(h), Some(a)) => format!("{h}-{a}"),
            _ => "vs".to_string(),
        };
        let text = format!(
            "{} {} {}  |  {}  |  path: {} game(s) to the final",
            game.home_name(),
            score,
            game.away_name(),
            game.date,
            bracket.highlight.len().saturating_sub(1),
        );
        f.render_widget(Paragraph::new(text).style(resolve(ThemeColor::Path)), footer);
    }
}

// ---------------------------------------------------------------------------
// Games by date
// ---------------------------------------------------------------------------

fn draw_games(f: &mut Frame, area: Rect, app: &App) {
    let games = &app.state.games;
    let title = format!(" Games · {} ", games.date.format("%a %b %-d, %Y"));
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(data) = games.data.as_ref() else {
        draw_message(f, inner, "Loading games...");
        return;
    };
    if data.games.is_empty() {
        draw_message(f, inner, "No games on this day. h/l to change day, t for today");
        return;
    }

    let mut lines = Vec::with_capacity(data.games.len() + 2);
    lines.push(Line::from(Span::styled(
        format!("Season {}  |  {} games  |  h/l=day  t=today  j/k=move", data.season, data.games.len()),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    let visible = usize::from(inner.height.saturating_sub(2));
    let start = games.selected.saturating_sub(visible.saturating_sub(1));
    for (idx, game) in data.games.iter().enumerate().skip(start).take(visible) {
        let selected = idx == games.selected;
        let style = if selected {
            resolve(ThemeColor::Selected)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if selected { ">" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} {}", format_matchup(game)), style),
            Span::styled(format!("  {}", format_odds(game)), Style::default().fg(Color::DarkGray)),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn format_matchup(game: &GameDetail) -> String {
    let seeded = |seed: Option<u8>, name: &str| match seed {
        Some(s) => format!("({s}) {name}"),
        None => name.to_string(),
    };
    let away = seeded(game.away_team_seed, &game.away_team.name);
    let home = seeded(game.home_team_seed, &game.home_team.name);
    let at = if game.is_neutral { "vs" } else { "@" };
    match (game.away_score, game.home_score) {
        (Some(a), Some(h)) => format!("{away} {a} {at} {home} {h}  FINAL"),
        _ => format!("{away} {at} {home}"),
    }
}

fn format_odds(game: &GameDetail) -> String {
    let mut parts = Vec::new();
    if let Some(conf) = &game.conference_game {
        parts.push(conf.short_name.clone());
    }
    if let Some(spread) = &game.spread {
        parts.push(spread.clone());
    }
    if let Some(ou) = game.over_under {
        parts.push(format!("O/U {ou}"));
    }
    if let (Some(away), Some(home)) = (game.away_money_line, game.home_money_line) {
        parts.push(format!("ML {away:+}/{home:+}"));
    }
    parts.join("  ")
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let [list_area, page_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let teams = &app.state.teams;
    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    if teams.teams.is_empty() {
        draw_message(f, inner, "Loading teams...");
    } else {
        let [search_area, filter_area, rows_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
        f.render_widget(search_line(&teams.search.value, teams.search.active), search_area);
        let filter = teams.conference_filter.as_deref().unwrap_or("All conferences");
        f.render_widget(
            Paragraph::new(format!("c: {filter}")).style(Style::default().fg(Color::DarkGray)),
            filter_area,
        );

        let filtered = teams.filtered();
        let visible = usize::from(rows_area.height);
        let start = teams.selected.saturating_sub(visible.saturating_sub(1));
        let lines: Vec<Line> = filtered
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
            .map(|(idx, team)| {
                let style = if idx == teams.selected {
                    resolve(ThemeColor::Selected)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let conf = team.conference.as_deref().unwrap_or("-");
                Line::from(Span::styled(format!("{:<24} {:>6}  {conf}", truncate(&team.name, 24), team.record.to_string()), style))
            })
            .collect();
        if lines.is_empty() {
            draw_message(f, rows_area, "No teams match");
        } else {
            f.render_widget(Paragraph::new(lines), rows_area);
        }
    }

    draw_team_page(f, page_area, app);
}

fn draw_team_page(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = app.state.teams.page.as_ref() else {
        draw_placeholder(f, area, "Enter on a team to open its season page");
        return;
    };

    let title = format!(" {} {} · {} ", page.team.name, page.team.nickname, page.season);
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Overall ", Style::default().fg(Color::DarkGray)),
            Span::raw(page.records.overall.to_string()),
            Span::styled("   Conference ", Style::default().fg(Color::DarkGray)),
            Span::raw(page.records.conference.to_string()),
            Span::styled(format!("   {}", page.conference.name), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];

    if !page.conference.standings.is_empty() {
        lines.push(Line::from(Span::styled("Standings", resolve(ThemeColor::Accent))));
        for standing in &page.conference.standings {
            let style = if standing.team.id == page.team.id {
                resolve(ThemeColor::Path)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "  {:<22} {:>6} {:>6}",
                    truncate(&standing.team.name, 22),
                    standing.conference_record.to_string(),
                    standing.overall_record.to_string()
                ),
                style,
            )));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Schedule", resolve(ThemeColor::Accent))));
    for game in &page.games {
        lines.push(team_game_line(game));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn team_game_line(game: &TeamGame) -> Line<'static> {
    let result_style = match game.w_or_l.as_str() {
        "W" => resolve(ThemeColor::Winner),
        "L" => resolve(ThemeColor::Error),
        _ => Style::default().fg(Color::Gray),
    };
    let mut spans = vec![
        Span::styled(format!("  {:<11}", truncate(&game.date, 10)), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{:<3}{:<22}", game.at_vs, truncate(&game.opponent.name, 21))),
        Span::styled(format!("{:<2}", game.w_or_l), result_style),
        Span::raw(format!("{:>3}-{:<3}", game.score, game.opp_score)),
    ];
    if let Some(desc) = &game.spread_description {
        let covered = match game.spread_covered {
            Some(true) => " ✓",
            Some(false) => " ✗",
            None => "",
        };
        spans.push(Span::styled(format!(" {desc}{covered}"), Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Conferences
// ---------------------------------------------------------------------------

fn draw_conferences(f: &mut Frame, area: Rect, app: &App) {
    let conferences = &app.state.conferences;
    let block = default_border(Color::White).title(" Conferences ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if conferences.groups.is_empty() {
        draw_message(f, inner, "Loading conferences...");
        return;
    }

    let [search_area, rows_area] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    f.render_widget(search_line(&conferences.search.value, conferences.search.active), search_area);

    let mut lines = Vec::new();
    for (group, teams) in conferences.filtered() {
        lines.push(Line::from(Span::styled(group.name.clone(), resolve(ThemeColor::Accent))));
        for team in teams {
            lines.push(Line::from(format!(
                "  {:<28} {:>6}  conf {:>6}",
                truncate(&team.name, 28),
                team.overall_record.to_string(),
                team.conference_record.to_string()
            )));
        }
        lines.push(Line::from(""));
    }
    if lines.is_empty() {
        draw_message(f, rows_area, "No conferences match");
        return;
    }
    f.render_widget(Paragraph::new(lines).scroll((conferences.scroll_offset, 0)), rows_area);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
    let stats = &app.state.stats;
    let [keys_area, detail_area] =
        Layout::horizontal([Constraint::Length(32), Constraint::Fill(1)]).areas(area);

    let block = default_border(Color::White).title(" Stats ");
    let inner = block.inner(keys_area);
    f.render_widget(block, keys_area);
    if stats.keys.is_empty() {
        draw_message(f, inner, "Loading stats...");
    } else {
        let visible = usize::from(inner.height);
        let start = stats.selected.saturating_sub(visible.saturating_sub(1));
        let lines: Vec<Line> = stats
            .keys
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
            .map(|(idx, key)| {
                let (marker, style) = if idx == stats.selected {
                    (">", resolve(ThemeColor::Selected))
                } else if Some(idx) == stats.comparison {
                    ("≈", resolve(ThemeColor::Secondary))
                } else {
                    (" ", Style::default().fg(Color::Gray))
                };
                Line::from(Span::styled(format!("{marker} {key}"), style))
            })
            .collect();
        f.render_widget(Paragraph::new(lines), inner);
    }

    let comparison_height = if stats.comparison.is_some() { 8 } else { 0 };
    let [summary_area, comparison_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(comparison_height)]).areas(detail_area);

    match stats.summary.as_ref() {
        Some(summary) => draw_stat_summary(f, summary_area, summary, stats.scroll_offset),
        None if stats.keys.is_empty() => draw_placeholder(f, summary_area, ""),
        None => draw_placeholder(f, summary_area, "Loading summary..."),
    }

    if stats.comparison.is_some() {
        draw_comparison(f, comparison_area, app);
    }
}

fn draw_stat_summary(f: &mut Frame, area: Rect, summary: &StatSummary, scroll: u16) {
    let title = format!(" {} · {} ", summary.name, summary.season_year);
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let direction = if summary.is_higher_better { "higher is better" } else { "lower is better" };
    let mut lines = vec![
        Line::from(Span::styled(summary.description.clone(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("as of {}  |  {direction}", summary.as_of),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    if let Some(stub) = &summary.as_of_summary {
        lines.extend(stub_lines(summary, stub));
        lines.push(Line::from(""));
    }

    let history = summary.stubs_by_date();
    if history.len() > 1
        && let (Some(first), Some(last)) = (history.first(), history.last())
    {
        lines.push(Line::from(vec![
            Span::styled("Median trend ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{} ({}) → {} ({}) over {} snapshots",
                summary.format_value(first.med),
                first.date,
                summary.format_value(last.med),
                last.date,
                history.len()
            )),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Rank  Team                      Value", resolve(ThemeColor::Accent))));
    let header_rows = lines.len();
    let mut ranked = Vec::with_capacity(summary.statistics.len());
    for entry in &summary.statistics {
        let tie = if entry.rank_tie_best != entry.rank { "T" } else { " " };
        ranked.push(Line::from(format!(
            "{tie}{:<4} {:<25} {:>8}",
            entry.rank_tie_best,
            truncate(&entry.team.name, 25),
            summary.format_value(entry.statistic_value)
        )));
    }
    let [top, bottom] = Layout::vertical([
        Constraint::Length(header_rows as u16),
        Constraint::Fill(1),
    ])
    .areas(inner);
    f.render_widget(Paragraph::new(lines), top);
    f.render_widget(Paragraph::new(ranked).scroll((scroll, 0)), bottom);
}

fn stub_lines(summary: &StatSummary, stub: &SummaryStub) -> Vec<Line<'static>> {
    let v = |x: f64| summary.format_value(x);
    let label = Style::default().fg(Color::DarkGray);
    vec![
        Line::from(vec![
            Span::styled("n ", label),
            Span::raw(format!("{:<6}", stub.n)),
            Span::styled("min ", label),
            Span::raw(format!("{:<9}", v(stub.min))),
            Span::styled("q1 ", label),
            Span::raw(format!("{:<9}", v(stub.q1))),
            Span::styled("med ", label),
            Span::raw(format!("{:<9}", v(stub.med))),
            Span::styled("q3 ", label),
            Span::raw(format!("{:<9}", v(stub.q3))),
            Span::styled("max ", label),
            Span::raw(v(stub.max)),
        ]),
        Line::from(vec![
            Span::styled("mean ", label),
            Span::raw(format!("{:<9}", v(stub.mean))),
            Span::styled("sd ", label),
            Span::raw(format!("{:<9}", v(stub.std_dev))),
            Span::styled("p95 ", label),
            Span::raw(format!("{:<9}", v(stub.percentile95))),
            Span::styled("p99 ", label),
            Span::raw(format!("{:<9}", v(stub.percentile99))),
            Span::styled("skew ", label),
            Span::raw(format!("{:<7.3}", stub.skewness)),
            Span::styled("kurt ", label),
            Span::raw(format!("{:.3}", stub.kurtosis)),
        ]),
    ]
}

fn draw_comparison(f: &mut Frame, area: Rect, app: &App) {
    let stats = &app.state.stats;
    let other = stats.comparison_key().unwrap_or("-");
    let block = default_border(Color::Rgb(255, 103, 31)).title(format!(" Compared with {other} "));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(c) = stats.correlation else {
        draw_message(f, inner, "Loading comparison...");
        return;
    };
    if c.teams < 2 {
        draw_message(f, inner, "Not enough shared teams to compare");
        return;
    }

    let row = |name: &str, value: f64| {
        Line::from(vec![
            Span::styled(format!("{name:<16}"), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{value:>7.3}  "), correlation_style(value)),
            Span::raw(Correlation::strength(value)),
        ])
    };
    let lines = vec![
        Line::from(Span::styled(format!("{} shared teams", c.teams), Style::default().fg(Color::Gray))),
        row("Pearson", c.pearson),
        row("Spearman", c.spearman),
        row("Rank Spearman", c.rank_spearman),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn correlation_style(value: f64) -> Style {
    if value >= 0.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

fn draw_admin(f: &mut Frame, area: Rect, app: &App) {
    let admin = &app.state.admin;
    let [actions_area, status_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let block = default_border(Color::White).title(" Admin ");
    let inner = block.inner(actions_area);
    f.render_widget(block, actions_area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Season ", Style::default().fg(Color::DarkGray)),
            Span::styled(admin.season.to_string(), resolve(ThemeColor::Accent)),
            Span::styled("  (+/-)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled("Model  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                if admin.model.active { format!("{}_", admin.model.value) } else { admin.model.value.clone() },
                if admin.model.active { Style::default().fg(Color::Yellow) } else { Style::default() },
            ),
            Span::styled("  (e to edit)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];
    for (idx, action) in ADMIN_ACTIONS.iter().enumerate() {
        let (marker, style) = if idx == admin.selected {
            (">", resolve(ThemeColor::Selected))
        } else {
            (" ", Style::default().fg(Color::Gray))
        };
        lines.push(Line::from(Span::styled(format!("{marker} {}", admin.label(*action)), style)));
    }
    if let Some(message) = &admin.last_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(message.clone(), resolve(ThemeColor::Winner))));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    let block = default_border(Color::White).title(" Schedule status ");
    let inner = block.inner(status_area);
    f.render_widget(block, status_area);
    let Some(status) = admin.status.as_ref() else {
        draw_message(f, inner, "Loading status...");
        return;
    };

    let [totals, table_area] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new(format!("{} teams  |  {} conferences", status.teams, status.conferences)),
        totals,
    );
    let header = Row::new(["Season", "Teams", "Confs", "Games", "Updated"])
        .style(resolve(ThemeColor::Accent));
    let rows = status.seasons.iter().map(|s| {
        let style = if s.year == admin.season { resolve(ThemeColor::Path) } else { Style::default() };
        Row::new(vec![
            Cell::from(s.year.to_string()),
            Cell::from(s.teams.to_string()),
            Cell::from(s.conferences.to_string()),
            Cell::from(s.games.to_string()),
            Cell::from(s.last_updated.clone().unwrap_or_else(|| "-".into())),
        ])
        .style(style)
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Fill(1),
        ],
    )
    .header(header);
    f.render_widget(table, table_area);
}

// ---------------------------------------------------------------------------
// Login, help and overlays
// ---------------------------------------------------------------------------

fn draw_login(f: &mut Frame, area: Rect, app: &App) {
    let login = &app.state.login;
    let [_, middle, _] = Layout::vertical([Constraint::Fill(1), Constraint::Length(9), Constraint::Fill(1)]).areas(area);
    let [_, form, _] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(50), Constraint::Fill(1)]).areas(middle);

    let block = default_border(Color::White).title(" Sign in ");
    let inner = block.inner(form);
    f.render_widget(Clear, form);
    f.render_widget(block, form);

    let field = |label: &str, value: String, focused: bool| {
        let style = if focused { Style::default().fg(Color::Yellow) } else { Style::default().fg(Color::Gray) };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<10}"), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };
    let mut lines = vec![
        Line::from(""),
        field("Username", login.username.clone(), login.focus == LoginField::Username),
        field("Password", "*".repeat(login.password.chars().count()), login.focus == LoginField::Password),
        Line::from(""),
    ];
    if login.submitting {
        lines.push(Line::from(Span::styled("Signing in...", Style::default().fg(Color::Gray))));
    } else if let Some(err) = &login.error {
        lines.push(Line::from(Span::styled(err.clone(), resolve(ThemeColor::Error))));
    } else {
        lines.push(Line::from(Span::styled(
            "Tab=switch field  Enter=sign in  Ctrl-C=quit",
            Style::default().fg(Color::DarkGray),
        )));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|l| {
            if l.starts_with(' ') || l.is_empty() {
                Line::from(*l)
            } else {
                Line::from(Span::styled(*l, resolve(ThemeColor::Accent)))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_toasts(f: &mut Frame, area: Rect, app: &App) {
    let width = area.width.min(48);
    let mut y = area.y + 1;
    for toast in app.state.toasts.visible() {
        if y + 3 > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, 3);
        let color = toast_color(toast.kind);
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(truncate(&toast.message, usize::from(width.saturating_sub(4))))
                .style(Style::default().fg(color))
                .block(default_border(color)),
            rect,
        );
        y += 3;
    }
}

fn search_line(value: &str, active: bool) -> Paragraph<'static> {
    let (text, style) = if active {
        (format!("/ {value}_"), Style::default().fg(Color::Yellow))
    } else if value.is_empty() {
        ("/ to search".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (format!("/ {value}"), Style::default().fg(Color::Gray))
    };
    Paragraph::new(text).style(style)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn draw_message(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    draw_message(f, inner, msg);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use crate::state::auth::TokenStore;
    use crate::state::toasts::Toasts;
    use courtside_api::{Game, GameNode, TournamentData};
    use tui::backend::TestBackend;

    fn app() -> App {
        let store = TokenStore::new(std::env::temp_dir().join("courtside-draw-test").join("token"));
        let mut app = App::new(AppSettings::default(), store, Toasts::default());
        app.state.token = Some("t".into());
        app.state.active_tab = MenuItem::Bracket;
        app
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn bracket_tab_draws_and_measures() {
        let mut app = app();
        let g1 = GameNode::leaf(Game { id: 1, date: "2024-03-21".into(), ..Default::default() });
        let g2 = GameNode::leaf(Game { id: 2, date: "2024-03-21".into(), ..Default::default() });
        let root = GameNode::with_sources(Game { id: 3, date: "2024-03-23".into(), ..Default::default() }, Some(g1), Some(g2));
        app.on_tournament_loaded(TournamentData { roots: vec![root], tournament: None });

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        draw(&mut terminal, &mut app, LoadingState::default());

        assert_eq!(app.state.bracket.viewport.layout.cards.len(), 3);
        assert!(app.after_draw());
        draw(&mut terminal, &mut app, LoadingState::default());
        assert!(!app.after_draw());
        assert!(screen_text(&terminal).contains("Bracket"));
    }

    #[test]
    fn login_screen_masks_password() {
        let mut app = app();
        app.state.active_tab = MenuItem::Login;
        app.state.login.username = "coach".into();
        app.state.login.password = "secret".into();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        draw(&mut terminal, &mut app, LoadingState::default());
        let text = screen_text(&terminal);
        assert!(text.contains("coach"));
        assert!(text.contains("******"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Duke", 10), "Duke");
        assert_eq!(truncate("Jacksonville State", 8), "Jackson…");
    }
}
