use crate::bracket::connector::{CurveStyle, Direction, connector_curves};
use crate::bracket::layout::CardTag;
use crate::components::theme::{ThemeColor, curve_style, resolve};
use crate::state::app_state::BracketViewport;
use courtside_api::bracket::parse_date_key;
use courtside_api::{Game, GameColumn, GameStatus, Team, TournamentData};
use std::collections::HashSet;
use tui::buffer::Buffer;
use tui::layout::{Position, Rect};
use tui::style::{Color, Modifier, Style};
use tui::widgets::StatefulWidget;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per game card: home line, status line, away line.
pub const CARD_HEIGHT: u16 = 3;

/// Blank rows under each card in the busiest date column.
const CARD_SPACING: u16 = 1;

/// Columns between adjacent date columns. Connectors are drawn through here.
pub const COLUMN_GAP: u16 = 8;

const CARD_W_FULL: u16 = 24;
const CARD_W_MIN: u16 = 14;

/// Date labels plus the rule underneath them.
const HEADER_ROWS: u16 = 2;

// ---------------------------------------------------------------------------
// ColumnGrid: horizontal geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnGrid {
    pub card_width: u16,
    /// How many date columns fit side by side.
    pub visible: usize,
}

impl ColumnGrid {
    pub fn compute(width: u16) -> Self {
        let card_width = width.clamp(1, CARD_W_FULL);
        let stride = card_width + COLUMN_GAP;
        let visible = usize::from(width.saturating_add(COLUMN_GAP) / stride).max(1);
        Self { card_width, visible }
    }

    pub fn stride(&self) -> u16 {
        self.card_width + COLUMN_GAP
    }
}

/// Rows needed for the tallest column.
pub fn total_rows(columns: &[GameColumn<'_>]) -> u16 {
    let tallest = columns.iter().map(|c| c.games.len()).max().unwrap_or(0);
    tallest as u16 * (CARD_HEIGHT + CARD_SPACING)
}

/// Top row of the `index`th card in a column of `games` cards. Each card is
/// centered in an equal share of `total` rows, so a later round lands between
/// the games that feed it.
pub fn card_top(index: usize, games: usize, total: u16) -> u16 {
    let slot = total / games.max(1) as u16;
    index as u16 * slot + slot.saturating_sub(CARD_HEIGHT) / 2
}

/// First column of the visible window after making sure `selected` is in it.
pub fn keep_in_view(first: usize, selected: usize, visible: usize, columns: usize) -> usize {
    let first = first.min(columns.saturating_sub(visible));
    if selected < first {
        selected
    } else if selected >= first + visible {
        selected + 1 - visible
    } else {
        first
    }
}

fn scroll_into_view(scroll: u16, top: u16, viewport: u16, total: u16) -> u16 {
    let scroll = scroll.min(total.saturating_sub(viewport));
    if top < scroll {
        top
    } else if top + CARD_HEIGHT > scroll + viewport {
        (top + CARD_HEIGHT).saturating_sub(viewport)
    } else {
        scroll
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Plain,
    Hovered,
    Path,
    Selected,
}

/// Renders the tournament as one column per game date, earliest first in
/// reading direction, with curved connectors from each feeder to the game
/// it feeds.
///
/// Connectors are drawn from the positions measured after the previous
/// frame. Every render re-registers the cards it drew and marks the layout
/// stale; the caller remeasures once the frame is on screen and redraws if
/// anything moved.
pub struct BracketView<'a> {
    pub data: &'a TournamentData,
    /// (date column, game index) of the selected card.
    pub selected: (usize, usize),
    pub highlight: &'a [i64],
    pub hover: Option<i64>,
    pub direction: Direction,
}

impl StatefulWidget for BracketView<'_> {
    type State = BracketViewport;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.layout.cards.clear();
        state.layout.container = area;
        state.layout.mark_stale();

        let columns = self.data.collect_by_date();
        if columns.is_empty() || area.width < CARD_W_MIN || area.height < HEADER_ROWS + CARD_HEIGHT {
            return;
        }

        let grid = ColumnGrid::compute(area.width);
        let (selected_column, selected_game) = self.selected;
        state.first_column = keep_in_view(state.first_column, selected_column, grid.visible, columns.len());

        let total = total_rows(&columns);
        let body = Rect { y: area.y + HEADER_ROWS, height: area.height - HEADER_ROWS, ..area };
        if let Some(column) = columns.get(selected_column) {
            let top = card_top(selected_game, column.games.len(), total);
            state.scroll_offset = scroll_into_view(state.scroll_offset, top, body.height, total);
        }
        let scroll = state.scroll_offset;

        let end = (state.first_column + grid.visible).min(columns.len());
        let window = &columns[state.first_column..end];
        let on_path: HashSet<i64> = self.highlight.iter().copied().collect();

        draw_header_rule(buf, area, state.first_column > 0, end < columns.len(), self.direction);

        // Pass 1: cards
        for (offset, column) in window.iter().enumerate() {
            let slot = match self.direction {
                Direction::LeftToRight => offset,
                Direction::RightToLeft => window.len() - 1 - offset,
            };
            let x = area.x + slot as u16 * grid.stride();
            draw_column_label(buf, x, area.y, grid.card_width, column.date);

            let column_index = state.first_column + offset;
            for (index, node) in column.games.iter().enumerate() {
                let top = card_top(index, column.games.len(), total);
                let Some(card) = visible_card(body, x, top, scroll, grid.card_width) else {
                    continue;
                };
                let game = &node.game;
                let emphasis = if (column_index, index) == (selected_column, selected_game) {
                    Emphasis::Selected
                } else if on_path.contains(&game.id) {
                    Emphasis::Path
                } else if self.hover == Some(game.id) {
                    Emphasis::Hovered
                } else {
                    Emphasis::Plain
                };
                draw_card(buf, game, x, top, scroll, grid.card_width, emphasis, body);
                state.layout.cards.register(CardTag {
                    game_id: game.id,
                    area: card,
                    home_won: game.home_won().unwrap_or(false),
                });
            }
        }

        // Pass 2: connectors, highlighted ones last so they stay on top.
        let mut curves = connector_curves(
            self.data,
            &state.layout.positions,
            self.highlight,
            self.hover,
            self.direction,
        );
        curves.sort_by_key(|c| match c.style {
            CurveStyle::Default => 0,
            CurveStyle::Hovered => 1,
            CurveStyle::Highlighted => 2,
        });
        for curve in &curves {
            let style = curve_style(curve.style);
            for (dx, dy, glyph) in curve.cells() {
                let (Ok(x), Ok(y)) = (
                    u16::try_from(i32::from(area.x) + dx),
                    u16::try_from(i32::from(area.y) + dy),
                ) else {
                    continue;
                };
                if !body.contains(Position { x, y }) || state.layout.cards.covers(x, y) {
                    continue;
                }
                put_char(buf, x, y, glyph, style);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

/// Screen rect of the part of a card that survives vertical scrolling.
fn visible_card(body: Rect, x: u16, top: u16, scroll: u16, width: u16) -> Option<Rect> {
    let first = top.max(scroll);
    let last = (top + CARD_HEIGHT).min(scroll + body.height);
    if first >= last || x >= body.right() {
        return None;
    }
    Some(Rect {
        x,
        y: body.y + first - scroll,
        width: width.min(body.right() - x),
        height: last - first,
    })
}

/// Convert a bracket-relative row to an absolute screen y, applying scroll + area bounds.
/// Returns `None` if the row is off-screen.
fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

fn draw_column_label(buf: &mut Buffer, x: u16, y: u16, width: u16, date: &str) {
    let label = parse_date_key(date)
        .map(|d| d.format("%a %b %-d").to_string())
        .unwrap_or_else(|| date.to_string());
    let text: String = label.chars().take(usize::from(width)).collect();
    let pad = width.saturating_sub(text.chars().count() as u16) / 2;
    buf.set_string(x + pad, y, &text, resolve(ThemeColor::Accent));
}

fn draw_header_rule(buf: &mut Buffer, area: Rect, earlier_hidden: bool, later_hidden: bool, direction: Direction) {
    let y = area.y + 1;
    let dim = resolve(ThemeColor::Dim);
    for x in area.left()..area.right() {
        put_char(buf, x, y, '─', dim);
    }
    let (left, right) = match direction {
        Direction::LeftToRight => (earlier_hidden, later_hidden),
        Direction::RightToLeft => (later_hidden, earlier_hidden),
    };
    let accent = resolve(ThemeColor::Accent);
    if left {
        put_char(buf, area.left(), y, '◀', accent);
    }
    if right {
        put_char(buf, area.right() - 1, y, '▶', accent);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_card(
    buf: &mut Buffer,
    game: &Game,
    x: u16,
    top: u16,
    scroll: u16,
    width: u16,
    emphasis: Emphasis,
    body: Rect,
) {
    let avail = usize::from(width.min(body.right().saturating_sub(x)));
    let base_style = match emphasis {
        Emphasis::Selected => resolve(ThemeColor::Selected).add_modifier(Modifier::REVERSED),
        Emphasis::Path => resolve(ThemeColor::Path),
        Emphasis::Hovered => Style::default().fg(Color::Gray).add_modifier(Modifier::UNDERLINED),
        Emphasis::Plain => Style::default().fg(Color::Gray),
    };
    let home_won = game.home_won();

    for row in 0..CARD_HEIGHT {
        let Some(sy) = screen_y(top + row, scroll, body) else {
            continue;
        };
        let (content, won) = match row {
            0 => (
                format_team_line(game.home_team_seed, game.home_team.as_ref(), game.home_score, usize::from(width)),
                home_won == Some(true),
            ),
            2 => (
                format_team_line(game.away_team_seed, game.away_team.as_ref(), game.away_score, usize::from(width)),
                home_won == Some(false),
            ),
            _ => (format_status_line(game, usize::from(width)), false),
        };
        let style = match (row, won, emphasis) {
            (1, _, Emphasis::Plain | Emphasis::Hovered) => resolve(ThemeColor::Dim),
            (_, true, Emphasis::Selected) => base_style.fg(Color::Green),
            (_, true, _) => resolve(ThemeColor::Winner),
            _ => base_style,
        };
        let text: String = content.chars().take(avail).collect();
        buf.set_string(x, sy, &text, style);
    }
}

/// Format a team/seed line: `"[seed] [name       ] [score]"`
///
/// Total width = seed(2) + " " + name(width-8) + " " + score(3) + " " = width.
fn format_team_line(seed: Option<u8>, team: Option<&Team>, score: Option<u16>, width: usize) -> String {
    let seed = match seed {
        Some(s) if s > 0 => format!("{:2}", s),
        _ => "  ".to_string(),
    };
    let name = team.map(|t| t.name.as_str()).unwrap_or("TBD");
    let score_str = match score {
        Some(s) => format!("{:3}", s),
        None => "   ".to_string(),
    };
    let name_w = width.saturating_sub(8);
    let name_trunc: String = name.chars().take(name_w).collect();
    let padded_name = format!("{:<width$}", name_trunc, width = name_w);
    format!("{} {} {} ", seed, padded_name, score_str)
}

/// Format the center status row.
fn format_status_line(game: &Game, width: usize) -> String {
    let raw = match game.status() {
        GameStatus::Final => "   FINAL".to_string(),
        GameStatus::Scheduled => parse_date_key(&game.date)
            .map(|d| format!("   {}", d.format("%b %-d")))
            .unwrap_or_else(|| "   Scheduled".to_string()),
    };
    let padded = format!("{:<width$}", raw, width = width);
    padded.chars().take(width).collect()
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_api::GameNode;

    fn team(name: &str) -> Option<Team> {
        Some(Team { name: name.into(), ..Default::default() })
    }

    fn game(id: i64, date: &str, home: &str, away: &str) -> Game {
        Game {
            id,
            date: date.into(),
            home_team: team(home),
            away_team: team(away),
            home_team_seed: Some(1),
            away_team_seed: Some(16),
            ..Default::default()
        }
    }

    fn forest() -> TournamentData {
        let g1 = GameNode::leaf(Game { home_score: Some(80), away_score: Some(61), ..game(1, "2024-03-21", "Duke", "Vermont") });
        let g2 = GameNode::leaf(game(2, "2024-03-21", "Baylor", "Colgate"));
        TournamentData {
            roots: vec![GameNode::with_sources(game(3, "2024-03-23", "Duke", "TBD"), Some(g1), Some(g2))],
            tournament: None,
        }
    }

    fn render(data: &TournamentData, area: Rect, selected: (usize, usize), direction: Direction, viewport: &mut BracketViewport) -> Buffer {
        let mut buf = Buffer::empty(area);
        let view = BracketView { data, selected, highlight: &[], hover: None, direction };
        view.render(area, &mut buf, viewport);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn test_grid_fits_columns_to_width() {
        assert_eq!(ColumnGrid::compute(100), ColumnGrid { card_width: 24, visible: 3 });
        assert_eq!(ColumnGrid::compute(20), ColumnGrid { card_width: 20, visible: 1 });
        assert_eq!(ColumnGrid::compute(56), ColumnGrid { card_width: 24, visible: 2 });
    }

    #[test]
    fn test_later_rounds_sit_between_feeders() {
        let total = 4 * (CARD_HEIGHT + CARD_SPACING);
        let firsts: Vec<u16> = (0..4).map(|i| card_top(i, 4, total)).collect();
        assert_eq!(firsts, vec![0, 4, 8, 12]);
        let seconds: Vec<u16> = (0..2).map(|i| card_top(i, 2, total)).collect();
        assert_eq!(seconds, vec![2, 10]);
        assert_eq!(card_top(0, 1, total), 6);
    }

    #[test]
    fn test_keep_in_view() {
        assert_eq!(keep_in_view(0, 0, 3, 5), 0);
        assert_eq!(keep_in_view(0, 4, 3, 5), 2);
        assert_eq!(keep_in_view(3, 1, 3, 5), 1);
        assert_eq!(keep_in_view(4, 4, 3, 5), 2);
    }

    #[test]
    fn test_render_registers_every_card() {
        let data = forest();
        let mut viewport = BracketViewport::default();
        let buf = render(&data, Rect::new(0, 0, 100, 20), (0, 0), Direction::LeftToRight, &mut viewport);

        assert_eq!(viewport.layout.cards.len(), 3);
        assert!(viewport.layout.is_stale());
        assert!(row_text(&buf, 0).contains("Thu Mar 21"));
        assert!(row_text(&buf, HEADER_ROWS).contains("Duke"));

        let feeder = viewport.layout.cards.iter().find(|c| c.game_id == 1).unwrap();
        assert_eq!(feeder.area, Rect::new(0, HEADER_ROWS, 24, CARD_HEIGHT));
        assert!(feeder.home_won);
        let later = viewport.layout.cards.iter().find(|c| c.game_id == 3).unwrap();
        assert_eq!(later.area.x, 32);
    }

    #[test]
    fn test_connectors_follow_measured_positions() {
        let data = forest();
        let area = Rect::new(0, 0, 100, 20);
        let mut viewport = BracketViewport::default();
        let gap_is_blank = |buf: &Buffer| {
            (HEADER_ROWS..area.height).all(|y| (24..32).all(|x| buf[(x, y)].symbol() == " "))
        };

        let first = render(&data, area, (0, 0), Direction::LeftToRight, &mut viewport);
        assert!(gap_is_blank(&first));

        assert!(viewport.layout.remeasure());
        let second = render(&data, area, (0, 0), Direction::LeftToRight, &mut viewport);
        assert!(!gap_is_blank(&second));

        assert!(!viewport.layout.remeasure());
    }

    #[test]
    fn test_right_to_left_puts_earliest_date_on_the_right() {
        let data = forest();
        let mut viewport = BracketViewport::default();
        render(&data, Rect::new(0, 0, 100, 20), (0, 0), Direction::RightToLeft, &mut viewport);

        let feeder = viewport.layout.cards.iter().find(|c| c.game_id == 1).unwrap();
        let later = viewport.layout.cards.iter().find(|c| c.game_id == 3).unwrap();
        assert_eq!(feeder.area.x, 32);
        assert_eq!(later.area.x, 0);
    }

    #[test]
    fn test_narrow_view_scrolls_to_selection() {
        let data = forest();
        let mut viewport = BracketViewport::default();
        let buf = render(&data, Rect::new(0, 0, 30, 20), (1, 0), Direction::LeftToRight, &mut viewport);

        assert_eq!(viewport.first_column, 1);
        let ids: Vec<i64> = viewport.layout.cards.iter().map(|c| c.game_id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(buf[(0u16, 1u16)].symbol(), "◀");
    }

    #[test]
    fn test_short_view_scrolls_vertically() {
        let data = forest();
        let mut viewport = BracketViewport::default();
        render(&data, Rect::new(0, 0, 100, 6), (0, 1), Direction::LeftToRight, &mut viewport);

        // Second card starts at row 4 of an 8-row bracket with a 4-row body.
        assert_eq!(viewport.scroll_offset, 3);
        let selected = viewport.layout.cards.iter().find(|c| c.game_id == 2).unwrap();
        assert_eq!(selected.area, Rect::new(0, HEADER_ROWS + 1, 24, CARD_HEIGHT));
    }

    #[test]
    fn test_format_team_line_width() {
        let line = format_team_line(Some(1), team("Duke").as_ref(), Some(87), 14);
        assert_eq!(line.chars().count(), 14, "line: {:?}", line);
        let line = format_team_line(Some(16), team("Jacksonville State").as_ref(), Some(72), 24);
        assert_eq!(line.chars().count(), 24, "line: {:?}", line);
        assert!(format_team_line(None, None, None, 20).contains("TBD"));
    }

    #[test]
    fn test_status_line() {
        let played = Game { home_score: Some(70), away_score: Some(60), ..game(1, "2024-03-21", "A", "B") };
        assert!(format_status_line(&played, 20).contains("FINAL"));
        assert!(format_status_line(&game(2, "2024-03-21", "A", "B"), 20).contains("Mar 21"));
        assert_eq!(format_status_line(&game(2, "someday", "A", "B"), 12).chars().count(), 12);
    }
}
