use crate::bracket::layout::GamePosition;
use courtside_api::{Side, TournamentData};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Which way rounds progress across the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveStyle {
    Default,
    Hovered,
    Highlighted,
}

/// Cubic Bezier from a feeder game's box to the box of the game it feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorCurve {
    pub feeder: i64,
    pub dependent: i64,
    pub side: Side,
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
    pub style: CurveStyle,
}

impl ConnectorCurve {
    fn between(from: &GamePosition, to: &GamePosition, direction: Direction) -> (Point, Point, Point, Point) {
        let (start_x, end_x) = match direction {
            Direction::LeftToRight => (from.right(), to.left()),
            Direction::RightToLeft => (from.left(), to.right()),
        };
        let start = Point { x: start_x, y: from.center_y() };
        let end = Point { x: end_x, y: to.center_y() };
        let mid_x = (start.x + end.x) / 2.0;
        (start, Point { x: mid_x, y: start.y }, Point { x: mid_x, y: end.y }, end)
    }

    /// SVG path data, `M x y C c1x c1y, c2x c2y, x y`.
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }

    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point {
            x: a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            y: a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        }
    }

    /// `segments + 1` evenly spaced points, start and end included.
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        if segments == 0 {
            return vec![self.start];
        }
        (0..=segments).map(|i| self.point_at(i as f64 / segments as f64)).collect()
    }

    /// Terminal cells the curve passes through, each with a glyph for the
    /// local slope. Coordinates are container-relative.
    pub fn cells(&self) -> Vec<(i32, i32, char)> {
        let span = (self.end.x - self.start.x).abs() + (self.end.y - self.start.y).abs();
        let segments = ((span * 3.0).ceil() as usize).max(4);

        let mut out: Vec<(i32, i32, char)> = Vec::new();
        let mut prev: Option<(i32, i32)> = None;
        for p in self.sample(segments) {
            let cell = (p.x.floor() as i32, p.y.floor() as i32);
            if prev == Some(cell) {
                continue;
            }
            let glyph = match prev {
                None => '─',
                Some((px, py)) => slope_glyph(cell.0 - px, cell.1 - py),
            };
            out.push((cell.0, cell.1, glyph));
            prev = Some(cell);
        }
        out
    }
}

fn slope_glyph(dx: i32, dy: i32) -> char {
    match (dx.signum(), dy.signum()) {
        (_, 0) => '─',
        (0, _) => '│',
        (sx, sy) if sx == sy => '╲',
        _ => '╱',
    }
}

/// One curve per feeder → dependent edge whose games both have a measured
/// position. Edges come from the same visited-guarded walk as the date
/// columns, so a repeated game never produces duplicate curves.
pub fn connector_curves(
    data: &TournamentData,
    positions: &[GamePosition],
    highlight: &[i64],
    hover: Option<i64>,
    direction: Direction,
) -> Vec<ConnectorCurve> {
    let by_id: HashMap<i64, &GamePosition> = positions.iter().map(|p| (p.game_id, p)).collect();
    let on_path: HashSet<i64> = highlight.iter().copied().collect();

    data.edges()
        .into_iter()
        .filter_map(|edge| {
            let from = by_id.get(&edge.feeder)?;
            let to = by_id.get(&edge.dependent)?;
            let (start, control1, control2, end) = ConnectorCurve::between(from, to, direction);
            let style = if on_path.contains(&edge.feeder) && on_path.contains(&edge.dependent) {
                CurveStyle::Highlighted
            } else if hover.is_some_and(|h| h == edge.feeder || h == edge.dependent) {
                CurveStyle::Hovered
            } else {
                CurveStyle::Default
            };
            Some(ConnectorCurve {
                feeder: edge.feeder,
                dependent: edge.dependent,
                side: edge.side,
                start,
                control1,
                control2,
                end,
                style,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_api::{Game, GameNode};

    fn game(id: i64, date: &str) -> Game {
        Game { id, date: date.into(), ..Default::default() }
    }

    fn forest() -> TournamentData {
        let g1 = GameNode::leaf(game(1, "2024-03-21"));
        let g2 = GameNode::leaf(game(2, "2024-03-21"));
        TournamentData {
            roots: vec![GameNode::with_sources(game(3, "2024-03-23"), Some(g1), Some(g2))],
            tournament: None,
        }
    }

    fn pos(game_id: i64, x: i32, y: i32) -> GamePosition {
        GamePosition { game_id, x, y, width: 20, height: 4, home_won: false }
    }

    fn positions() -> Vec<GamePosition> {
        vec![pos(1, 0, 0), pos(2, 0, 10), pos(3, 30, 5)]
    }

    #[test]
    fn left_to_right_geometry() {
        let curves = connector_curves(&forest(), &positions(), &[], None, Direction::LeftToRight);
        assert_eq!(curves.len(), 2);

        let home = curves.iter().find(|c| c.feeder == 1).unwrap();
        assert_eq!(home.dependent, 3);
        assert_eq!(home.side, Side::Home);
        assert_eq!(home.start, Point { x: 20.0, y: 2.0 });
        assert_eq!(home.end, Point { x: 30.0, y: 7.0 });
        assert_eq!(home.control1, Point { x: 25.0, y: 2.0 });
        assert_eq!(home.control2, Point { x: 25.0, y: 7.0 });
        assert_eq!(home.svg_path(), "M 20 2 C 25 2, 25 7, 30 7");
    }

    #[test]
    fn right_to_left_mirrors_edges() {
        let mirrored = vec![pos(1, 40, 0), pos(3, 0, 5)];
        let curves = connector_curves(&forest(), &mirrored, &[], None, Direction::RightToLeft);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].start, Point { x: 40.0, y: 2.0 });
        assert_eq!(curves[0].end, Point { x: 20.0, y: 7.0 });
        assert_eq!(curves[0].control1.x, 30.0);
    }

    #[test]
    fn missing_positions_drop_the_curve() {
        let partial = vec![pos(1, 0, 0), pos(3, 30, 5)];
        let curves = connector_curves(&forest(), &partial, &[], None, Direction::LeftToRight);
        assert_eq!(curves.iter().map(|c| c.feeder).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn styles_follow_highlight_then_hover() {
        let curves = connector_curves(&forest(), &positions(), &[3, 1], Some(2), Direction::LeftToRight);
        let style_of = |feeder: i64| curves.iter().find(|c| c.feeder == feeder).unwrap().style;
        assert_eq!(style_of(1), CurveStyle::Highlighted);
        assert_eq!(style_of(2), CurveStyle::Hovered);

        let plain = connector_curves(&forest(), &positions(), &[3], None, Direction::LeftToRight);
        assert!(plain.iter().all(|c| c.style == CurveStyle::Default));
    }

    #[test]
    fn curve_endpoints_and_samples() {
        let curves = connector_curves(&forest(), &positions(), &[], None, Direction::LeftToRight);
        let curve = &curves[0];
        assert_eq!(curve.point_at(0.0), curve.start);
        assert_eq!(curve.point_at(1.0), curve.end);
        let mid = curve.point_at(0.5);
        assert!((mid.x - 25.0).abs() < 1e-9);

        let points = curve.sample(8);
        assert_eq!(points.len(), 9);
        assert!(points.windows(2).all(|w| w[0].x <= w[1].x));
        assert_eq!(curve.sample(0), vec![curve.start]);
    }

    #[test]
    fn rasterized_cells_run_from_start_to_end() {
        let curves = connector_curves(&forest(), &positions(), &[], None, Direction::LeftToRight);
        let cells = curves.iter().find(|c| c.feeder == 1).unwrap().cells();
        assert_eq!(cells.first().map(|c| (c.0, c.1)), Some((20, 2)));
        assert_eq!(cells.last().map(|c| (c.0, c.1)), Some((30, 7)));
        assert!(cells.iter().any(|c| c.2 == '╲' || c.2 == '│'));
        for pair in cells.windows(2) {
            assert!((pair[1].0 - pair[0].0).abs() <= 1 && (pair[1].1 - pair[0].1).abs() <= 1);
        }
    }

    #[test]
    fn slope_glyphs() {
        assert_eq!(slope_glyph(1, 0), '─');
        assert_eq!(slope_glyph(0, 1), '│');
        assert_eq!(slope_glyph(1, 1), '╲');
        assert_eq!(slope_glyph(1, -1), '╱');
        assert_eq!(slope_glyph(-1, 1), '╱');
    }
}
