//! Traversal of the tournament forest: date columns, id lookups, feeder paths.
//!
//! Ownership runs strictly top-down (roots own their feeders), so a malformed
//! payload can only repeat a game id, never form a reference cycle. Every walk
//! here tracks visited ids and skips a repeated node together with its subtree.
use crate::{GameNode, TournamentData};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Which slot of the dependent game a feeder's winner occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

/// All games played on one date key, in traversal order.
#[derive(Debug, Clone)]
pub struct GameColumn<'a> {
    pub date: &'a str,
    pub games: Vec<&'a GameNode>,
}

/// A feeder → dependent link in the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub feeder: i64,
    pub dependent: i64,
    pub side: Side,
}

impl TournamentData {
    /// Group every reachable game by its date key, earliest date first.
    ///
    /// Walks depth-first from each root in order (node, home feeder, away
    /// feeder). Keys are compared by parsed calendar date; keys that fail to
    /// parse sort after all parseable ones.
    pub fn collect_by_date(&self) -> Vec<GameColumn<'_>> {
        let mut columns: Vec<GameColumn<'_>> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        walk(&self.roots, |node| {
            let key = node.game.date.as_str();
            let slot = *slots.entry(key).or_insert_with(|| {
                columns.push(GameColumn { date: key, games: Vec::new() });
                columns.len() - 1
            });
            columns[slot].games.push(node);
        });

        // Stable sort: equal dates keep first-seen order.
        columns.sort_by(|a, b| compare_date_keys(a.date, b.date));
        columns
    }

    /// Every feeder → dependent edge, in the same order `collect_by_date` visits nodes.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        let mut seen = HashSet::new();
        walk(&self.roots, |node| {
            for (side, source) in node.sources() {
                // A repeated feeder is still linked once from its first dependent.
                if seen.insert(source.game.id) {
                    edges.push(Edge { feeder: source.game.id, dependent: node.game.id, side });
                }
            }
        });
        edges
    }

    pub fn game_count(&self) -> usize {
        let mut count = 0;
        walk(&self.roots, |_| count += 1);
        count
    }

    /// Game ids from the root down to `game_id`; empty when unreachable.
    ///
    /// Builds a throwaway index. Callers that look up more than once should
    /// keep a [`BracketIndex`] next to the snapshot instead.
    pub fn path_to(&self, game_id: i64) -> Vec<i64> {
        BracketIndex::build(self).path_to(game_id)
    }
}

/// Pre-order walk over the forest, skipping any node whose id was already visited.
fn walk<'a>(roots: &'a [GameNode], mut visit: impl FnMut(&'a GameNode)) {
    let mut visited: HashSet<i64> = HashSet::new();
    let mut stack: Vec<&'a GameNode> = roots.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.game.id) {
            continue;
        }
        visit(node);
        // Push away before home so home is popped (visited) first.
        if let Some(away) = node.away_source.as_deref() {
            stack.push(away);
        }
        if let Some(home) = node.home_source.as_deref() {
            stack.push(home);
        }
    }
}

/// Where a game sits in the forest: the root it descends from, and the game
/// its winner advances to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    root: usize,
    dependent: Option<(i64, Side)>,
}

/// Id → position lookup over one forest snapshot, built in a single walk.
/// It holds no references into the data, so it can live next to the snapshot
/// it was built from. Rebuild it when the data changes.
#[derive(Debug, Clone, Default)]
pub struct BracketIndex {
    slots: HashMap<i64, Slot>,
}

impl BracketIndex {
    pub fn build(data: &TournamentData) -> Self {
        let mut slots = HashMap::new();
        // Same visiting order as `walk`, so the first occurrence of a repeated id wins.
        let mut stack: Vec<(&GameNode, Slot)> = data
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(root, node)| (node, Slot { root, dependent: None }))
            .collect();

        while let Some((node, slot)) = stack.pop() {
            if slots.contains_key(&node.game.id) {
                continue;
            }
            slots.insert(node.game.id, slot);
            let feeders: Vec<(Side, &GameNode)> = node.sources().collect();
            for (side, source) in feeders.into_iter().rev() {
                let dependent = Some((node.game.id, side));
                stack.push((source, Slot { root: slot.root, dependent }));
            }
        }
        Self { slots }
    }

    pub fn contains(&self, game_id: i64) -> bool {
        self.slots.contains_key(&game_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The game `game_id`'s winner advances to; `None` for roots and unknown ids.
    pub fn dependent(&self, game_id: i64) -> Option<i64> {
        self.slots.get(&game_id)?.dependent.map(|(id, _)| id)
    }

    /// Chain of game ids connecting `game_id` to the root it descends from,
    /// ordered root first, target last.
    pub fn path_to(&self, game_id: i64) -> Vec<i64> {
        if !self.contains(game_id) {
            return Vec::new();
        }
        let mut path = vec![game_id];
        while let Some(parent) = path.last().and_then(|&id| self.dependent(id)) {
            path.push(parent);
        }
        path.reverse();
        path
    }

    /// Resolve `game_id` to its node in `data`, which must be the snapshot this
    /// index was built from. Descends from the root, one step per round.
    pub fn get<'a>(&self, data: &'a TournamentData, game_id: i64) -> Option<&'a GameNode> {
        let mut sides = Vec::new();
        let mut slot = *self.slots.get(&game_id)?;
        while let Some((dependent, side)) = slot.dependent {
            sides.push(side);
            slot = *self.slots.get(&dependent)?;
        }

        let mut node = data.roots.get(slot.root)?;
        for side in sides.into_iter().rev() {
            node = match side {
                Side::Home => node.home_source.as_deref()?,
                Side::Away => node.away_source.as_deref()?,
            };
        }
        (node.game.id == game_id).then_some(node)
    }
}

/// Parse an API date key. Accepts `2024-03-01`, `20240301` and full timestamps.
pub fn parse_date_key(key: &str) -> Option<NaiveDateTime> {
    let key = key.trim();
    if let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if key.len() == 8
        && let Ok(date) = NaiveDate::parse_from_str(key, "%Y%m%d")
    {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(key) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(key, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Calendar order for date keys. Unparseable keys go last; ties fall back to
/// the raw string so the order is total.
pub fn compare_date_keys(a: &str, b: &str) -> Ordering {
    match (parse_date_key(a), parse_date_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
