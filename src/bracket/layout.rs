use tui::layout::Rect;

/// A rendered game card, recorded by the bracket widget as it draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTag {
    pub game_id: i64,
    pub area: Rect,
    pub home_won: bool,
}

/// Cards drawn during the last frame. Cleared at the start of every bracket
/// render, so it only ever describes what is on screen.
#[derive(Debug, Default, Clone)]
pub struct CardRegistry {
    cards: Vec<CardTag>,
}

impl CardRegistry {
    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn register(&mut self, tag: CardTag) {
        self.cards.push(tag);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardTag> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card under an absolute screen cell, if any.
    pub fn card_at(&self, column: u16, row: u16) -> Option<&CardTag> {
        self.cards.iter().find(|c| {
            column >= c.area.x
                && column < c.area.x + c.area.width
                && row >= c.area.y
                && row < c.area.y + c.area.height
        })
    }

    pub fn covers(&self, column: u16, row: u16) -> bool {
        self.card_at(column, row).is_some()
    }
}

/// Card geometry relative to the bracket container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamePosition {
    pub game_id: i64,
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
    pub home_won: bool,
}

impl GamePosition {
    pub fn left(&self) -> f64 {
        f64::from(self.x)
    }

    pub fn right(&self) -> f64 {
        f64::from(self.x) + f64::from(self.width)
    }

    pub fn center_y(&self) -> f64 {
        f64::from(self.y) + f64::from(self.height) / 2.0
    }
}

/// Convert registered card rects into container-relative positions.
/// Cards that don't overlap the container are left out.
pub fn measure_positions(container: Rect, registry: &CardRegistry) -> Vec<GamePosition> {
    registry
        .iter()
        .filter(|card| container.intersects(card.area))
        .map(|card| GamePosition {
            game_id: card.game_id,
            x: i32::from(card.area.x) - i32::from(container.x),
            y: i32::from(card.area.y) - i32::from(container.y),
            width: card.area.width,
            height: card.area.height,
            home_won: card.home_won,
        })
        .collect()
}

/// Positions from the last committed frame.
///
/// Rendering fills the registry; [`MeasuredLayout::remeasure`] runs once the
/// frame is on screen, and the caller redraws when it reports a change so
/// connectors catch up with the committed layout.
#[derive(Debug, Default, Clone)]
pub struct MeasuredLayout {
    pub cards: CardRegistry,
    pub container: Rect,
    pub positions: Vec<GamePosition>,
    stale: bool,
}

impl MeasuredLayout {
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Returns true when the measured positions differ from the previous set.
    pub fn remeasure(&mut self) -> bool {
        let measured = measure_positions(self.container, &self.cards);
        self.stale = false;
        if measured == self.positions {
            return false;
        }
        self.positions = measured;
        true
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.positions.clear();
        self.stale = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(game_id: i64, x: u16, y: u16) -> CardTag {
        CardTag { game_id, area: Rect::new(x, y, 20, 3), home_won: game_id % 2 == 0 }
    }

    #[test]
    fn positions_are_relative_to_container() {
        let mut registry = CardRegistry::default();
        registry.register(tag(1, 5, 4));
        registry.register(tag(2, 31, 10));

        let positions = measure_positions(Rect::new(5, 4, 80, 30), &registry);
        assert_eq!(positions.len(), 2);
        assert_eq!((positions[0].x, positions[0].y), (0, 0));
        assert_eq!((positions[1].x, positions[1].y), (26, 6));
        assert!(positions[1].home_won);
        assert_eq!(positions[1].right(), 46.0);
        assert_eq!(positions[1].center_y(), 7.5);
    }

    #[test]
    fn cards_outside_container_are_skipped() {
        let mut registry = CardRegistry::default();
        registry.register(tag(1, 0, 0));
        registry.register(tag(2, 100, 0));

        let positions = measure_positions(Rect::new(0, 0, 50, 20), &registry);
        assert_eq!(positions.iter().map(|p| p.game_id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn remeasure_reports_changes_only_once() {
        let mut layout = MeasuredLayout { container: Rect::new(0, 0, 80, 24), ..Default::default() };
        layout.cards.register(tag(7, 2, 2));
        layout.mark_stale();

        assert!(layout.remeasure());
        assert!(!layout.is_stale());
        assert!(!layout.remeasure());

        layout.cards.clear();
        layout.cards.register(tag(7, 2, 5));
        assert!(layout.remeasure());
        assert_eq!(layout.positions[0].y, 5);
    }

    #[test]
    fn card_hit_test() {
        let mut registry = CardRegistry::default();
        registry.register(tag(3, 10, 10));
        assert_eq!(registry.card_at(10, 10).map(|c| c.game_id), Some(3));
        assert_eq!(registry.card_at(29, 12).map(|c| c.game_id), Some(3));
        assert!(registry.card_at(30, 12).is_none());
        assert!(!registry.covers(10, 13));
    }
}
