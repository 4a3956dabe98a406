/// Undo history: an ordered stack of immutable snapshots.
/// Push and pop happen at the tail only.

use crate::domain::entity::Position;

/// State before one accepted move. The level-complete flag is not recorded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HistoryEntry {
    pub player: Position,
    pub box_pos: Position,
    pub moves: u32,
    pub pushes: u32,
    pub box_on_target: bool,
}

#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History { entries: Vec::new() }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u32) -> HistoryEntry {
        HistoryEntry {
            player: Position::new(n as i32, 0),
            box_pos: Position::new(n as i32 + 1, 0),
            moves: n,
            pushes: 0,
            box_on_target: false,
        }
    }

    #[test]
    fn last_in_first_out() {
        let mut h = History::new();
        h.push(entry(0));
        h.push(entry(1));
        assert_eq!(h.depth(), 2);
        assert_eq!(h.pop(), Some(entry(1)));
        assert_eq!(h.pop(), Some(entry(0)));
        assert_eq!(h.pop(), None);
        assert!(h.is_empty());
    }

    #[test]
    fn clear_discards_everything() {
        let mut h = History::new();
        h.push(entry(0));
        h.push(entry(1));
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.pop(), None);
    }
}
