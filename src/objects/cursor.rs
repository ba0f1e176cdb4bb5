//! Remote participants' cursors.
//!
//! Cursor positions travel on the best-effort channel and are purely
//! presentational, so they live outside the identity map.

use rustc_hash::FxHashMap;

use crate::core::{snap_to_grid, Point};

/// Last known cursor of one participant.
#[derive(Clone, Debug, PartialEq)]
pub struct Cursor {
    pub name: String,
    pub color: String,
    pub x: i32,
    pub y: i32,
}

/// Cursors keyed by participant name.
#[derive(Clone, Debug, Default)]
pub struct CursorTable {
    cursors: FxHashMap<String, Cursor>,
}

impl CursorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cursor position, creating the cursor on first sight.
    pub fn update(&mut self, name: &str, color: &str, at: Point, grid_step: i32) {
        let x = snap_to_grid(at.x, grid_step);
        let y = snap_to_grid(at.y, grid_step);
        let cursor = self.cursors.entry(name.to_string()).or_insert_with(|| Cursor {
            name: name.to_string(),
            color: color.to_string(),
            x,
            y,
        });
        cursor.color = color.to_string();
        cursor.x = x;
        cursor.y = y;
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cursor> {
        self.cursors.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cursor> {
        self.cursors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_snaps_and_replaces() {
        let mut table = CursorTable::new();
        table.update("bob", "#00ff00", Point::new(12.0, 18.0), 5);
        table.update("bob", "#0000ff", Point::new(31.0, 44.0), 5);

        assert_eq!(table.len(), 1);
        let bob = table.get("bob").unwrap();
        assert_eq!((bob.x, bob.y), (30, 45));
        assert_eq!(bob.color, "#0000ff");
    }
}
