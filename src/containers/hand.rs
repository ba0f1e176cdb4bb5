//! Hand: an owner-scoped rack laid out side by side.
//!
//! Unlike a holder, a hand accepts insertion at any index. The index a local
//! drop uses comes from the pointer position (the closest free slot); a
//! replayed insertion carries the index explicitly, so every replica inserts
//! at the same place no matter where its own pointer is.
//!
//! ## Visibility
//!
//! Member faces are derived per client from `owner`: front for the owner's
//! own client, back for everyone else. The derived face is never sent.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{ObjectId, Point, Rect};

/// Deck state of a hand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    deck: Vector<ObjectId>,

    /// Participant who sees this hand's faces. Empty when unclaimed.
    pub owner: String,
}

impl Hand {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            deck: Vector::new(),
            owner: owner.into(),
        }
    }

    /// Members, left to right.
    #[must_use]
    pub fn deck(&self) -> &Vector<ObjectId> {
        &self.deck
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<ObjectId> {
        self.deck.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.deck.contains(&id)
    }

    /// Insert at `index` (clamped to the deck length).
    ///
    /// Returns the index actually used, or `None` if `id` is already a member.
    pub fn insert(&mut self, id: ObjectId, index: usize) -> Option<usize> {
        if self.contains(id) {
            return None;
        }
        let index = index.min(self.deck.len());
        self.deck.insert(index, id);
        Some(index)
    }

    /// Remove a member. Returns false if it was not one.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        match self.deck.index_of(&id) {
            Some(index) => {
                self.deck.remove(index);
                true
            }
            None => false,
        }
    }

    /// Should members show their front to `viewer`?
    #[must_use]
    pub fn shows_front_to(&self, viewer: &str) -> bool {
        !self.owner.is_empty() && self.owner == viewer
    }
}

/// Side-by-side layout of equally sized cards centered in a hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandLayout {
    pub area: Rect,
    pub card_width: i32,
    pub card_height: i32,
    pub margin: i32,
}

impl HandLayout {
    /// `count` slots centered horizontally and vertically in the area.
    #[must_use]
    pub fn slots(&self, count: usize) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        let n = count as f32;
        let w = self.card_width as f32;
        let margin = self.margin as f32;
        let start_x = (self.area.width as f32 - (margin * (n - 1.0) + w * n)) / 2.0;
        let start_y = (self.area.height as f32 - self.card_height as f32) / 2.0;

        (0..count)
            .map(|i| {
                let x = self.area.x as f32 + start_x + i as f32 * (margin + w);
                let y = self.area.y as f32 + start_y;
                Rect::new(x as i32, y as i32, self.card_width, self.card_height)
            })
            .collect()
    }

    /// Slot index among `count + 1` candidate slots closest to `pointer`.
    #[must_use]
    pub fn closest_insertion(&self, count: usize, pointer: Point) -> usize {
        self.slots(count + 1)
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.center()
                    .distance(pointer)
                    .partial_cmp(&b.center().distance(pointer))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map_or(0, |(i, _)| i)
    }

    /// Index of the laid-out member under `pointer`, if any.
    #[must_use]
    pub fn member_at(&self, count: usize, pointer: Point) -> Option<usize> {
        self.slots(count).iter().position(|slot| slot.contains(pointer))
    }
}
