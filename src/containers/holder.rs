//! Holder: an ordered stack of objects.
//!
//! Index 0 is the bottom, the last element is the top. Only the top is
//! visible on the board.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::ObjectId;

/// Deck state of a holder.
///
/// Pure ordering logic. Membership bookkeeping and render flags are handled
/// by the `World` operations in the parent module.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    deck: Vector<ObjectId>,
}

impl Holder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deck contents, bottom to top.
    #[must_use]
    pub fn deck(&self) -> &Vector<ObjectId> {
        &self.deck
    }

    /// Deck contents as a plain list, bottom to top.
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

    /// Top of the stack.
    #[must_use]
    pub fn top(&self) -> Option<ObjectId> {
        self.deck.last().copied()
    }

    /// Put `id` on top. Returns false (and changes nothing) if already present.
    pub fn push(&mut self, id: ObjectId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.deck.push_back(id);
        true
    }

    /// Remove a specific object wherever it sits.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        match self.deck.index_of(&id) {
            Some(index) => {
                self.deck.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove and return the top.
    pub fn pop_top(&mut self) -> Option<ObjectId> {
        self.deck.pop_back()
    }

    /// Replace the whole order.
    pub(crate) fn replace(&mut self, order: Vector<ObjectId>) {
        self.deck = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<ObjectId> {
        raw.iter().map(|&i| ObjectId(i)).collect()
    }

    #[test]
    fn test_push_is_idempotent() {
        let mut holder = Holder::new();
        assert!(holder.push(ObjectId(1)));
        assert!(!holder.push(ObjectId(1)));
        assert_eq!(holder.to_vec(), ids(&[1]));
    }

    #[test]
    fn test_top_is_last() {
        let mut holder = Holder::new();
        for i in [1, 2, 3] {
            holder.push(ObjectId(i));
        }
        assert_eq!(holder.top(), Some(ObjectId(3)));
        assert_eq!(holder.pop_top(), Some(ObjectId(3)));
        assert_eq!(holder.top(), Some(ObjectId(2)));
    }

    #[test]
    fn test_remove_specific() {
        let mut holder = Holder::new();
        for i in [1, 2, 3] {
            holder.push(ObjectId(i));
        }
        assert!(holder.remove(ObjectId(1)));
        assert!(!holder.remove(ObjectId(1)));
        assert_eq!(holder.to_vec(), ids(&[2, 3]));
    }

    #[test]
    fn test_pop_empty() {
        let mut holder = Holder::new();
        assert_eq!(holder.pop_top(), None);
        assert!(holder.is_empty());
    }
}
