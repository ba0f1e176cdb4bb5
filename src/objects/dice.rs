//! Dice.
//!
//! A roll is decided by the client that rolls: it picks the result index and
//! broadcasts it, and every replica animates towards that same face.

use serde::{Deserialize, Serialize};

/// Die faces and the face showing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    /// Face asset paths, in index order.
    pub faces: Vec<String>,

    /// Index into `faces`.
    pub current_face: usize,
}

impl Dice {
    pub fn new(faces: Vec<String>) -> Self {
        Self { faces, current_face: 0 }
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Is `index` a valid face?
    #[must_use]
    pub fn has_face(&self, index: usize) -> bool {
        index < self.faces.len()
    }

    /// Show face `index`. Out-of-range indices are ignored and return false.
    pub fn set_face(&mut self, index: usize) -> bool {
        if !self.has_face(index) {
            return false;
        }
        self.current_face = index;
        true
    }

    /// Asset path of the face showing.
    #[must_use]
    pub fn face_path(&self) -> Option<&str> {
        self.faces.get(self.current_face).map(String::as_str)
    }
}
