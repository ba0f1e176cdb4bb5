//! Two-faced images (cards, tokens).
//!
//! Flipping is the only mutation an image has besides move and rotate.
//! On the wire a flip always carries the resulting face (`is_front`), never a
//! toggle, so replaying it twice is harmless.

use serde::{Deserialize, Serialize};

/// Image faces and which one is up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Asset path of the front face.
    pub front_path: String,

    /// Asset path of the back face. `None` for single-sided images.
    pub back_path: Option<String>,

    /// Is the front face showing?
    pub is_front: bool,
}

impl Image {
    /// A single-sided image. Always shows its front.
    pub fn single(front: impl Into<String>) -> Self {
        Self {
            front_path: front.into(),
            back_path: None,
            is_front: true,
        }
    }

    /// A two-sided image, initially face down.
    pub fn two_sided(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front_path: front.into(),
            back_path: Some(back.into()),
            is_front: false,
        }
    }

    /// Can this image be flipped?
    #[must_use]
    pub fn flipable(&self) -> bool {
        self.back_path.is_some()
    }

    /// Set the showing face. Returns true if anything changed.
    ///
    /// Single-sided images ignore the request.
    pub fn set_front(&mut self, is_front: bool) -> bool {
        if !self.flipable() || self.is_front == is_front {
            return false;
        }
        self.is_front = is_front;
        true
    }

    /// The face a flip would produce, or `None` for single-sided images.
    #[must_use]
    pub fn flipped_face(&self) -> Option<bool> {
        self.flipable().then_some(!self.is_front)
    }

    /// Asset path of the face currently showing.
    #[must_use]
    pub fn visible_path(&self) -> &str {
        match (&self.back_path, self.is_front) {
            (Some(back), false) => back,
            _ => &self.front_path,
        }
    }

    /// All asset paths this image references.
    pub fn asset_paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.front_path.as_str()).chain(self.back_path.as_deref())
    }
}
