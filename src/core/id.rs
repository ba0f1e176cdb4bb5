//! Object identification.
//!
//! Every board object (image, die, holder, hand, button) has a unique `ObjectId`.
//!
//! ## Assignment
//!
//! Ids are assigned once, when the object is created, and never change or
//! get reused. Objects are either built by a local loader or deserialized from
//! a snapshot manifest; in both cases the load order is deterministic, so a
//! remote message naming `ObjectId(42)` resolves to the same object on every
//! replica.
//!
//! ```
//! use rust_tabletop::core::ObjectId;
//!
//! let card = ObjectId::new(42);
//! assert_eq!(card.raw(), 42);
//! assert_eq!(card.to_string(), "Object(42)");
//!
//! // Ids serialize as bare integers on the wire.
//! assert_eq!(serde_json::to_string(&card).unwrap(), "42");
//! ```

use serde::{Deserialize, Serialize};

/// Unique, stable identifier for a board object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Create an object id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id following this one.
    ///
    /// Loaders allocate ids with `max(existing) + 1`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}
