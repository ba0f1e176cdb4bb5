//! Board objects.
//!
//! Every placeable entity shares the same capability set (`BoardObject`):
//! a world rect, z-order, quarter-turn rotation, capability flags and
//! transient render/focus state. What differs between kinds lives in
//! [`ObjectKind`].
//!
//! ## Kinds
//!
//! - `Image`: two-faced card or token (flip, move, rotate)
//! - `Dice`: ordered face list with a current face (roll)
//! - `Holder`: ordered stack container (see `containers`)
//! - `Hand`: owner-scoped rack container (see `containers`)
//! - `Button`: shuffle / retrieve / sit actions bound to a container
//!
//! Objects are never destroyed during a session. Taking something out of
//! play is container membership plus `render = false`.

pub mod button;
pub mod cursor;
pub mod dice;
pub mod image;

pub use button::{Button, ButtonAction};
pub use cursor::{Cursor, CursorTable};
pub use dice::Dice;
pub use image::Image;

use crate::containers::{Hand, Holder};
use crate::core::{ObjectId, Rect, Rotation};

/// Kind-specific state of a board object.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Image(Image),
    Dice(Dice),
    Holder(Holder),
    Hand(Hand),
    Button(Button),
}

impl ObjectKind {
    /// Stable name used in manifests, logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Image(_) => "image",
            ObjectKind::Dice(_) => "dice",
            ObjectKind::Holder(_) => "holder",
            ObjectKind::Hand(_) => "player_hand",
            ObjectKind::Button(b) => b.action.kind_name(),
        }
    }

    /// Is this a container (holder or hand)?
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, ObjectKind::Holder(_) | ObjectKind::Hand(_))
    }
}

/// A placeable entity on the board.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardObject {
    /// Stable id, identical on every replica.
    pub id: ObjectId,

    /// Authoritative logical position and size.
    pub rect: Rect,

    /// Draw and click order. Assigned from the world's monotonic counter.
    pub z_index: i64,

    pub rotation: Rotation,

    pub draggable: bool,
    pub rotatable: bool,
    pub clickable: bool,

    /// False while the object sits inside a holder or hand.
    pub render: bool,

    /// Hover highlight. Never synchronized.
    pub focused: bool,

    pub kind: ObjectKind,
}

impl BoardObject {
    fn base(id: ObjectId, rect: Rect, kind: ObjectKind) -> Self {
        Self {
            id,
            rect,
            z_index: 0,
            rotation: Rotation::ZERO,
            draggable: false,
            rotatable: false,
            clickable: true,
            render: true,
            focused: false,
            kind,
        }
    }

    /// A card or token. Draggable and rotatable.
    pub fn image(id: ObjectId, rect: Rect, image: Image) -> Self {
        Self {
            draggable: true,
            rotatable: true,
            ..Self::base(id, rect, ObjectKind::Image(image))
        }
    }

    /// A die. Draggable and rotatable.
    pub fn dice(id: ObjectId, rect: Rect, dice: Dice) -> Self {
        Self {
            draggable: true,
            rotatable: true,
            ..Self::base(id, rect, ObjectKind::Dice(dice))
        }
    }

    /// An empty holder.
    pub fn holder(id: ObjectId, rect: Rect) -> Self {
        Self::base(id, rect, ObjectKind::Holder(Holder::new()))
    }

    /// An empty hand with the given owner (empty string = unowned).
    pub fn hand(id: ObjectId, rect: Rect, owner: impl Into<String>) -> Self {
        Self::base(id, rect, ObjectKind::Hand(Hand::new(owner)))
    }

    /// A button bound to an action.
    pub fn button(id: ObjectId, rect: Rect, action: ButtonAction) -> Self {
        Self::base(id, rect, ObjectKind::Button(Button::new(action)))
    }

    /// Set capability flags (builder style).
    #[must_use]
    pub fn with_flags(mut self, draggable: bool, rotatable: bool) -> Self {
        self.draggable = draggable;
        self.rotatable = rotatable;
        self
    }

    /// Set the z-index (builder style).
    #[must_use]
    pub fn with_z_index(mut self, z: i64) -> Self {
        self.z_index = z;
        self
    }

    /// Set the rotation (builder style). The rect is taken as already rotated.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&Image> {
        match &self.kind {
            ObjectKind::Image(image) => Some(image),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dice(&self) -> Option<&Dice> {
        match &self.kind {
            ObjectKind::Dice(dice) => Some(dice),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_holder(&self) -> Option<&Holder> {
        match &self.kind {
            ObjectKind::Holder(holder) => Some(holder),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_hand(&self) -> Option<&Hand> {
        match &self.kind {
            ObjectKind::Hand(hand) => Some(hand),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_button(&self) -> Option<&Button> {
        match &self.kind {
            ObjectKind::Button(button) => Some(button),
            _ => None,
        }
    }

    /// Quarter-turn the object in `direction` (`+1` / `-1`).
    ///
    /// Bounds stay axis-aligned, so width and height swap.
    pub fn rotate(&mut self, direction: i8) {
        self.rotation = self.rotation.turned(direction);
        self.rect = self.rect.swapped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> BoardObject {
        BoardObject::image(ObjectId(7), Rect::new(100, 100, 50, 70), Image::two_sided("f.png", "b.png"))
    }

    #[test]
    fn test_defaults_per_kind() {
        let c = card();
        assert!(c.draggable && c.rotatable && c.clickable && c.render);

        let h = BoardObject::holder(ObjectId(1), Rect::new(0, 0, 60, 80));
        assert!(!h.draggable && !h.rotatable && h.clickable);
        assert_eq!(h.kind_name(), "holder");

        let hand = BoardObject::hand(ObjectId(2), Rect::new(0, 0, 400, 100), "alice");
        assert_eq!(hand.kind_name(), "player_hand");
        assert_eq!(hand.as_hand().map(|h| h.owner.as_str()), Some("alice"));
    }

    #[test]
    fn test_rotate_three_times() {
        let mut c = card();
        for _ in 0..3 {
            c.rotate(1);
        }
        assert_eq!(c.rotation.degrees(), 270);
        assert_eq!(c.rect, Rect::new(100, 100, 70, 50));

        c.rotate(1);
        assert_eq!(c.rotation.degrees(), 0);
        assert_eq!(c.rect, Rect::new(100, 100, 50, 70));
    }

    #[test]
    fn test_accessors() {
        let c = card();
        assert!(c.as_image().is_some());
        assert!(c.as_dice().is_none());
        assert!(c.as_holder().is_none());
        assert!(!c.kind.is_container());
    }
}
