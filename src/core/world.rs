//! The world: identity map and the counters every component shares.
//!
//! `World` replaces what would otherwise be ambient global state:
//!
//! - the identity map (`ObjectId` -> live object), the only way network
//!   messages reach objects
//! - the monotonic z-index counter
//! - the container membership index (object -> holder/hand)
//! - the local participant's name, which decides hand visibility
//!
//! It is owned by the single tick thread, so nothing here is synchronized.
//!
//! ## Usage
//!
//! ```
//! use rust_tabletop::core::{ObjectId, Rect, World};
//! use rust_tabletop::objects::{BoardObject, Image};
//!
//! let mut world = World::new("alice");
//! world
//!     .register(BoardObject::image(ObjectId(0), Rect::new(0, 0, 50, 70), Image::single("a.png")))
//!     .unwrap();
//!
//! assert!(world.resolve(ObjectId(0)).is_ok());
//! assert!(world.resolve(ObjectId(1)).is_err());
//! ```

use rustc_hash::FxHashMap;

use super::error::{Result, TableError};
use super::geometry::{snap_to_grid, Point, Rect};
use super::ObjectId;
use crate::containers::{ContainerRef, Hand, Holder};
use crate::objects::{BoardObject, Button, Dice, Image, ObjectKind};

/// Identity map plus shared counters.
#[derive(Clone, Debug, Default)]
pub struct World {
    /// Live objects by id.
    objects: FxHashMap<ObjectId, BoardObject>,

    /// Registration order. Iteration follows it so every replica walks
    /// objects identically.
    order: Vec<ObjectId>,

    /// Which container each contained object sits in.
    pub(crate) membership: FxHashMap<ObjectId, ContainerRef>,

    /// Next z-index to hand out.
    next_z: i64,

    local_name: String,
}

impl World {
    /// Create an empty world for a participant.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            ..Self::default()
        }
    }

    /// The local participant's name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    // === Identity Map ===

    /// Register a new object under its id.
    ///
    /// Ids are never reused, so registering an existing id is an error, and
    /// so is a rect outside the board.
    pub fn register(&mut self, object: BoardObject) -> Result<()> {
        let id = object.id;
        if self.objects.contains_key(&id) {
            return Err(TableError::DuplicateId(id));
        }
        if !object.rect.within_board() {
            return Err(TableError::InvalidMessage(format!("{id} lies outside the board: {:?}", object.rect)));
        }
        self.next_z = self.next_z.max(object.z_index.saturating_add(1));
        self.objects.insert(id, object);
        self.order.push(id);
        Ok(())
    }

    /// Look up an object.
    pub fn resolve(&self, id: ObjectId) -> Result<&BoardObject> {
        self.objects.get(&id).ok_or(TableError::UnknownId(id))
    }

    /// Look up an object mutably.
    pub fn resolve_mut(&mut self, id: ObjectId) -> Result<&mut BoardObject> {
        self.objects.get_mut(&id).ok_or(TableError::UnknownId(id))
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids in registration order.
    #[must_use]
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    /// Objects in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BoardObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Objects currently drawn on the board.
    pub fn rendered(&self) -> impl Iterator<Item = &BoardObject> {
        self.iter().filter(|o| o.render)
    }

    /// Smallest id not yet used.
    #[must_use]
    pub fn next_free_id(&self) -> ObjectId {
        self.order.iter().max().map_or(ObjectId(0), |id| id.next())
    }

    // === Z-Order ===

    /// Take the next z-index from the monotonic counter.
    pub fn next_z(&mut self) -> i64 {
        let z = self.next_z;
        self.next_z = self.next_z.saturating_add(1);
        z
    }

    /// Put an object on top of everything drawn so far.
    pub fn raise(&mut self, id: ObjectId) -> Result<i64> {
        if !self.contains(id) {
            return Err(TableError::UnknownId(id));
        }
        let z = self.next_z();
        self.resolve_mut(id)?.z_index = z;
        Ok(z)
    }

    /// Restart the counter above every loaded z-index.
    pub fn restart_z_counter(&mut self) {
        self.next_z = self
            .objects
            .values()
            .map(|o| o.z_index.saturating_add(1))
            .max()
            .unwrap_or(0)
            .max(self.next_z);
    }

    /// Topmost rendered object containing `point` that passes `filter`.
    ///
    /// Ties on z-index go to the higher id so every replica agrees.
    pub fn topmost_at(&self, point: Point, filter: impl Fn(&BoardObject) -> bool) -> Option<ObjectId> {
        self.rendered()
            .filter(|o| o.rect.contains(point) && filter(o))
            .max_by_key(|o| (o.z_index, o.id))
            .map(|o| o.id)
    }

    // === Positions ===

    /// Move an object's top-left corner, snapped to the grid.
    pub fn move_to(&mut self, id: ObjectId, at: Point, grid_step: i32) -> Result<()> {
        let obj = self.resolve_mut(id)?;
        obj.rect = obj.rect.moved_to(snap_to_grid(at.x, grid_step), snap_to_grid(at.y, grid_step));
        Ok(())
    }

    /// Move an object so its center lands on `center`, then snap the corner.
    pub fn move_centered(&mut self, id: ObjectId, center: Point, grid_step: i32) -> Result<()> {
        let rect = self.resolve(id)?.rect;
        let corner = center.offset(-(rect.width as f32) / 2.0, -(rect.height as f32) / 2.0);
        self.move_to(id, corner, grid_step)
    }

    /// Set every object's hover flag from a predicate.
    pub fn set_focus_where(&mut self, focused: impl Fn(&BoardObject) -> bool) {
        for obj in self.objects.values_mut() {
            obj.focused = focused(obj);
        }
    }

    // === Typed Access ===

    pub fn image(&self, id: ObjectId) -> Result<&Image> {
        let obj = self.resolve(id)?;
        obj.as_image().ok_or_else(|| wrong_kind(obj, "image"))
    }

    pub fn image_mut(&mut self, id: ObjectId) -> Result<&mut Image> {
        let obj = self.resolve_mut(id)?;
        let found = obj.kind.name();
        match &mut obj.kind {
            ObjectKind::Image(image) => Ok(image),
            _ => Err(TableError::WrongKind { id, expected: "image", found }),
        }
    }

    pub fn dice(&self, id: ObjectId) -> Result<&Dice> {
        let obj = self.resolve(id)?;
        obj.as_dice().ok_or_else(|| wrong_kind(obj, "dice"))
    }

    pub fn dice_mut(&mut self, id: ObjectId) -> Result<&mut Dice> {
        let obj = self.resolve_mut(id)?;
        let found = obj.kind.name();
        match &mut obj.kind {
            ObjectKind::Dice(dice) => Ok(dice),
            _ => Err(TableError::WrongKind { id, expected: "dice", found }),
        }
    }

    pub fn holder(&self, id: ObjectId) -> Result<&Holder> {
        let obj = self.resolve(id)?;
        obj.as_holder().ok_or_else(|| wrong_kind(obj, "holder"))
    }

    pub fn holder_mut(&mut self, id: ObjectId) -> Result<&mut Holder> {
        let obj = self.resolve_mut(id)?;
        let found = obj.kind.name();
        match &mut obj.kind {
            ObjectKind::Holder(holder) => Ok(holder),
            _ => Err(TableError::WrongKind { id, expected: "holder", found }),
        }
    }

    pub fn hand(&self, id: ObjectId) -> Result<&Hand> {
        let obj = self.resolve(id)?;
        obj.as_hand().ok_or_else(|| wrong_kind(obj, "player_hand"))
    }

    pub fn hand_mut(&mut self, id: ObjectId) -> Result<&mut Hand> {
        let obj = self.resolve_mut(id)?;
        let found = obj.kind.name();
        match &mut obj.kind {
            ObjectKind::Hand(hand) => Ok(hand),
            _ => Err(TableError::WrongKind { id, expected: "player_hand", found }),
        }
    }

    pub fn button(&self, id: ObjectId) -> Result<&Button> {
        let obj = self.resolve(id)?;
        obj.as_button().ok_or_else(|| wrong_kind(obj, "button"))
    }

    /// Ids of every holder, in registration order.
    #[must_use]
    pub fn holders(&self) -> Vec<ObjectId> {
        self.iter().filter(|o| o.as_holder().is_some()).map(|o| o.id).collect()
    }

    /// Ids of every hand, in registration order.
    #[must_use]
    pub fn hands(&self) -> Vec<ObjectId> {
        self.iter().filter(|o| o.as_hand().is_some()).map(|o| o.id).collect()
    }

    /// Rect of an object.
    pub fn rect(&self, id: ObjectId) -> Result<Rect> {
        Ok(self.resolve(id)?.rect)
    }
}

fn wrong_kind(obj: &BoardObject, expected: &'static str) -> TableError {
    TableError::WrongKind {
        id: obj.id,
        expected,
        found: obj.kind.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u32, x: i32, y: i32) -> BoardObject {
        BoardObject::image(ObjectId(id), Rect::new(x, y, 50, 70), Image::two_sided("f.png", "b.png"))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut world = World::new("alice");
        world.register(card(3, 0, 0)).unwrap();

        assert_eq!(world.resolve(ObjectId(3)).unwrap().id, ObjectId(3));
        assert!(matches!(world.resolve(ObjectId(9)), Err(TableError::UnknownId(ObjectId(9)))));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut world = World::new("alice");
        world.register(card(1, 0, 0)).unwrap();
        let err = world.register(card(1, 10, 10)).unwrap_err();
        assert!(matches!(err, TableError::DuplicateId(ObjectId(1))));
        // The original object is untouched
        assert_eq!(world.rect(ObjectId(1)).unwrap().x, 0);
    }

    #[test]
    fn test_z_counter_is_monotonic() {
        let mut world = World::new("alice");
        world.register(card(0, 0, 0)).unwrap();
        world.register(card(1, 0, 0)).unwrap();

        let a = world.raise(ObjectId(0)).unwrap();
        let b = world.raise(ObjectId(1)).unwrap();
        let c = world.raise(ObjectId(0)).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_restart_z_counter_after_load() {
        let mut world = World::new("alice");
        world.register(card(0, 0, 0).with_z_index(41)).unwrap();
        world.restart_z_counter();
        assert_eq!(world.next_z(), 42);
    }

    #[test]
    fn test_z_counter_saturates() {
        let mut world = World::new("alice");
        world.register(card(0, 0, 0).with_z_index(i64::MAX)).unwrap();
        world.restart_z_counter();
        assert_eq!(world.raise(ObjectId(0)).unwrap(), i64::MAX);
        assert_eq!(world.next_z(), i64::MAX);
    }

    #[test]
    fn test_register_rejects_off_board_rect() {
        let mut world = World::new("alice");
        let far = BoardObject::image(ObjectId(0), Rect::new(i32::MAX, 0, 50, 70), Image::single("a.png"));
        assert!(matches!(world.register(far), Err(TableError::InvalidMessage(_))));
        assert!(world.is_empty());
    }

    #[test]
    fn test_topmost_at() {
        let mut world = World::new("alice");
        world.register(card(0, 0, 0)).unwrap();
        world.register(card(1, 10, 10)).unwrap();
        world.raise(ObjectId(0)).unwrap();

        assert_eq!(world.topmost_at(Point::new(20.0, 20.0), |_| true), Some(ObjectId(0)));

        world.raise(ObjectId(1)).unwrap();
        assert_eq!(world.topmost_at(Point::new(20.0, 20.0), |_| true), Some(ObjectId(1)));
        assert_eq!(world.topmost_at(Point::new(500.0, 500.0), |_| true), None);
    }

    #[test]
    fn test_move_snaps() {
        let mut world = World::new("alice");
        world.register(card(0, 0, 0)).unwrap();

        world.move_to(ObjectId(0), Point::new(101.0, 203.0), 5).unwrap();
        assert_eq!(world.rect(ObjectId(0)).unwrap(), Rect::new(100, 205, 50, 70));

        world.move_centered(ObjectId(0), Point::new(125.0, 135.0), 5).unwrap();
        assert_eq!(world.rect(ObjectId(0)).unwrap(), Rect::new(100, 100, 50, 70));
    }

    #[test]
    fn test_wrong_kind() {
        let mut world = World::new("alice");
        world.register(card(0, 0, 0)).unwrap();
        let err = world.holder(ObjectId(0)).unwrap_err();
        assert!(matches!(err, TableError::WrongKind { expected: "holder", found: "image", .. }));
    }

    #[test]
    fn test_next_free_id() {
        let mut world = World::new("alice");
        assert_eq!(world.next_free_id(), ObjectId(0));
        world.register(card(5, 0, 0)).unwrap();
        world.register(card(2, 0, 0)).unwrap();
        assert_eq!(world.next_free_id(), ObjectId(6));
    }
}
