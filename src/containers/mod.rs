//! Container entities: holders and hands.
//!
//! Containers own the membership of board objects and decide their
//! visibility:
//!
//! - An object is a member of at most one holder or hand at a time.
//! - Joining a container sets `render = false`; leaving sets `render = true`
//!   and raises the object to the top of the z-order.
//! - Adding an existing member is a no-op, so replayed additions are safe.
//! - Removal is by identity, never "whatever is on top right now", so a local
//!   pop and a remote removal of a different card both converge.
//!
//! The operations here never emit network messages. Deciding whether a
//! mutation is broadcast is the sync layer's job.

pub mod hand;
pub mod holder;

pub use hand::{Hand, HandLayout};
pub use holder::Holder;

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ObjectId, Point, Result, TableError, World};

/// Which kind of container holds an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    Holder,
    Hand,
}

/// Reference to the container an object sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub id: ObjectId,
    pub kind: ContainerKind,
}

impl ContainerRef {
    #[must_use]
    pub const fn holder(id: ObjectId) -> Self {
        Self { id, kind: ContainerKind::Holder }
    }

    #[must_use]
    pub const fn hand(id: ObjectId) -> Self {
        Self { id, kind: ContainerKind::Hand }
    }
}

impl World {
    /// The container an object currently sits in.
    #[must_use]
    pub fn container_of(&self, id: ObjectId) -> Option<ContainerRef> {
        self.membership.get(&id).copied()
    }

    /// Only images travel between containers.
    fn check_member(&self, container: ObjectId, member: ObjectId) -> Result<()> {
        if container == member {
            return Err(TableError::InvalidMessage(format!("{container} cannot contain itself")));
        }
        self.image(member).map(|_| ())
    }

    /// Drop `id` from whatever container holds it, without touching its
    /// render or face state. Returns the container it left.
    pub(crate) fn detach(&mut self, id: ObjectId) -> Result<Option<ContainerRef>> {
        let Some(container) = self.membership.remove(&id) else {
            return Ok(None);
        };
        match container.kind {
            ContainerKind::Holder => {
                self.holder_mut(container.id)?.remove(id);
            }
            ContainerKind::Hand => {
                self.hand_mut(container.id)?.remove(id);
            }
        }
        Ok(Some(container))
    }

    /// Detach from any container other than `target`.
    fn detach_elsewhere(&mut self, id: ObjectId, target: ContainerRef) -> Result<()> {
        if let Some(current) = self.container_of(id) {
            if current != target {
                debug!(object = %id, from = %current.id, to = %target.id, "moving between containers");
                self.detach(id)?;
            }
        }
        Ok(())
    }

    /// Put the object back on the board above everything else.
    fn release_to_board(&mut self, id: ObjectId) -> Result<()> {
        self.resolve_mut(id)?.render = true;
        self.raise(id)?;
        Ok(())
    }

    fn hide_in_container(&mut self, id: ObjectId) -> Result<()> {
        let obj = self.resolve_mut(id)?;
        obj.render = false;
        obj.focused = false;
        Ok(())
    }

    // === Holder ===

    /// Add an image on top of a holder.
    ///
    /// Returns false if it was already a member (nothing changes).
    pub fn add_to_holder(&mut self, holder: ObjectId, image: ObjectId) -> Result<bool> {
        self.holder(holder)?;
        self.check_member(holder, image)?;
        if self.holder(holder)?.contains(image) {
            return Ok(false);
        }

        let target = ContainerRef::holder(holder);
        self.detach_elsewhere(image, target)?;
        self.holder_mut(holder)?.push(image);
        self.membership.insert(image, target);
        self.hide_in_container(image)?;
        self.resolve_mut(holder)?.focused = false;
        Ok(true)
    }

    /// Remove a specific image from a holder, wherever it sits.
    ///
    /// Returns false if it was not a member.
    pub fn remove_from_holder(&mut self, holder: ObjectId, image: ObjectId) -> Result<bool> {
        if !self.holder_mut(holder)?.remove(image) {
            return Ok(false);
        }
        self.membership.remove(&image);
        self.release_to_board(image)?;
        Ok(true)
    }

    /// Top of a holder.
    pub fn holder_top(&self, holder: ObjectId) -> Result<Option<ObjectId>> {
        Ok(self.holder(holder)?.top())
    }

    /// Make a holder's deck exactly `order` (bottom to top).
    ///
    /// Listed images are pulled out of other containers; former members that
    /// are not listed go back onto the board. Duplicates keep their first
    /// position.
    pub fn set_holder_order(&mut self, holder: ObjectId, order: &[ObjectId]) -> Result<()> {
        self.holder(holder)?;
        for &id in order {
            self.check_member(holder, id)?;
        }

        let mut seen = FxHashSet::default();
        let order: Vector<ObjectId> = order.iter().copied().filter(|id| seen.insert(*id)).collect();

        let released: Vec<ObjectId> = self
            .holder(holder)?
            .deck()
            .iter()
            .copied()
            .filter(|id| !seen.contains(id))
            .collect();
        for id in released {
            self.membership.remove(&id);
            self.holder_mut(holder)?.remove(id);
            self.release_to_board(id)?;
        }

        let target = ContainerRef::holder(holder);
        for &id in &order {
            self.detach_elsewhere(id, target)?;
            self.membership.insert(id, target);
            self.hide_in_container(id)?;
        }
        self.holder_mut(holder)?.replace(order);
        Ok(())
    }

    // === Hand ===

    /// Insert an image into a hand at `index` (clamped).
    ///
    /// The image's face is forced to what this client should see. Returns the
    /// index used, or `None` if it was already a member.
    pub fn add_to_hand(&mut self, hand: ObjectId, image: ObjectId, index: usize) -> Result<Option<usize>> {
        self.hand(hand)?;
        self.check_member(hand, image)?;
        if self.hand(hand)?.contains(image) {
            return Ok(None);
        }

        let target = ContainerRef::hand(hand);
        self.detach_elsewhere(image, target)?;
        let used = self.hand_mut(hand)?.insert(image, index);
        self.membership.insert(image, target);
        self.hide_in_container(image)?;
        self.resolve_mut(hand)?.focused = false;

        let front = self.hand(hand)?.shows_front_to(self.local_name());
        self.image_mut(image)?.set_front(front);
        Ok(used)
    }

    /// Remove an image from a hand. It returns to the board face down.
    pub fn remove_from_hand(&mut self, hand: ObjectId, image: ObjectId) -> Result<bool> {
        if !self.hand_mut(hand)?.remove(image) {
            return Ok(false);
        }
        self.membership.remove(&image);
        self.image_mut(image)?.set_front(false);
        self.release_to_board(image)?;
        Ok(true)
    }

    /// Change a hand's owner and re-derive member faces.
    pub fn set_hand_owner(&mut self, hand: ObjectId, owner: &str) -> Result<()> {
        self.hand_mut(hand)?.owner = owner.to_string();
        self.refresh_hand_faces(hand)
    }

    /// Force every member face to what this client should see.
    pub fn refresh_hand_faces(&mut self, hand: ObjectId) -> Result<()> {
        let h = self.hand(hand)?;
        let front = h.shows_front_to(self.local_name());
        let members = h.to_vec();
        for id in members {
            self.image_mut(id)?.set_front(front);
        }
        Ok(())
    }

    /// Re-apply hand visibility to one object if it sits in a hand.
    pub fn enforce_hand_face(&mut self, id: ObjectId) -> Result<()> {
        if let Some(ContainerRef { id: hand, kind: ContainerKind::Hand }) = self.container_of(id) {
            let front = self.hand(hand)?.shows_front_to(self.local_name());
            self.image_mut(id)?.set_front(front);
        }
        Ok(())
    }

    /// Card layout of a hand, sized after its first member.
    pub fn hand_layout(&self, hand: ObjectId, margin: i32) -> Result<Option<HandLayout>> {
        let area = self.rect(hand)?;
        let Some(&first) = self.hand(hand)?.deck().front() else {
            return Ok(None);
        };
        let card = self.rect(first)?;
        Ok(Some(HandLayout {
            area,
            card_width: card.width,
            card_height: card.height,
            margin,
        }))
    }

    /// Insertion slot closest to `pointer`. An empty hand always answers 0.
    pub fn hand_insertion_index(&self, hand: ObjectId, pointer: Point, margin: i32) -> Result<usize> {
        let len = self.hand(hand)?.len();
        Ok(self
            .hand_layout(hand, margin)?
            .map_or(0, |layout| layout.closest_insertion(len, pointer)))
    }

    /// Member laid out under `pointer`.
    pub fn hand_member_at(&self, hand: ObjectId, pointer: Point, margin: i32) -> Result<Option<ObjectId>> {
        let h = self.hand(hand)?;
        let Some(layout) = self.hand_layout(hand, margin)? else {
            return Ok(None);
        };
        Ok(layout.member_at(h.len(), pointer).and_then(|i| h.deck().get(i).copied()))
    }
}
