//! Per-kind pick-up, click and drop semantics.
//!
//! The manipulator never branches on object kind itself. It asks
//! [`behaviour_for`] and calls the same three operations on whatever comes
//! back.

use crate::core::{ObjectId, Point, Result};
use crate::objects::ObjectKind;
use crate::sync::LocalAction;
use crate::table::Table;

use super::Modifiers;

pub(crate) trait Behaviour {
    /// The pointer started dragging `id` after pressing it at `at`. Returns
    /// the object that actually follows the pointer, if any.
    fn on_pick_up(&self, table: &mut Table, id: ObjectId, _at: Point, modifiers: Modifiers) -> Result<Option<ObjectId>> {
        let obj = table.world.resolve(id)?;
        Ok((obj.draggable || modifiers.ctrl).then_some(id))
    }

    /// Pressed and released without moving.
    fn on_click(&self, _table: &mut Table, _id: ObjectId) -> Result<()> {
        Ok(())
    }

    /// Released after a drag at `at`.
    fn on_drop(&self, table: &mut Table, id: ObjectId, _at: Point) -> Result<()> {
        settle_position(table, id)
    }
}

/// Send the dragged object's final position on the reliable channel.
fn settle_position(table: &mut Table, id: ObjectId) -> Result<()> {
    let to = table.world.rect(id)?.top_left();
    table.apply_local(LocalAction::Move { object: id, to, reliable: true })
}

struct ImageBehaviour;
struct DiceBehaviour;
struct HolderBehaviour;
struct HandBehaviour;
struct ButtonBehaviour;

impl Behaviour for ImageBehaviour {
    fn on_click(&self, table: &mut Table, id: ObjectId) -> Result<()> {
        table.apply_local(LocalAction::Flip { image: id })
    }

    /// Join the first holder, then the first hand, under the dropped card.
    ///
    /// Hidden containers still count.
    fn on_drop(&self, table: &mut Table, id: ObjectId, at: Point) -> Result<()> {
        let rect = table.world.rect(id)?;
        let world = &table.world;
        let hit = |c: &ObjectId| {
            world
                .resolve(*c)
                .is_ok_and(|o| o.id != id && o.rect.intersects(&rect))
        };
        let holder = world.holders().into_iter().find(|c| hit(c));
        let hand = world.hands().into_iter().find(|c| hit(c));

        if let Some(holder) = holder {
            return table.apply_local(LocalAction::AddToHolder { holder, image: id });
        }
        if let Some(hand) = hand {
            let index = table.world.hand_insertion_index(hand, at, table.config.hand_margin)?;
            return table.apply_local(LocalAction::AddToHand { hand, image: id, index });
        }
        settle_position(table, id)
    }
}

impl Behaviour for DiceBehaviour {
    fn on_click(&self, table: &mut Table, id: ObjectId) -> Result<()> {
        table.apply_local(LocalAction::Roll { dice: id })
    }
}

impl Behaviour for HolderBehaviour {
    /// Dragging a deck drags its top card; with ctrl, the holder itself.
    fn on_pick_up(&self, table: &mut Table, id: ObjectId, _at: Point, modifiers: Modifiers) -> Result<Option<ObjectId>> {
        if modifiers.ctrl {
            return Ok(Some(id));
        }
        let Some(top) = table.world.holder_top(id)? else {
            return Ok(None);
        };
        table.apply_local(LocalAction::RemoveFromHolder { holder: id, image: top })?;
        Ok(Some(top))
    }

    /// Clicking a deck turns its top card over.
    fn on_click(&self, table: &mut Table, id: ObjectId) -> Result<()> {
        match table.world.holder_top(id)? {
            Some(top) => table.apply_local(LocalAction::Flip { image: top }),
            None => Ok(()),
        }
    }
}

impl Behaviour for HandBehaviour {
    /// Pull out the card laid out under the pointer.
    fn on_pick_up(&self, table: &mut Table, id: ObjectId, at: Point, modifiers: Modifiers) -> Result<Option<ObjectId>> {
        if modifiers.ctrl {
            return Ok(Some(id));
        }
        let Some(card) = table.world.hand_member_at(id, at, table.config.hand_margin)? else {
            return Ok(None);
        };
        table.apply_local(LocalAction::RemoveFromHand { hand: id, image: card })?;
        Ok(Some(card))
    }
}

impl Behaviour for ButtonBehaviour {
    fn on_click(&self, table: &mut Table, id: ObjectId) -> Result<()> {
        table.apply_local(LocalAction::PressButton { button: id })
    }
}

/// Behaviour of an object kind.
pub(crate) fn behaviour_for(kind: &ObjectKind) -> &'static dyn Behaviour {
    match kind {
        ObjectKind::Image(_) => &ImageBehaviour,
        ObjectKind::Dice(_) => &DiceBehaviour,
        ObjectKind::Holder(_) => &HolderBehaviour,
        ObjectKind::Hand(_) => &HandBehaviour,
        ObjectKind::Button(_) => &ButtonBehaviour,
    }
}
