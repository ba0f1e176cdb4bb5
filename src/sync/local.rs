//! Local mutations: apply optimistically, then queue for broadcast.

use tracing::trace;

use super::message::{Channel, WireMessage};
use crate::core::{snap_to_grid, ObjectId, Point, Result};
use crate::objects::ButtonAction;
use crate::table::Table;

/// Something the local participant did.
///
/// Intents may be relative ("flip", "shuffle", "roll"); they are resolved
/// into absolute wire messages before anything is applied.
#[derive(Clone, Debug, PartialEq)]
pub enum LocalAction {
    /// Put an object's top-left corner at `to` (snapped).
    ///
    /// Drag steps are best-effort; `reliable` marks the final drop position.
    Move { object: ObjectId, to: Point, reliable: bool },
    /// Turn an image over.
    Flip { image: ObjectId },
    Rotate { object: ObjectId, direction: i8 },
    AddToHolder { holder: ObjectId, image: ObjectId },
    RemoveFromHolder { holder: ObjectId, image: ObjectId },
    AddToHand { hand: ObjectId, image: ObjectId, index: usize },
    RemoveFromHand { hand: ObjectId, image: ObjectId },
    /// Pick a random deck order for a holder.
    Shuffle { holder: ObjectId },
    /// Pick a random face for a die.
    Roll { dice: ObjectId },
    PressButton { button: ObjectId },
    /// Our own pointer moved.
    MoveCursor { at: Point },
}

impl Table {
    /// Apply a local intent and queue the resulting message.
    ///
    /// Intents that resolve to nothing (flipping a single-sided image,
    /// rolling a faceless die, shuffling an empty holder) are no-ops.
    pub fn apply_local(&mut self, action: LocalAction) -> Result<()> {
        let Some((channel, msg)) = self.resolve_local(action)? else {
            return Ok(());
        };
        self.mutate(&msg)?;
        self.emit(channel, msg);
        Ok(())
    }

    fn resolve_local(&mut self, action: LocalAction) -> Result<Option<(Channel, WireMessage)>> {
        let grid = self.config.grid_step;
        let msg = match action {
            LocalAction::Move { object, to, reliable } => {
                let msg = WireMessage::MoveObject {
                    object_id: object,
                    x: snap_to_grid(to.x, grid),
                    y: snap_to_grid(to.y, grid),
                };
                let channel = if reliable { Channel::Reliable } else { Channel::BestEffort };
                return Ok(Some((channel, msg)));
            }
            LocalAction::Flip { image } => match self.world.image(image)?.flipped_face() {
                Some(is_front) => WireMessage::FlipImage { image_id: image, is_front },
                None => return Ok(None),
            },
            LocalAction::Rotate { object, direction } => WireMessage::RotateObject { object_id: object, direction },
            LocalAction::AddToHolder { holder, image } => WireMessage::AddImageToHolder { image_id: image, holder_id: holder },
            LocalAction::RemoveFromHolder { holder, image } => {
                WireMessage::RemoveImageFromHolder { image_id: image, holder_id: holder }
            }
            LocalAction::AddToHand { hand, image, index } => WireMessage::AddImageToHand { hand_id: hand, image_id: image, index },
            LocalAction::RemoveFromHand { hand, image } => WireMessage::RemoveImageFromHand { hand_id: hand, image_id: image },
            LocalAction::Shuffle { holder } => match self.shuffled(holder)? {
                Some(msg) => msg,
                None => return Ok(None),
            },
            LocalAction::Roll { dice } => {
                let faces = self.world.dice(dice)?.face_count();
                match self.rng.gen_index(faces) {
                    Some(result) => WireMessage::DiceRolled { dice_id: dice, result },
                    None => return Ok(None),
                }
            }
            LocalAction::PressButton { button } => match self.world.button(button)?.action.clone() {
                ButtonAction::Shuffle { holder } => match self.shuffled(holder)? {
                    Some(msg) => msg,
                    None => return Ok(None),
                },
                ButtonAction::Retrieve { .. } => WireMessage::RetrieveButtonClicked { button_id: button },
                ButtonAction::Sit { .. } => WireMessage::SitButtonClicked {
                    button_id: button,
                    owner: self.config.local_name.clone(),
                },
            },
            LocalAction::MoveCursor { at } => WireMessage::CursorMoved {
                x: snap_to_grid(at.x, grid),
                y: snap_to_grid(at.y, grid),
                name: self.config.local_name.clone(),
                color: self.config.local_color.clone(),
            },
        };
        let channel = msg.default_channel();
        Ok(Some((channel, msg)))
    }

    /// A random permutation of the holder's deck, or `None` for an empty one.
    fn shuffled(&mut self, holder: ObjectId) -> Result<Option<WireMessage>> {
        let mut deck = self.world.holder(holder)?.to_vec();
        if deck.is_empty() {
            return Ok(None);
        }
        self.rng.shuffle(&mut deck);
        Ok(Some(WireMessage::ShuffleHolder { holder_id: holder, deck }))
    }

    /// Queue a message if networking is on.
    pub(crate) fn emit(&mut self, channel: Channel, msg: WireMessage) {
        if self.networking {
            self.outbox.push(channel, msg);
        } else {
            trace!(action = msg.action(), "networking off, not sending");
        }
    }
}
