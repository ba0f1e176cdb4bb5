//! Wire messages.
//!
//! Every message is a JSON object whose `action` field selects the variant;
//! the other fields are its payload:
//!
//! ```
//! use rust_tabletop::core::ObjectId;
//! use rust_tabletop::sync::WireMessage;
//!
//! let msg = WireMessage::FlipImage { image_id: ObjectId(4), is_front: true };
//! let json = String::from_utf8(msg.encode().unwrap()).unwrap();
//! assert_eq!(json, r#"{"action":"flip_image","image_id":4,"is_front":true}"#);
//! assert_eq!(WireMessage::decode(json.as_bytes()).unwrap(), msg);
//! ```
//!
//! Payloads carry absolute state (positions, faces, full deck orders) rather
//! than deltas, so applying a message twice or out of order mostly lands on
//! the same board.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ObjectId, Result};

/// Transport channel a message travels on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Must-not-lose events: membership, flips, rotations, shuffles, rolls.
    Reliable,
    /// Loss-tolerant, high-frequency events: cursors and drag steps.
    BestEffort,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WireMessage {
    MoveObject {
        object_id: ObjectId,
        x: i32,
        y: i32,
    },
    FlipImage {
        image_id: ObjectId,
        is_front: bool,
    },
    RotateObject {
        object_id: ObjectId,
        direction: i8,
    },
    AddImageToHolder {
        image_id: ObjectId,
        holder_id: ObjectId,
    },
    RemoveImageFromHolder {
        image_id: ObjectId,
        holder_id: ObjectId,
    },
    AddImageToHand {
        hand_id: ObjectId,
        image_id: ObjectId,
        index: usize,
    },
    RemoveImageFromHand {
        hand_id: ObjectId,
        image_id: ObjectId,
    },
    /// Final deck order after a shuffle, bottom to top.
    ShuffleHolder {
        holder_id: ObjectId,
        deck: Vec<ObjectId>,
    },
    DiceRolled {
        dice_id: ObjectId,
        result: usize,
    },
    ShuffleButtonClicked {
        button_id: ObjectId,
    },
    RetrieveButtonClicked {
        button_id: ObjectId,
    },
    SitButtonClicked {
        button_id: ObjectId,
        owner: String,
    },
    CursorMoved {
        x: i32,
        y: i32,
        name: String,
        color: String,
    },
    Join {
        name: String,
    },
    /// Request (no payload) or response (base64 snapshot archive).
    GetGameState {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_state: Option<String>,
    },
}

impl WireMessage {
    /// The `action` tag.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            WireMessage::MoveObject { .. } => "move_object",
            WireMessage::FlipImage { .. } => "flip_image",
            WireMessage::RotateObject { .. } => "rotate_object",
            WireMessage::AddImageToHolder { .. } => "add_image_to_holder",
            WireMessage::RemoveImageFromHolder { .. } => "remove_image_from_holder",
            WireMessage::AddImageToHand { .. } => "add_image_to_hand",
            WireMessage::RemoveImageFromHand { .. } => "remove_image_from_hand",
            WireMessage::ShuffleHolder { .. } => "shuffle_holder",
            WireMessage::DiceRolled { .. } => "dice_rolled",
            WireMessage::ShuffleButtonClicked { .. } => "shuffle_button_clicked",
            WireMessage::RetrieveButtonClicked { .. } => "retrieve_button_clicked",
            WireMessage::SitButtonClicked { .. } => "sit_button_clicked",
            WireMessage::CursorMoved { .. } => "cursor_moved",
            WireMessage::Join { .. } => "join",
            WireMessage::GetGameState { .. } => "get_game_state",
        }
    }

    /// Channel the message normally travels on.
    ///
    /// A released drag's final `move_object` is the exception: the sender
    /// puts it on the reliable channel explicitly.
    #[must_use]
    pub fn default_channel(&self) -> Channel {
        match self {
            WireMessage::MoveObject { .. } | WireMessage::CursorMoved { .. } => Channel::BestEffort,
            _ => Channel::Reliable,
        }
    }

    /// Ids named directly by the payload.
    ///
    /// Button messages name only the button; the objects a button acts on
    /// are looked up when the message is applied.
    #[must_use]
    pub fn touched_objects(&self) -> SmallVec<[ObjectId; 4]> {
        let mut ids = SmallVec::new();
        match self {
            WireMessage::MoveObject { object_id, .. } | WireMessage::RotateObject { object_id, .. } => {
                ids.push(*object_id);
            }
            WireMessage::FlipImage { image_id, .. } => ids.push(*image_id),
            WireMessage::AddImageToHolder { image_id, holder_id }
            | WireMessage::RemoveImageFromHolder { image_id, holder_id } => {
                ids.push(*image_id);
                ids.push(*holder_id);
            }
            WireMessage::AddImageToHand { hand_id, image_id, .. }
            | WireMessage::RemoveImageFromHand { hand_id, image_id } => {
                ids.push(*image_id);
                ids.push(*hand_id);
            }
            WireMessage::ShuffleHolder { holder_id, deck } => {
                ids.push(*holder_id);
                ids.extend(deck.iter().copied());
            }
            WireMessage::DiceRolled { dice_id, .. } => ids.push(*dice_id),
            WireMessage::ShuffleButtonClicked { button_id }
            | WireMessage::RetrieveButtonClicked { button_id }
            | WireMessage::SitButtonClicked { button_id, .. } => ids.push(*button_id),
            WireMessage::CursorMoved { .. } | WireMessage::Join { .. } | WireMessage::GetGameState { .. } => {}
        }
        ids
    }

    /// Serialize to the JSON wire form.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse the JSON wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
