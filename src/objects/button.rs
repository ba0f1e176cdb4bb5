//! Table buttons.
//!
//! Buttons are clickable board objects bound to a container. Their actions
//! are replayed on every peer, so each one must reach the same logical end
//! state everywhere:
//!
//! - Shuffle ships the permutation it chose.
//! - Retrieve pulls a fixed list of images back into a holder.
//! - Sit claims a hand for the clicking participant.

use serde::{Deserialize, Serialize};

use crate::core::ObjectId;

/// What a button does when clicked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    /// Shuffle the holder's deck.
    Shuffle { holder: ObjectId },

    /// Return `images` into `holder`, face down.
    Retrieve { holder: ObjectId, images: Vec<ObjectId> },

    /// Make the clicking participant the owner of `hand`.
    Sit { hand: ObjectId },
}

impl ButtonAction {
    /// Manifest type tag.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            ButtonAction::Shuffle { .. } => "shuffle_button",
            ButtonAction::Retrieve { .. } => "retrieve_button",
            ButtonAction::Sit { .. } => "sit_button",
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ButtonAction::Shuffle { .. } => "Shuffle",
            ButtonAction::Retrieve { .. } => "Retrieve",
            ButtonAction::Sit { .. } => "Sit",
        }
    }

    /// Objects this button refers to. All must be loaded before the button.
    #[must_use]
    pub fn references(&self) -> Vec<ObjectId> {
        match self {
            ButtonAction::Shuffle { holder } => vec![*holder],
            ButtonAction::Retrieve { holder, images } => {
                std::iter::once(*holder).chain(images.iter().copied()).collect()
            }
            ButtonAction::Sit { hand } => vec![*hand],
        }
    }
}

/// A button on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub action: ButtonAction,
}

impl Button {
    pub fn new(action: ButtonAction) -> Self {
        Self { action }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.action.label()
    }
}
