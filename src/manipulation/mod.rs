//! Manipulation engine: pointer and key intents to local mutations.
//!
//! ```text
//! Idle --pointer down on object / selection--> Holding --pointer up--> Idle
//! ```
//!
//! While holding, the first pointer movement picks the object up (a holder
//! hands over its top card, a hand the card under the pointer) and every
//! movement after that drags it. Releasing after a drag drops it; releasing
//! without movement clicks it. What pick-up, click and drop mean for each
//! kind lives in [`behaviour`].
//!
//! Every change goes through `Table::apply_local`, so the manipulation
//! engine never touches the wire directly. Hit tests use world rects only.

mod behaviour;

use tracing::trace;

use crate::core::{ObjectId, Point, Result};
use crate::selection::SelectionPhase;
use crate::sync::LocalAction;
use crate::table::Table;

use behaviour::behaviour_for;

/// Keyboard modifiers held during an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Overrides `draggable` / `rotatable`; drags a holder itself.
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true };
}

/// Keys the engine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Held to draw a selection band.
    Select,
    RotateLeft,
    RotateRight,
}

/// Raw input, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { at: Point, modifiers: Modifiers },
    PointerMove { at: Point, modifiers: Modifiers },
    PointerUp { at: Point, modifiers: Modifiers },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
}

impl InputEvent {
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        InputEvent::PointerDown { at: Point::new(x, y), modifiers: Modifiers::NONE }
    }

    #[must_use]
    pub fn move_to(x: f32, y: f32) -> Self {
        InputEvent::PointerMove { at: Point::new(x, y), modifiers: Modifiers::NONE }
    }

    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        InputEvent::PointerUp { at: Point::new(x, y), modifiers: Modifiers::NONE }
    }

    #[must_use]
    pub fn key_down(key: Key) -> Self {
        InputEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    #[must_use]
    pub fn key_up(key: Key) -> Self {
        InputEvent::KeyUp { key, modifiers: Modifiers::NONE }
    }

    /// Same event with ctrl held.
    #[must_use]
    pub fn with_ctrl(self) -> Self {
        match self {
            InputEvent::PointerDown { at, .. } => InputEvent::PointerDown { at, modifiers: Modifiers::CTRL },
            InputEvent::PointerMove { at, .. } => InputEvent::PointerMove { at, modifiers: Modifiers::CTRL },
            InputEvent::PointerUp { at, .. } => InputEvent::PointerUp { at, modifiers: Modifiers::CTRL },
            InputEvent::KeyDown { key, .. } => InputEvent::KeyDown { key, modifiers: Modifiers::CTRL },
            InputEvent::KeyUp { key, .. } => InputEvent::KeyUp { key, modifiers: Modifiers::CTRL },
        }
    }
}

/// What the pointer pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeldTarget {
    Object(ObjectId),
    Selection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManipulationState {
    #[default]
    Idle,
    Holding {
        pressed: HeldTarget,
        /// Object following the pointer, once picked up.
        dragging: Option<ObjectId>,
        moved: bool,
    },
}

/// Per-client manipulation state.
#[derive(Clone, Debug, Default)]
pub struct Manipulator {
    state: ManipulationState,
    pointer: Point,
    /// Where the current hold began. Pick-up hit tests use it.
    pressed_at: Point,
}

impl Manipulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ManipulationState {
        self.state
    }

    /// Last known pointer position.
    #[must_use]
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == ManipulationState::Idle
    }

    /// The object currently following the pointer.
    #[must_use]
    pub fn dragging(&self) -> Option<ObjectId> {
        match self.state {
            ManipulationState::Holding { dragging, .. } => dragging,
            ManipulationState::Idle => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ManipulationState::Idle;
    }
}

impl Table {
    /// Feed one input event through the manipulation engine.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::PointerDown { at, .. } => self.pointer_down(at),
            InputEvent::PointerMove { at, modifiers } => self.pointer_move(at, modifiers),
            InputEvent::PointerUp { at, .. } => self.pointer_up(at),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, modifiers),
            InputEvent::KeyUp { key, .. } => {
                if key == Key::Select {
                    self.selection.finish(&self.world, &self.animator);
                }
                Ok(())
            }
        }
    }

    fn pointer_down(&mut self, at: Point) -> Result<()> {
        self.manipulator.pointer = at;
        if !self.manipulator.is_idle() {
            return Ok(());
        }
        self.manipulator.pressed_at = at;

        if self.selection.grabs(&self.world, at) {
            self.manipulator.state = ManipulationState::Holding {
                pressed: HeldTarget::Selection,
                dragging: None,
                moved: false,
            };
            return Ok(());
        }
        if self.selection.is_selected() {
            self.selection.reset();
        }

        let animator = &self.animator;
        let Some(id) = self
            .world
            .topmost_at(at, |o| o.clickable && !animator.is_animating(o.id))
        else {
            return Ok(());
        };
        trace!(object = %id, "pressed");
        self.manipulator.state = ManipulationState::Holding {
            pressed: HeldTarget::Object(id),
            dragging: None,
            moved: false,
        };
        Ok(())
    }

    fn pointer_move(&mut self, at: Point, modifiers: Modifiers) -> Result<()> {
        self.manipulator.pointer = at;
        self.apply_local(LocalAction::MoveCursor { at })?;

        match self.manipulator.state {
            ManipulationState::Idle => {
                self.selection.track(at);
                self.hover(at);
            }
            ManipulationState::Holding { pressed: HeldTarget::Selection, .. } => {
                self.manipulator.state = ManipulationState::Holding {
                    pressed: HeldTarget::Selection,
                    dragging: None,
                    moved: true,
                };
                let targets = self.selection.group_targets(&self.world, at, self.config.grid_step);
                for (object, to) in targets {
                    self.apply_local(LocalAction::Move { object, to, reliable: false })?;
                }
            }
            ManipulationState::Holding { pressed: HeldTarget::Object(id), dragging, moved } => {
                let dragging = if moved {
                    dragging
                } else {
                    let behaviour = behaviour_for(&self.world.resolve(id)?.kind);
                    let picked = behaviour.on_pick_up(self, id, self.manipulator.pressed_at, modifiers)?;
                    if let Some(picked) = picked {
                        self.world.raise(picked)?;
                        trace!(object = %picked, "picked up");
                    }
                    picked
                };
                self.manipulator.state = ManipulationState::Holding {
                    pressed: HeldTarget::Object(id),
                    dragging,
                    moved: true,
                };

                if let Some(object) = dragging {
                    let rect = self.world.rect(object)?;
                    let to = at.offset(-(rect.width as f32) / 2.0, -(rect.height as f32) / 2.0);
                    self.apply_local(LocalAction::Move { object, to, reliable: false })?;
                    self.focus_drop_targets(object)?;
                }
            }
        }
        Ok(())
    }

    fn pointer_up(&mut self, at: Point) -> Result<()> {
        self.manipulator.pointer = at;
        let state = std::mem::take(&mut self.manipulator.state);

        match state {
            ManipulationState::Idle => {}
            ManipulationState::Holding { pressed: HeldTarget::Selection, moved, .. } => {
                let members = self.selection.members().to_vec();
                if moved {
                    for object in members {
                        let to = self.world.rect(object)?.top_left();
                        self.apply_local(LocalAction::Move { object, to, reliable: true })?;
                    }
                } else {
                    for object in members {
                        let behaviour = behaviour_for(&self.world.resolve(object)?.kind);
                        behaviour.on_click(self, object)?;
                    }
                    self.selection.reset();
                }
            }
            ManipulationState::Holding { pressed: HeldTarget::Object(id), dragging, moved } => {
                if !moved {
                    let behaviour = behaviour_for(&self.world.resolve(id)?.kind);
                    behaviour.on_click(self, id)?;
                } else if let Some(object) = dragging {
                    let behaviour = behaviour_for(&self.world.resolve(object)?.kind);
                    behaviour.on_drop(self, object, at)?;
                }
            }
        }
        self.world.set_focus_where(|_| false);
        Ok(())
    }

    fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Result<()> {
        match key {
            Key::Select => {
                if self.manipulator.is_idle() {
                    self.selection.start(self.manipulator.pointer);
                }
                Ok(())
            }
            Key::RotateLeft => self.rotate_under_pointer(-1, modifiers),
            Key::RotateRight => self.rotate_under_pointer(1, modifiers),
        }
    }

    /// Rotate the selection, the dragged object, or the topmost rotatable
    /// object under the pointer.
    fn rotate_under_pointer(&mut self, direction: i8, modifiers: Modifiers) -> Result<()> {
        let allowed = |rotatable: bool| rotatable || modifiers.ctrl;

        let targets: Vec<ObjectId> = if self.selection.is_selected() {
            self.selection.members().to_vec()
        } else if let Some(object) = self.manipulator.dragging() {
            vec![object]
        } else {
            let animator = &self.animator;
            self.world
                .topmost_at(self.manipulator.pointer, |o| allowed(o.rotatable) && !animator.is_animating(o.id))
                .into_iter()
                .collect()
        };

        for object in targets {
            if allowed(self.world.resolve(object)?.rotatable) {
                self.apply_local(LocalAction::Rotate { object, direction })?;
            }
        }
        Ok(())
    }

    /// Highlight the topmost clickable object under an idle pointer.
    fn hover(&mut self, at: Point) {
        if matches!(self.selection.phase(), SelectionPhase::Selecting { .. }) {
            return;
        }
        let top = self.world.topmost_at(at, |o| o.clickable);
        self.world.set_focus_where(|o| Some(o.id) == top);
    }

    /// Highlight containers the dragged object would drop into.
    fn focus_drop_targets(&mut self, object: ObjectId) -> Result<()> {
        let rect = self.world.rect(object)?;
        self.world
            .set_focus_where(|o| o.render && o.id != object && o.kind.is_container() && o.rect.intersects(&rect));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rect, TableConfig};
    use crate::objects::{BoardObject, Image};

    fn table() -> Table {
        let mut t = Table::new(TableConfig::new("alice"));
        let w = t.world_mut();
        w.register(BoardObject::image(ObjectId(0), Rect::new(0, 0, 50, 70), Image::two_sided("f.png", "b.png")))
            .unwrap();
        w.register(BoardObject::holder(ObjectId(1), Rect::new(300, 300, 60, 80))).unwrap();
        t
    }

    #[test]
    fn test_press_without_move_is_click() {
        let mut t = table();
        t.handle_input(InputEvent::down(10.0, 10.0)).unwrap();
        assert!(matches!(
            t.manipulator().state(),
            ManipulationState::Holding { pressed: HeldTarget::Object(ObjectId(0)), moved: false, .. }
        ));
        t.handle_input(InputEvent::up(10.0, 10.0)).unwrap();

        assert!(t.manipulator().is_idle());
        assert!(t.world().image(ObjectId(0)).unwrap().is_front);
    }

    #[test]
    fn test_press_on_empty_board_stays_idle() {
        let mut t = table();
        t.handle_input(InputEvent::down(900.0, 900.0)).unwrap();
        assert!(t.manipulator().is_idle());
    }

    #[test]
    fn test_drag_centers_and_snaps() {
        let mut t = table();
        t.handle_input(InputEvent::down(10.0, 10.0)).unwrap();
        t.handle_input(InputEvent::move_to(127.0, 133.0)).unwrap();
        assert_eq!(t.manipulator().dragging(), Some(ObjectId(0)));
        // Corner (102, 98) snaps to (100, 100)
        assert_eq!(t.world().rect(ObjectId(0)).unwrap(), Rect::new(100, 100, 50, 70));

        t.handle_input(InputEvent::up(127.0, 133.0)).unwrap();
        assert!(!t.world().image(ObjectId(0)).unwrap().is_front);
    }

    #[test]
    fn test_drag_onto_holder_stacks() {
        let mut t = table();
        t.handle_input(InputEvent::down(10.0, 10.0)).unwrap();
        t.handle_input(InputEvent::move_to(330.0, 340.0)).unwrap();
        assert!(t.world().resolve(ObjectId(1)).unwrap().focused);
        t.handle_input(InputEvent::up(330.0, 340.0)).unwrap();

        assert_eq!(t.world().holder(ObjectId(1)).unwrap().to_vec(), vec![ObjectId(0)]);
        assert!(!t.world().resolve(ObjectId(1)).unwrap().focused);
    }

    #[test]
    fn test_hover_focus_when_idle() {
        let mut t = table();
        t.handle_input(InputEvent::move_to(10.0, 10.0)).unwrap();
        assert!(t.world().resolve(ObjectId(0)).unwrap().focused);
        t.handle_input(InputEvent::move_to(500.0, 10.0)).unwrap();
        assert!(!t.world().resolve(ObjectId(0)).unwrap().focused);
    }

    #[test]
    fn test_rotate_key_under_pointer() {
        let mut t = table();
        t.handle_input(InputEvent::move_to(10.0, 10.0)).unwrap();
        t.handle_input(InputEvent::key_down(Key::RotateRight)).unwrap();
        let obj = t.world().resolve(ObjectId(0)).unwrap();
        assert_eq!(obj.rotation.degrees(), 90);
        assert_eq!(obj.rect, Rect::new(0, 0, 70, 50));

        // Holders are not rotatable unless ctrl is held
        t.handle_input(InputEvent::move_to(310.0, 310.0)).unwrap();
        t.handle_input(InputEvent::key_down(Key::RotateLeft)).unwrap();
        assert_eq!(t.world().resolve(ObjectId(1)).unwrap().rotation.degrees(), 0);
        t.handle_input(InputEvent::key_down(Key::RotateLeft).with_ctrl()).unwrap();
        assert_eq!(t.world().resolve(ObjectId(1)).unwrap().rotation.degrees(), 270);
    }
}
