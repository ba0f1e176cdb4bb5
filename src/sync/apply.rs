//! The shared, non-emitting mutation routine.

use smallvec::SmallVec;
use tracing::{debug, info};

use super::message::WireMessage;
use crate::animation::{MoveCompletion, MoveTask, RollTask, ShuffleTask, Task};
use crate::containers::ContainerKind;
use crate::core::{within_board, ObjectId, Point, Result, TableError};
use crate::objects::ButtonAction;
use crate::snapshot::SnapshotArchive;
use crate::table::Table;

impl Table {
    /// Apply a message to the world without queueing anything.
    pub(crate) fn mutate(&mut self, msg: &WireMessage) -> Result<()> {
        let touched = self.touched_by(msg)?;
        self.with_tasks(|animator, ctx| animator.settle_touching(&touched, ctx))?;

        let grid = self.config.grid_step;
        match msg {
            WireMessage::MoveObject { object_id, x, y } => {
                check_on_board(*x, *y)?;
                self.world.move_to(*object_id, Point::new(*x as f32, *y as f32), grid)?;
                self.world.raise(*object_id)?;
            }
            WireMessage::FlipImage { image_id, is_front } => {
                self.world.image_mut(*image_id)?.set_front(*is_front);
                self.world.enforce_hand_face(*image_id)?;
            }
            WireMessage::RotateObject { object_id, direction } => {
                if !matches!(direction, 1 | -1) {
                    return Err(TableError::InvalidMessage(format!(
                        "rotation direction must be 1 or -1, got {direction}"
                    )));
                }
                self.world.resolve_mut(*object_id)?.rotate(*direction);
            }
            WireMessage::AddImageToHolder { image_id, holder_id } => {
                self.world.add_to_holder(*holder_id, *image_id)?;
            }
            WireMessage::RemoveImageFromHolder { image_id, holder_id } => {
                self.world.remove_from_holder(*holder_id, *image_id)?;
            }
            WireMessage::AddImageToHand { hand_id, image_id, index } => {
                self.world.add_to_hand(*hand_id, *image_id, *index)?;
            }
            WireMessage::RemoveImageFromHand { hand_id, image_id } => {
                self.world.remove_from_hand(*hand_id, *image_id)?;
            }
            WireMessage::ShuffleHolder { holder_id, deck } => {
                self.world.set_holder_order(*holder_id, deck)?;
                for id in deck {
                    self.world.image_mut(*id)?.set_front(false);
                }
                self.start_shuffle(*holder_id)?;
            }
            WireMessage::DiceRolled { dice_id, result } => {
                if !self.world.dice(*dice_id)?.has_face(*result) {
                    return Err(TableError::InvalidMessage(format!("{dice_id} has no face {result}")));
                }
                self.with_tasks(|animator, ctx| {
                    let task = RollTask::start(ctx, *dice_id, *result)?;
                    animator.push(Task::Roll(task));
                    Ok::<_, TableError>(())
                })?;
            }
            WireMessage::ShuffleButtonClicked { button_id } => {
                let ButtonAction::Shuffle { holder } = self.world.button(*button_id)?.action.clone() else {
                    return Err(not_a(*button_id, "shuffle_button"));
                };
                self.start_shuffle(holder)?;
            }
            WireMessage::RetrieveButtonClicked { button_id } => {
                let ButtonAction::Retrieve { holder, images } = self.world.button(*button_id)?.action.clone() else {
                    return Err(not_a(*button_id, "retrieve_button"));
                };
                self.retrieve(holder, &images)?;
            }
            WireMessage::SitButtonClicked { button_id, owner } => {
                let ButtonAction::Sit { hand } = self.world.button(*button_id)?.action.clone() else {
                    return Err(not_a(*button_id, "sit_button"));
                };
                self.world.set_hand_owner(hand, owner)?;
                self.world.resolve_mut(*button_id)?.render = false;
                info!(hand = %hand, owner = %owner, "seat taken");
            }
            WireMessage::CursorMoved { x, y, name, color } => {
                check_on_board(*x, *y)?;
                if *name != self.config.local_name {
                    self.cursors.update(name, color, Point::new(*x as f32, *y as f32), grid);
                }
            }
            WireMessage::Join { name } => {
                info!(peer = %name, "peer joined");
            }
            WireMessage::GetGameState { game_state } => match game_state {
                Some(encoded) => {
                    let archive = SnapshotArchive::from_base64(encoded)?;
                    self.load_snapshot(&archive)?;
                    self.enable_networking();
                    info!("board received, networking enabled");
                }
                None => debug!("ignoring board request, the relay answers those"),
            },
        }
        Ok(())
    }

    /// Every id the message may affect, including those behind a button.
    fn touched_by(&self, msg: &WireMessage) -> Result<SmallVec<[ObjectId; 4]>> {
        let mut ids = msg.touched_objects();
        match msg {
            WireMessage::ShuffleButtonClicked { button_id }
            | WireMessage::RetrieveButtonClicked { button_id }
            | WireMessage::SitButtonClicked { button_id, .. } => {
                ids.extend(self.world.button(*button_id)?.action.references());
            }
            _ => {}
        }
        Ok(ids)
    }

    fn start_shuffle(&mut self, holder: ObjectId) -> Result<()> {
        self.with_tasks(|animator, ctx| {
            let task = ShuffleTask::start(ctx, holder)?;
            animator.push(Task::Shuffle(task));
            Ok(())
        })
    }

    /// Pull every listed image out of hands and fly it back to the holder.
    fn retrieve(&mut self, holder: ObjectId, images: &[ObjectId]) -> Result<()> {
        let target = self.world.rect(holder)?.top_left();
        let ticks = self.config.retrieve_move_ticks;

        for &image in images {
            if let Some(container) = self.world.container_of(image) {
                if container.kind == ContainerKind::Hand {
                    self.world.remove_from_hand(container.id, image)?;
                }
            }
            if self.world.holder(holder)?.contains(image) {
                continue;
            }
            let from = self.world.rect(image)?.top_left();
            let task = MoveTask::new(image, from, target, ticks)
                .on_finish(MoveCompletion::IntoHolder { holder, face_down: true });
            self.animator.push(Task::Move(task));
        }
        Ok(())
    }
}

fn not_a(id: ObjectId, expected: &'static str) -> TableError {
    TableError::InvalidMessage(format!("{id} is not a {expected}"))
}

fn check_on_board(x: i32, y: i32) -> Result<()> {
    if within_board(x) && within_board(y) {
        Ok(())
    } else {
        Err(TableError::InvalidMessage(format!("position ({x}, {y}) is off the board")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rect, TableConfig};
    use crate::objects::{BoardObject, Dice, Image};

    fn table(local: &str) -> Table {
        let mut t = Table::new(TableConfig::new(local).with_seed(11));
        let w = t.world_mut();
        for i in 0..3 {
            w.register(BoardObject::image(ObjectId(i), Rect::new(0, 0, 50, 70), Image::two_sided("f.png", "b.png")))
                .unwrap();
        }
        w.register(BoardObject::holder(ObjectId(10), Rect::new(200, 200, 60, 80))).unwrap();
        w.register(BoardObject::hand(ObjectId(11), Rect::new(0, 400, 400, 100), "")).unwrap();
        w.register(BoardObject::button(
            ObjectId(12),
            Rect::new(300, 0, 40, 20),
            ButtonAction::Retrieve { holder: ObjectId(10), images: vec![ObjectId(0), ObjectId(1), ObjectId(2)] },
        ))
        .unwrap();
        w.register(BoardObject::button(ObjectId(13), Rect::new(350, 0, 40, 20), ButtonAction::Sit { hand: ObjectId(11) }))
            .unwrap();
        let faces = (1..=6).map(|i| format!("d{i}.png")).collect();
        w.register(BoardObject::dice(ObjectId(14), Rect::new(500, 0, 40, 40), Dice::new(faces))).unwrap();
        t
    }

    fn settle(t: &mut Table) {
        for _ in 0..500 {
            if t.animator.is_empty() {
                return;
            }
            t.tick(&[]).unwrap();
        }
    }

    #[test]
    fn test_rotate_rejects_bad_direction() {
        let mut t = table("alice");
        let err = t
            .mutate(&WireMessage::RotateObject { object_id: ObjectId(0), direction: 2 })
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidMessage(_)));
    }

    #[test]
    fn test_roll_rejects_missing_face() {
        let mut t = table("alice");
        let err = t.mutate(&WireMessage::DiceRolled { dice_id: ObjectId(14), result: 6 }).unwrap_err();
        assert!(matches!(err, TableError::InvalidMessage(_)));
        assert!(t.animator.is_empty());
    }

    #[test]
    fn test_retrieve_gathers_face_down() {
        let mut t = table("alice");
        t.world.add_to_hand(ObjectId(11), ObjectId(0), 0).unwrap();
        t.world.add_to_holder(ObjectId(10), ObjectId(1)).unwrap();
        t.world.image_mut(ObjectId(2)).unwrap().set_front(true);

        t.mutate(&WireMessage::RetrieveButtonClicked { button_id: ObjectId(12) }).unwrap();
        // Card 1 is already home; the others fly back
        assert_eq!(t.animator.len(), 2);
        assert!(t.world.hand(ObjectId(11)).unwrap().is_empty());

        settle(&mut t);
        let deck = t.world.holder(ObjectId(10)).unwrap().to_vec();
        assert_eq!(deck, vec![ObjectId(1), ObjectId(0), ObjectId(2)]);
        assert!(!t.world.image(ObjectId(2)).unwrap().is_front);
    }

    #[test]
    fn test_sit_sets_owner_and_hides_button() {
        let mut t = table("bob");
        t.world.add_to_hand(ObjectId(11), ObjectId(0), 0).unwrap();
        assert!(!t.world.image(ObjectId(0)).unwrap().is_front);

        t.mutate(&WireMessage::SitButtonClicked { button_id: ObjectId(13), owner: "bob".into() })
            .unwrap();
        assert_eq!(t.world.hand(ObjectId(11)).unwrap().owner, "bob");
        assert!(!t.world.resolve(ObjectId(13)).unwrap().render);
        assert!(t.world.image(ObjectId(0)).unwrap().is_front);
    }

    #[test]
    fn test_wrong_button_kind() {
        let mut t = table("alice");
        let err = t.mutate(&WireMessage::ShuffleButtonClicked { button_id: ObjectId(13) }).unwrap_err();
        assert!(matches!(err, TableError::InvalidMessage(_)));
    }

    #[test]
    fn test_new_mutation_settles_roll() {
        let mut t = table("alice");
        t.mutate(&WireMessage::DiceRolled { dice_id: ObjectId(14), result: 4 }).unwrap();
        t.tick(&[]).unwrap();

        t.mutate(&WireMessage::MoveObject { object_id: ObjectId(14), x: 100, y: 100 }).unwrap();
        assert!(t.animator.is_empty());
        assert_eq!(t.world.dice(ObjectId(14)).unwrap().current_face, 4);
        assert_eq!(t.world.rect(ObjectId(14)).unwrap(), Rect::new(100, 100, 40, 40));
    }

    #[test]
    fn test_own_cursor_ignored() {
        let mut t = table("alice");
        let mine = WireMessage::CursorMoved { x: 1, y: 1, name: "alice".into(), color: "#fff".into() };
        let theirs = WireMessage::CursorMoved { x: 12, y: 13, name: "bob".into(), color: "#0f0".into() };
        t.mutate(&mine).unwrap();
        t.mutate(&theirs).unwrap();

        assert_eq!(t.cursors.len(), 1);
        let bob = t.cursors.get("bob").unwrap();
        assert_eq!((bob.x, bob.y), (10, 15));
    }
}
