//! Linear move between two points.

use crate::core::{ObjectId, Point, Result};

use super::TaskContext;

/// What happens when a move lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveCompletion {
    None,
    /// Put the object into a holder, optionally face down first.
    IntoHolder { holder: ObjectId, face_down: bool },
}

/// Moves an object's top-left corner from `from` to `to` over `ticks` ticks.
#[derive(Clone, Debug)]
pub struct MoveTask {
    object: ObjectId,
    from: Point,
    to: Point,
    ticks: u32,
    elapsed: u32,
    completion: MoveCompletion,
}

impl MoveTask {
    pub fn new(object: ObjectId, from: Point, to: Point, ticks: u32) -> Self {
        Self {
            object,
            from,
            to,
            ticks: ticks.max(1),
            elapsed: 0,
            completion: MoveCompletion::None,
        }
    }

    #[must_use]
    pub fn on_finish(mut self, completion: MoveCompletion) -> Self {
        self.completion = completion;
        self
    }

    #[must_use]
    pub fn object(&self) -> ObjectId {
        self.object
    }

    #[must_use]
    pub fn target(&self) -> Point {
        self.to
    }

    pub fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        self.elapsed += 1;
        let t = self.elapsed as f32 / self.ticks as f32;
        let at = self.from.lerp(self.to, t);
        let obj = ctx.world.resolve_mut(self.object)?;
        obj.rect = obj.rect.moved_to(at.x.round() as i32, at.y.round() as i32);
        Ok(())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.ticks
    }

    /// Land exactly on the end point and run the completion.
    pub fn finish(self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let obj = ctx.world.resolve_mut(self.object)?;
        obj.rect = obj.rect.moved_to(self.to.x.round() as i32, self.to.y.round() as i32);

        match self.completion {
            MoveCompletion::None => {}
            MoveCompletion::IntoHolder { holder, face_down } => {
                if face_down {
                    ctx.world.image_mut(self.object)?.set_front(false);
                }
                ctx.world.add_to_holder(holder, self.object)?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn touches(&self, id: ObjectId) -> bool {
        self.object == id || matches!(self.completion, MoveCompletion::IntoHolder { holder, .. } if holder == id)
    }
}
