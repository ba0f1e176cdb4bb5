//! Dice roll: random face jitter that always ends on the broadcast result.

use tracing::trace;

use crate::core::{ObjectId, Point, Result};

use super::TaskContext;

#[derive(Clone, Debug)]
pub struct RollTask {
    dice: ObjectId,
    result: usize,
    /// Where the die sat when the roll started. It returns there.
    rest: Point,
    ticks: u32,
    jitter_every: u32,
    elapsed: u32,
}

impl RollTask {
    /// Start rolling `dice` towards face `result`.
    pub fn start(ctx: &mut TaskContext<'_>, dice: ObjectId, result: usize) -> Result<Self> {
        ctx.world.dice(dice)?;
        let rest = ctx.world.rect(dice)?.top_left();
        Ok(Self {
            dice,
            result,
            rest,
            ticks: ctx.config.roll_ticks.max(1),
            jitter_every: ctx.config.roll_jitter_every.max(1),
            elapsed: 0,
        })
    }

    #[must_use]
    pub fn result(&self) -> usize {
        self.result
    }

    pub fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        self.elapsed += 1;
        if self.elapsed % self.jitter_every != 0 {
            return Ok(());
        }

        let faces = ctx.world.dice(self.dice)?.face_count();
        if let Some(face) = ctx.rng.gen_index(faces) {
            ctx.world.dice_mut(self.dice)?.set_face(face);
        }

        let rect = ctx.world.rect(self.dice)?;
        let reach = rect.width / 10;
        let dx = ctx.rng.gen_inclusive(-reach, reach);
        let dy = ctx.rng.gen_inclusive(-reach, reach);
        let obj = ctx.world.resolve_mut(self.dice)?;
        obj.rect = obj.rect.moved_to(self.rest.x as i32 + dx, self.rest.y as i32 + dy);
        trace!(dice = %self.dice, tick = self.elapsed, "roll jitter");
        Ok(())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.ticks
    }

    /// Back to the resting position, showing the chosen face.
    pub fn finish(self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let obj = ctx.world.resolve_mut(self.dice)?;
        obj.rect = obj.rect.moved_to(self.rest.x as i32, self.rest.y as i32);
        ctx.world.dice_mut(self.dice)?.set_face(self.result);
        Ok(())
    }

    #[must_use]
    pub fn touches(&self, id: ObjectId) -> bool {
        self.dice == id
    }
}
