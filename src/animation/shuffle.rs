//! Shuffle animation.
//!
//! Up to `shuffle_lift_count` cards from the top of a holder are shown on the
//! board, scattered around it for a few phases, then gathered back and
//! hidden again. The scatter points are random and differ per replica.
//!
//! Lifting is visual only: the cards stay members of the holder throughout,
//! and the deck order at the end is the order the holder had when the task
//! started (the sync layer has already set it from `shuffle_holder`).

use tracing::trace;

use crate::core::{ObjectId, Point, Result};

use super::move_task::MoveTask;
use super::TaskContext;

#[derive(Clone, Debug)]
pub struct ShuffleTask {
    holder: ObjectId,
    /// Deck order restored on finish, bottom to top.
    final_order: Vec<ObjectId>,
    /// Cards shown on the board while the task runs, top first.
    lifted: Vec<ObjectId>,
    origin: Point,
    phase: u32,
    phases: u32,
    phase_ticks: u32,
    phase_elapsed: u32,
    moves: Vec<MoveTask>,
}

impl ShuffleTask {
    /// Lift the top cards of `holder` and start scattering them.
    pub fn start(ctx: &mut TaskContext<'_>, holder: ObjectId) -> Result<Self> {
        let final_order = ctx.world.holder(holder)?.to_vec();
        let origin = ctx.world.rect(holder)?.top_left();
        let lifted: Vec<ObjectId> = final_order
            .iter()
            .rev()
            .take(ctx.config.shuffle_lift_count)
            .copied()
            .collect();

        for &id in &lifted {
            let obj = ctx.world.resolve_mut(id)?;
            obj.rect = obj.rect.moved_to(origin.x as i32, origin.y as i32);
            obj.render = true;
            ctx.world.raise(id)?;
        }

        let phases = ctx.config.shuffle_phases.max(1);
        let mut task = Self {
            holder,
            final_order,
            lifted,
            origin,
            phase: 0,
            phases,
            phase_ticks: ctx.config.shuffle_phase_ticks.max(1),
            phase_elapsed: 0,
            moves: Vec::new(),
        };
        if task.lifted.is_empty() {
            task.phase = phases;
        } else {
            task.begin_phase(ctx)?;
        }
        Ok(task)
    }

    #[must_use]
    pub fn holder(&self) -> ObjectId {
        self.holder
    }

    #[must_use]
    pub fn lifted(&self) -> &[ObjectId] {
        &self.lifted
    }

    /// Scatter on every phase but the last, which gathers the cards back.
    fn begin_phase(&mut self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let holder_rect = ctx.world.rect(self.holder)?;
        let center = holder_rect.center();
        let gather = self.phase + 1 >= self.phases;

        self.moves.clear();
        for &id in &self.lifted {
            let from = ctx.world.rect(id)?.top_left();
            let to = if gather {
                self.origin
            } else {
                let w = holder_rect.width as f32;
                let h = holder_rect.height as f32;
                let dx = ctx.rng.gen_range((-0.9 * w) as i32..(0.2 * w) as i32);
                let dy = ctx.rng.gen_range((-0.9 * h) as i32..(0.2 * h) as i32);
                center.offset(dx as f32, dy as f32)
            };
            self.moves.push(MoveTask::new(id, from, to, self.phase_ticks));
        }
        trace!(holder = %self.holder, phase = self.phase, gather, "shuffle phase");
        Ok(())
    }

    pub fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        for m in &mut self.moves {
            m.update(ctx)?;
        }
        self.phase_elapsed += 1;
        if self.phase_elapsed < self.phase_ticks {
            return Ok(());
        }

        for m in self.moves.drain(..) {
            m.finish(ctx)?;
        }
        self.phase += 1;
        self.phase_elapsed = 0;
        if !self.is_finished() {
            self.begin_phase(ctx)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase >= self.phases
    }

    /// Hide every lifted card again and restore the deck order.
    pub fn finish(self, ctx: &mut TaskContext<'_>) -> Result<()> {
        for &id in &self.lifted {
            let obj = ctx.world.resolve_mut(id)?;
            obj.rect = obj.rect.moved_to(self.origin.x as i32, self.origin.y as i32);
        }
        ctx.world.set_holder_order(self.holder, &self.final_order)
    }

    #[must_use]
    pub fn touches(&self, id: ObjectId) -> bool {
        self.holder == id || self.final_order.contains(&id)
    }
}
