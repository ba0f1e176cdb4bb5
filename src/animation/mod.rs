//! Ongoing tasks: timed Move, Shuffle and Roll animations.
//!
//! Tasks are advanced once per tick by the [`Animator`]. A task reports
//! `is_finished()` once its last tick has run; the animator then calls
//! `finish()` in the same tick, which lands the task on its converged end
//! state (exact end point, restored deck order, chosen die face) and runs
//! its completion.
//!
//! Randomness inside a task (scatter points, jitter frames) is visual only.
//! Every task ends on a value that came over the wire, so replicas agree on
//! the logical outcome even though their animations differ.
//!
//! ## Superseding
//!
//! A new mutation that touches an object owned by an in-flight task first
//! settles the task with [`Animator::settle_touching`]: the task jumps to its
//! end state, then the mutation applies on top of it.

pub mod move_task;
pub mod roll;
pub mod shuffle;

pub use move_task::{MoveCompletion, MoveTask};
pub use roll::RollTask;
pub use shuffle::ShuffleTask;

use tracing::trace;

use crate::core::{ObjectId, Result, TableConfig, TableRng, World};

/// Everything a task may touch while it runs.
pub struct TaskContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut TableRng,
    pub config: &'a TableConfig,
}

/// One ongoing task.
#[derive(Clone, Debug)]
pub enum Task {
    Move(MoveTask),
    Shuffle(ShuffleTask),
    Roll(RollTask),
}

impl Task {
    pub fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<()> {
        match self {
            Task::Move(t) => t.update(ctx),
            Task::Shuffle(t) => t.update(ctx),
            Task::Roll(t) => t.update(ctx),
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self {
            Task::Move(t) => t.is_finished(),
            Task::Shuffle(t) => t.is_finished(),
            Task::Roll(t) => t.is_finished(),
        }
    }

    pub fn finish(self, ctx: &mut TaskContext<'_>) -> Result<()> {
        match self {
            Task::Move(t) => t.finish(ctx),
            Task::Shuffle(t) => t.finish(ctx),
            Task::Roll(t) => t.finish(ctx),
        }
    }

    /// Does this task own `id` (as mover, destination or deck member)?
    #[must_use]
    pub fn touches(&self, id: ObjectId) -> bool {
        match self {
            Task::Move(t) => t.touches(id),
            Task::Shuffle(t) => t.touches(id),
            Task::Roll(t) => t.touches(id),
        }
    }
}

/// The ongoing task list.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    tasks: Vec<Task>,
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Is any task animating `id`?
    #[must_use]
    pub fn is_animating(&self, id: ObjectId) -> bool {
        self.tasks.iter().any(|t| t.touches(id))
    }

    /// Advance every task one tick; finished tasks complete and are removed.
    ///
    /// Returns the number of tasks that finished.
    pub fn tick(&mut self, ctx: &mut TaskContext<'_>) -> Result<usize> {
        for task in &mut self.tasks {
            task.update(ctx)?;
        }
        let (done, live): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks).into_iter().partition(Task::is_finished);
        self.tasks = live;

        let finished = done.len();
        for task in done {
            task.finish(ctx)?;
        }
        if finished > 0 {
            trace!(finished, remaining = self.tasks.len(), "tasks finished");
        }
        Ok(finished)
    }

    /// Jump every task touching any of `ids` to its end state.
    pub fn settle_touching(&mut self, ids: &[ObjectId], ctx: &mut TaskContext<'_>) -> Result<usize> {
        if ids.is_empty() || self.tasks.is_empty() {
            return Ok(0);
        }
        let (hit, keep): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| ids.iter().any(|id| t.touches(*id)));
        self.tasks = keep;

        let settled = hit.len();
        for task in hit {
            task.finish(ctx)?;
        }
        if settled > 0 {
            trace!(settled, "tasks settled by new mutation");
        }
        Ok(settled)
    }

    /// Settle everything (before export or teardown).
    pub fn settle_all(&mut self, ctx: &mut TaskContext<'_>) -> Result<usize> {
        let tasks = std::mem::take(&mut self.tasks);
        let settled = tasks.len();
        for task in tasks {
            task.finish(ctx)?;
        }
        Ok(settled)
    }

    /// Drop every task without settling (the world is being replaced).
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
