//! Rubber-band selection and group transform.
//!
//! A `Selection` is a local convenience for manipulating several objects at
//! once. It is never replicated: a group drag or click turns into one
//! ordinary per-object mutation per member.
//!
//! ```text
//! None --select key down--> Selecting --select key up--> Selected
//!   ^                                        |               |
//!   +------------- empty rect ---------------+               |
//!   +-------------- click elsewhere / group click -----------+
//! ```

use smallvec::SmallVec;
use tracing::debug;

use crate::animation::Animator;
use crate::core::{snap_to_grid, ObjectId, Point, Rect, World};

/// Where the selection state machine is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SelectionPhase {
    #[default]
    None,
    /// Rubber band from `anchor` to `current`.
    Selecting { anchor: Point, current: Point },
    Selected,
}

/// Transient multi-object grouping.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    phase: SelectionPhase,
    members: SmallVec<[ObjectId; 8]>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    #[must_use]
    pub fn members(&self) -> &[ObjectId] {
        &self.members
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.phase == SelectionPhase::Selected
    }

    /// Begin a rubber band at the pointer. Any previous group is dropped.
    pub fn start(&mut self, at: Point) {
        self.members.clear();
        self.phase = SelectionPhase::Selecting { anchor: at, current: at };
    }

    /// Follow the pointer while selecting.
    pub fn track(&mut self, at: Point) {
        if let SelectionPhase::Selecting { current, .. } = &mut self.phase {
            *current = at;
        }
    }

    /// The rubber band while selecting.
    #[must_use]
    pub fn band(&self) -> Option<Rect> {
        match self.phase {
            SelectionPhase::Selecting { anchor, current } => Some(Rect::from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Close the band and capture every draggable, visible object it touches
    /// that no task is animating.
    ///
    /// An empty capture resets to `None`. Returns the member count.
    pub fn finish(&mut self, world: &World, animator: &Animator) -> usize {
        let Some(band) = self.band() else {
            return 0;
        };
        self.members = world
            .rendered()
            .filter(|o| o.draggable && o.rect.intersects(&band) && !animator.is_animating(o.id))
            .map(|o| o.id)
            .collect();

        if self.members.is_empty() {
            self.phase = SelectionPhase::None;
        } else {
            debug!(members = self.members.len(), "selection captured");
            self.phase = SelectionPhase::Selected;
        }
        self.members.len()
    }

    pub fn reset(&mut self) {
        self.members.clear();
        self.phase = SelectionPhase::None;
    }

    /// Forget members that left the board (e.g. were stacked by a peer).
    pub fn prune(&mut self, world: &World) {
        if !self.is_selected() {
            return;
        }
        self.members
            .retain(|id| world.resolve(*id).map(|o| o.render).unwrap_or(false));
        if self.members.is_empty() {
            self.reset();
        }
    }

    /// Union of every member rect.
    #[must_use]
    pub fn bounding_box(&self, world: &World) -> Option<Rect> {
        self.members
            .iter()
            .filter_map(|id| world.rect(*id).ok())
            .reduce(|acc, r| acc.union(&r))
    }

    /// Is `at` inside the group's bounding box?
    #[must_use]
    pub fn grabs(&self, world: &World, at: Point) -> bool {
        self.is_selected() && self.bounding_box(world).is_some_and(|b| b.contains(at))
    }

    /// Snapped top-left targets that put the group's center on `pointer`.
    ///
    /// Every member moves by the same delta and is snapped on its own.
    #[must_use]
    pub fn group_targets(&self, world: &World, pointer: Point, grid_step: i32) -> SmallVec<[(ObjectId, Point); 8]> {
        let Some(bbox) = self.bounding_box(world) else {
            return SmallVec::new();
        };
        let center = bbox.center();
        let (dx, dy) = (pointer.x - center.x, pointer.y - center.y);

        self.members
            .iter()
            .filter_map(|&id| {
                let rect = world.rect(id).ok()?;
                let x = snap_to_grid(rect.x as f32 + dx, grid_step);
                let y = snap_to_grid(rect.y as f32 + dy, grid_step);
                Some((id, Point::new(x as f32, y as f32)))
            })
            .collect()
    }
}
