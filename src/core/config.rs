//! Table configuration.
//!
//! `TableConfig` carries the local identity plus the constants that every
//! replica must agree on (grid step) and the ones that only shape local
//! behavior (animation lengths, inbound batch size). It derives `serde` so the
//! embedding application can load it from whatever format it uses.

use serde::{Deserialize, Serialize};

/// Configuration for one client's table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Local participant name. Decides hand ownership and labels cursor messages.
    pub local_name: String,

    /// Local cursor color as `#rrggbb`.
    pub local_color: String,

    /// Pixel-perfect quantum for positions written by moves.
    ///
    /// Must be identical on every replica.
    pub grid_step: i32,

    /// Maximum inbound messages applied per tick.
    pub inbound_batch: usize,

    /// Horizontal gap between cards laid out in a hand.
    pub hand_margin: i32,

    /// Cards lifted off a holder by the shuffle animation.
    pub shuffle_lift_count: usize,

    /// Ticks per shuffle animation phase.
    pub shuffle_phase_ticks: u32,

    /// Scatter phases before the lifted cards return (the last phase returns them).
    pub shuffle_phases: u32,

    /// Length of a dice roll animation in ticks.
    pub roll_ticks: u32,

    /// A rolling die jitters every this many ticks.
    pub roll_jitter_every: u32,

    /// Length of the move a retrieved card makes back to its holder.
    pub retrieve_move_ticks: u32,

    /// Return replay failures to the caller instead of logging and dropping.
    pub strict_replay: bool,

    /// Seed for local randomness (die results, permutations, jitter).
    pub seed: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            local_name: String::new(),
            local_color: "#000000".to_string(),
            grid_step: 5,
            inbound_batch: 8,
            hand_margin: 10,
            shuffle_lift_count: 10,
            shuffle_phase_ticks: 10,
            shuffle_phases: 5,
            roll_ticks: 50,
            roll_jitter_every: 3,
            retrieve_move_ticks: 45,
            strict_replay: false,
            seed: 0,
        }
    }
}

impl TableConfig {
    /// Create a configuration for a named participant.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            ..Self::default()
        }
    }

    /// Set the cursor color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.local_color = color.into();
        self
    }

    /// Set the grid step.
    #[must_use]
    pub fn with_grid_step(mut self, step: i32) -> Self {
        self.grid_step = step.max(1);
        self
    }

    /// Set the per-tick inbound batch.
    #[must_use]
    pub fn with_inbound_batch(mut self, batch: usize) -> Self {
        self.inbound_batch = batch.max(1);
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fail loudly on bad remote input (development mode).
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict_replay = true;
        self
    }

    /// Set the roll animation length.
    #[must_use]
    pub fn with_roll_ticks(mut self, ticks: u32) -> Self {
        self.roll_ticks = ticks.max(1);
        self
    }

    /// Set shuffle animation shape.
    #[must_use]
    pub fn with_shuffle(mut self, lift_count: usize, phases: u32, phase_ticks: u32) -> Self {
        self.shuffle_lift_count = lift_count;
        self.shuffle_phases = phases.max(1);
        self.shuffle_phase_ticks = phase_ticks.max(1);
        self
    }

    /// Total ticks a shuffle animation runs.
    #[must_use]
    pub fn shuffle_total_ticks(&self) -> u32 {
        self.shuffle_phases * self.shuffle_phase_ticks
    }
}
