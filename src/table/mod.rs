//! The table session: one client's replica plus everything that drives it.
//!
//! `Table` owns the world, the ongoing tasks, the selection and manipulation
//! state, remote cursors and both message queues. It is driven by a single
//! fixed-rate [`Table::tick`], which runs, in order:
//!
//! 1. input events (local manipulation, applied optimistically)
//! 2. animation tasks
//! 3. (rendering, done by the embedder between ticks)
//! 4. a bounded batch of inbound messages
//!
//! Nothing here blocks. The only cross-thread handoff is the inbox, fed by
//! an [`InboxSender`] that network I/O may own.
//!
//! ## Usage
//!
//! ```
//! use rust_tabletop::core::{ObjectId, Rect, TableConfig};
//! use rust_tabletop::objects::{BoardObject, Image};
//! use rust_tabletop::sync::LocalAction;
//! use rust_tabletop::table::Table;
//!
//! let mut table = Table::new(TableConfig::new("alice"));
//! table
//!     .world_mut()
//!     .register(BoardObject::image(ObjectId(0), Rect::new(0, 0, 50, 70), Image::two_sided("f.png", "b.png")))
//!     .unwrap();
//! table.enable_networking();
//!
//! table.apply_local(LocalAction::Flip { image: ObjectId(0) }).unwrap();
//! assert!(table.world().image(ObjectId(0)).unwrap().is_front);
//! assert_eq!(table.outbox().len(), 1);
//! ```

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::animation::{Animator, TaskContext};
use crate::core::{Result, TableConfig, TableRng, World};
use crate::manipulation::{InputEvent, Manipulator};
use crate::objects::CursorTable;
use crate::selection::Selection;
use crate::snapshot::SnapshotArchive;
use crate::sync::{inbox, Channel, Inbox, InboxSender, Outbound, Outbox, WireMessage};

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub inputs: usize,
    /// Input events that failed and were skipped.
    pub inputs_rejected: usize,
    pub tasks_finished: usize,
    pub messages_applied: usize,
    pub messages_dropped: usize,
}

/// One client's table.
#[derive(Debug)]
pub struct Table {
    pub(crate) config: TableConfig,
    pub(crate) world: World,
    pub(crate) animator: Animator,
    pub(crate) selection: Selection,
    pub(crate) manipulator: Manipulator,
    pub(crate) cursors: CursorTable,
    pub(crate) outbox: Outbox,
    pub(crate) inbox: Inbox,
    inbox_sender: InboxSender,
    pub(crate) rng: TableRng,

    /// Outbound messages are only queued once the replica is in sync.
    pub(crate) networking: bool,

    /// Asset bytes from the last loaded snapshot, reused on export.
    pub(crate) assets: BTreeMap<String, Vec<u8>>,

    ticks: u64,
}

impl Table {
    /// An empty table for the configured participant. Networking is off.
    pub fn new(config: TableConfig) -> Self {
        let (inbox_sender, inbox) = inbox();
        Self {
            world: World::new(config.local_name.clone()),
            rng: TableRng::new(config.seed),
            animator: Animator::new(),
            selection: Selection::new(),
            manipulator: Manipulator::new(),
            cursors: CursorTable::new(),
            outbox: Outbox::new(),
            inbox,
            inbox_sender,
            networking: false,
            assets: BTreeMap::new(),
            ticks: 0,
            config,
        }
    }

    /// A table whose board comes from a snapshot. Networking is on.
    pub fn from_snapshot(config: TableConfig, archive: &SnapshotArchive) -> Result<Self> {
        let mut table = Self::new(config);
        table.load_snapshot(archive)?;
        table.enable_networking();
        Ok(table)
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for scene construction before networking starts.
    ///
    /// Changes made here are never broadcast.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn manipulator(&self) -> &Manipulator {
        &self.manipulator
    }

    #[must_use]
    pub fn cursors(&self) -> &CursorTable {
        &self.cursors
    }

    #[must_use]
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Take every queued outbound message.
    pub fn drain_outbox(&mut self) -> Vec<Outbound> {
        self.outbox.drain()
    }

    /// Handle for network I/O to push received payloads.
    #[must_use]
    pub fn inbox_sender(&self) -> InboxSender {
        self.inbox_sender.clone()
    }

    #[must_use]
    pub fn assets(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.assets
    }

    /// Make asset bytes available to [`Table::export_snapshot`].
    pub fn add_asset(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(path.into(), bytes.into());
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn is_networking(&self) -> bool {
        self.networking
    }

    pub fn enable_networking(&mut self) {
        self.networking = true;
    }

    pub fn disable_networking(&mut self) {
        self.networking = false;
    }

    /// Run `f` against the animator with a task context borrowed from self.
    pub(crate) fn with_tasks<R>(&mut self, f: impl FnOnce(&mut Animator, &mut TaskContext<'_>) -> R) -> R {
        let mut ctx = TaskContext {
            world: &mut self.world,
            rng: &mut self.rng,
            config: &self.config,
        };
        f(&mut self.animator, &mut ctx)
    }

    // === Tick ===

    /// Run one fixed-rate tick.
    pub fn tick(&mut self, inputs: &[InputEvent]) -> Result<TickReport> {
        let mut report = TickReport::default();

        for event in inputs {
            report.inputs += 1;
            if let Err(e) = self.handle_input(*event) {
                warn!(error = %e, event = ?event, "input rejected");
                report.inputs_rejected += 1;
            }
        }

        report.tasks_finished = self.with_tasks(|animator, ctx| animator.tick(ctx))?;
        self.selection.prune(&self.world);

        let (applied, dropped) = self.drain_inbox()?;
        report.messages_applied = applied;
        report.messages_dropped = dropped;

        self.ticks += 1;
        Ok(report)
    }

    // === Session ===

    /// Announce ourselves and ask for the current board.
    ///
    /// Sent regardless of the networking flag: the response is what turns
    /// networking on.
    pub fn join(&mut self) {
        let name = self.config.local_name.clone();
        info!(name = %name, "joining session");
        self.outbox.push(Channel::Reliable, WireMessage::Join { name: name.clone() });
        self.outbox.push(Channel::BestEffort, WireMessage::Join { name });
        self.outbox
            .push(Channel::Reliable, WireMessage::GetGameState { game_state: None });
    }

    /// Replace the board with a snapshot. In-flight local state is dropped.
    pub fn load_snapshot(&mut self, archive: &SnapshotArchive) -> Result<()> {
        let world = archive.load(&self.config.local_name)?;
        info!(objects = world.len(), assets = archive.assets.len(), "snapshot loaded");
        self.world = world;
        self.assets = archive.assets.clone();
        self.animator.clear();
        self.selection.reset();
        self.manipulator.reset();
        Ok(())
    }

    /// Settle every task and capture the board with the loaded assets.
    pub fn export_snapshot(&mut self) -> Result<SnapshotArchive> {
        let settled = self.with_tasks(|animator, ctx| animator.settle_all(ctx))?;
        if settled > 0 {
            debug!(settled, "settled tasks before export");
        }
        let archive = SnapshotArchive::export(&self.world, &self.assets)?;
        info!(objects = self.world.len(), "snapshot exported");
        Ok(archive)
    }
}
