//! # rust-tabletop
//!
//! Replicated shared-board core for a multiplayer virtual tabletop.
//!
//! Every participant holds a full replica of the board. Local manipulations
//! are applied immediately and broadcast as small absolute messages; the
//! same messages from peers are replayed without being re-broadcast. There
//! is no authority: replicas converge because every message states its
//! outcome (the face that is now up, the complete deck order after a
//! shuffle, the rolled face) rather than the intent that produced it.
//!
//! ## Design Principles
//!
//! 1. **Absolute Messages**: Randomness and toggles are resolved by the
//!    sender. Applying a message twice is the same as applying it once.
//!
//! 2. **Single Owner**: One `Table` owns its world, tasks and queues, and
//!    is driven by a fixed-rate `tick`. The only cross-thread handoff is
//!    the inbox.
//!
//! 3. **Persistent Decks**: Container decks are `im` vectors, so capturing
//!    the board is cheap.
//!
//! ## Modules
//!
//! - `core`: Ids, geometry, RNG, configuration, errors and the world
//! - `objects`: Images, dice, buttons and remote cursors
//! - `containers`: Holders (decks) and player hands
//! - `selection`: Band selection and group moves
//! - `animation`: Move, shuffle and roll tasks
//! - `manipulation`: Pointer and key input to local mutations
//! - `sync`: Wire messages, local/remote replay, queues and the relay
//! - `snapshot`: Board manifests and portable archives
//! - `table`: The per-client session and its tick

pub mod core;
pub mod objects;
pub mod containers;
pub mod selection;
pub mod animation;
pub mod manipulation;
pub mod sync;
pub mod snapshot;
pub mod table;

// Re-export commonly used types
pub use crate::core::{
    ObjectId, Point, Rect, Rotation,
    TableRng,
    TableConfig, TableError, Result,
    World,
};

pub use crate::objects::{BoardObject, ObjectKind, Image, Dice, Button, ButtonAction, Cursor, CursorTable};

pub use crate::containers::{ContainerKind, ContainerRef, Hand, HandLayout, Holder};

pub use crate::selection::{Selection, SelectionPhase};

pub use crate::animation::{Animator, MoveCompletion, MoveTask, RollTask, ShuffleTask, Task, TaskContext};

pub use crate::manipulation::{InputEvent, Key, Manipulator, Modifiers};

pub use crate::sync::{
    Channel, WireMessage, LocalAction,
    Inbound, Inbox, InboxSender, Outbound, Outbox,
    MemoryRelay, PeerId, RelayFaults, Transport,
};

pub use crate::snapshot::{AssetSource, Manifest, ObjectRecord, SnapshotArchive};

pub use crate::table::{Table, TickReport};
