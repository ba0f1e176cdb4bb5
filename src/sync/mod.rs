//! Synchronization layer.
//!
//! Mutations reach the board through two entry points:
//!
//! - [`Table::apply_local`](crate::table::Table::apply_local) resolves a
//!   local intent into absolute wire messages, mutates the world and queues
//!   the messages for broadcast.
//! - [`Table::apply_remote`](crate::table::Table::apply_remote) applies a
//!   peer's message and never queues anything, so replay cannot echo.
//!
//! Both share one non-emitting mutation routine. Before it changes anything
//! it settles in-flight tasks that own the objects the message touches.
//!
//! Remote failures (unknown ids, malformed payloads) are logged and dropped
//! unless the table runs with `strict_replay`.

pub mod apply;
pub mod local;
pub mod message;
pub mod queue;
pub mod relay;
pub mod remote;
pub mod transport;

pub use local::LocalAction;
pub use message::{Channel, WireMessage};
pub use queue::{inbox, Inbound, Inbox, InboxSender, Outbound, Outbox};
pub use relay::{MemoryRelay, PeerId, RelayFaults, RelayPort};
pub use transport::Transport;
