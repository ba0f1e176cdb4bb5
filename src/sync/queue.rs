//! Outbound and inbound message queues.
//!
//! The outbox is filled by `apply_local` on the tick thread and drained by
//! whoever owns the transport. The inbox is the one structure shared with
//! network I/O: producers push raw payloads through an [`InboxSender`] from
//! any thread, the tick thread drains a bounded batch per tick.

use std::collections::VecDeque;

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

use super::message::{Channel, WireMessage};
use crate::core::{Result, TableError};

/// A message waiting to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub channel: Channel,
    pub message: WireMessage,
}

/// Messages produced by local mutations, oldest first.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    queue: VecDeque<Outbound>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel: Channel, message: WireMessage) {
        self.queue.push_back(Outbound { channel, message });
    }

    /// Put messages back at the front, keeping their order.
    pub(crate) fn requeue_front(&mut self, pending: impl DoubleEndedIterator<Item = Outbound>) {
        for outbound in pending.rev() {
            self.queue.push_front(outbound);
        }
    }

    /// Take everything queued so far.
    pub fn drain(&mut self) -> Vec<Outbound> {
        self.queue.drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outbound> {
        self.queue.iter()
    }
}

/// A raw payload received from the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    pub channel: Channel,
    pub payload: Vec<u8>,
}

/// Producer half of the inbox. Cheap to clone, safe to move to I/O threads.
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: Sender<Inbound>,
}

impl InboxSender {
    pub fn send(&self, channel: Channel, payload: impl Into<Vec<u8>>) -> Result<()> {
        self.tx
            .send(Inbound { channel, payload: payload.into() })
            .map_err(|_| TableError::Transport("inbox closed".to_string()))
    }
}

/// Consumer half of the inbox, owned by the table.
#[derive(Debug)]
pub struct Inbox {
    rx: Receiver<Inbound>,
}

impl Inbox {
    /// Non-blocking poll.
    pub fn try_recv(&self) -> Option<Inbound> {
        match self.rx.try_recv() {
            Ok(inbound) => Some(inbound),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Up to `max` payloads that are already waiting.
    pub fn drain_batch(&self, max: usize) -> Vec<Inbound> {
        std::iter::from_fn(|| self.try_recv()).take(max).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create a connected inbox pair.
#[must_use]
pub fn inbox() -> (InboxSender, Inbox) {
    let (tx, rx) = channel::unbounded();
    (InboxSender { tx }, Inbox { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ObjectId;

    #[test]
    fn test_outbox_fifo() {
        let mut outbox = Outbox::new();
        outbox.push(Channel::Reliable, WireMessage::Join { name: "a".into() });
        outbox.push(Channel::BestEffort, WireMessage::Join { name: "b".into() });

        let drained = outbox.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, WireMessage::Join { name: "a".into() });
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_requeue_keeps_order() {
        let mut outbox = Outbox::new();
        outbox.push(Channel::Reliable, WireMessage::Join { name: "c".into() });
        let pending = vec![
            Outbound { channel: Channel::Reliable, message: WireMessage::Join { name: "a".into() } },
            Outbound { channel: Channel::Reliable, message: WireMessage::Join { name: "b".into() } },
        ];
        outbox.requeue_front(pending.into_iter());

        let names: Vec<_> = outbox
            .drain()
            .into_iter()
            .map(|o| match o.message {
                WireMessage::Join { name } => name,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inbox_batch_is_bounded() {
        let (tx, rx) = inbox();
        for i in 0..5 {
            let msg = WireMessage::FlipImage { image_id: ObjectId(i), is_front: true };
            tx.send(Channel::Reliable, msg.encode().unwrap()).unwrap();
        }

        assert_eq!(rx.drain_batch(3).len(), 3);
        assert_eq!(rx.len(), 2);
        assert_eq!(rx.drain_batch(3).len(), 2);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_sender_from_other_thread() {
        let (tx, rx) = inbox();
        let handle = std::thread::spawn(move || tx.send(Channel::BestEffort, b"{}".to_vec()));
        handle.join().unwrap().unwrap();
        assert_eq!(rx.try_recv().map(|i| i.channel), Some(Channel::BestEffort));
    }
}
