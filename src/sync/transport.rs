//! Outbound transport seam.
//!
//! The socket layer (delimited TCP for the reliable channel, datagrams for
//! best-effort) lives outside this crate. It only has to accept encoded
//! payloads per channel.

use tracing::warn;

use super::message::Channel;
use crate::core::Result;
use crate::table::Table;

/// Sends encoded messages to the relay.
pub trait Transport {
    fn send(&mut self, channel: Channel, payload: &[u8]) -> Result<()>;
}

impl Table {
    /// Encode and send every queued message, oldest first.
    ///
    /// If the transport refuses a message, it and everything after it stay
    /// queued for the next flush.
    pub fn flush(&mut self, transport: &mut impl Transport) -> Result<usize> {
        let mut pending = self.outbox.drain().into_iter();
        let mut sent = 0;
        while let Some(outbound) = pending.next() {
            let result = outbound
                .message
                .encode()
                .and_then(|payload| transport.send(outbound.channel, &payload));
            if let Err(e) = result {
                warn!(error = %e, unsent = pending.len() + 1, "flush interrupted");
                let rest: Vec<_> = std::iter::once(outbound).chain(pending).collect();
                self.outbox.requeue_front(rest.into_iter());
                return Err(e);
            }
            sent += 1;
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ObjectId, TableConfig, TableError};
    use crate::sync::WireMessage;

    /// Accepts `capacity` messages, then refuses.
    struct Limited {
        sent: Vec<(Channel, Vec<u8>)>,
        capacity: usize,
    }

    impl Transport for Limited {
        fn send(&mut self, channel: Channel, payload: &[u8]) -> Result<()> {
            if self.sent.len() >= self.capacity {
                return Err(TableError::Transport("full".into()));
            }
            self.sent.push((channel, payload.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_flush_keeps_unsent() {
        let mut t = Table::new(TableConfig::new("alice"));
        t.enable_networking();
        for i in 0..3 {
            t.emit(Channel::Reliable, WireMessage::FlipImage { image_id: ObjectId(i), is_front: true });
        }

        let mut transport = Limited { sent: Vec::new(), capacity: 1 };
        assert!(t.flush(&mut transport).is_err());
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(t.outbox().len(), 2);

        transport.capacity = 10;
        assert_eq!(t.flush(&mut transport).unwrap(), 2);
        let first = WireMessage::decode(&transport.sent[1].1).unwrap();
        assert_eq!(first, WireMessage::FlipImage { image_id: ObjectId(1), is_front: true });
    }
}
