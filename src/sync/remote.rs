//! Remote replay: apply peer messages without re-emitting them.

use tracing::{debug, warn};

use super::message::WireMessage;
use crate::core::{Result, TableError};
use crate::table::Table;

impl Table {
    /// Apply a peer's message. Nothing is queued for broadcast.
    pub fn apply_remote(&mut self, msg: WireMessage) -> Result<()> {
        debug!(action = msg.action(), "applying remote message");
        self.mutate(&msg)
    }

    /// Decode and apply a raw payload.
    ///
    /// Returns `Ok(false)` when the payload was dropped. In strict mode the
    /// failure is returned instead.
    pub fn receive(&mut self, payload: &[u8]) -> Result<bool> {
        match WireMessage::decode(payload).and_then(|msg| self.apply_remote(msg)) {
            Ok(()) => Ok(true),
            Err(e) => self.replay_failure(e).map(|()| false),
        }
    }

    /// Apply up to `inbound_batch` waiting payloads.
    ///
    /// Returns `(applied, dropped)`.
    pub fn drain_inbox(&mut self) -> Result<(usize, usize)> {
        let batch = self.inbox.drain_batch(self.config.inbound_batch);
        let mut applied = 0;
        let mut dropped = 0;
        for inbound in batch {
            if self.receive(&inbound.payload)? {
                applied += 1;
            } else {
                dropped += 1;
            }
        }
        Ok((applied, dropped))
    }

    fn replay_failure(&self, error: TableError) -> Result<()> {
        if self.config.strict_replay {
            return Err(error);
        }
        warn!(%error, "dropping remote message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ObjectId, Rect, TableConfig};
    use crate::objects::{BoardObject, Image};
    use crate::sync::Channel;

    fn table(config: TableConfig) -> Table {
        let mut t = Table::new(config);
        t.world_mut()
            .register(BoardObject::image(ObjectId(0), Rect::new(0, 0, 50, 70), Image::two_sided("f.png", "b.png")))
            .unwrap();
        t.enable_networking();
        t
    }

    #[test]
    fn test_replay_never_emits() {
        let mut t = table(TableConfig::new("alice"));
        t.apply_remote(WireMessage::FlipImage { image_id: ObjectId(0), is_front: true }).unwrap();
        assert!(t.world().image(ObjectId(0)).unwrap().is_front);
        assert!(t.outbox().is_empty());
    }

    #[test]
    fn test_unknown_id_dropped() {
        let mut t = table(TableConfig::new("alice"));
        let payload = br#"{"action":"flip_image","image_id":99,"is_front":true}"#;
        assert!(!t.receive(payload).unwrap());
        assert!(!t.receive(b"{broken").unwrap());
    }

    #[test]
    fn test_strict_mode_surfaces_errors() {
        let mut t = table(TableConfig::new("alice").strict());
        let payload = br#"{"action":"flip_image","image_id":99,"is_front":true}"#;
        assert!(matches!(t.receive(payload), Err(TableError::UnknownId(ObjectId(99)))));
        assert!(matches!(t.receive(b"{broken"), Err(TableError::Malformed(_))));
    }

    #[test]
    fn test_drain_counts_drops() {
        let mut t = table(TableConfig::new("alice"));
        let tx = t.inbox_sender();
        tx.send(Channel::Reliable, b"nope".to_vec()).unwrap();
        let flip = WireMessage::FlipImage { image_id: ObjectId(0), is_front: true };
        tx.send(Channel::Reliable, flip.encode().unwrap()).unwrap();

        assert_eq!(t.drain_inbox().unwrap(), (1, 1));
    }
}
