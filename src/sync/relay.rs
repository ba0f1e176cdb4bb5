//! In-memory relay for simulated sessions.
//!
//! `MemoryRelay` stands in for the relay server: every payload a peer sends
//! is fanned out to every other peer's inbox without interpretation. The one
//! exception is a board request (`get_game_state` with no payload), which
//! the relay answers itself from the board it was given.
//!
//! Link faults are configured with [`RelayFaults`]: duplication, holding a
//! payload back so it arrives after a later one, and loss on the
//! best-effort channel. Faults draw from a seeded RNG so runs reproduce.

use tracing::{debug, trace};

use super::message::{Channel, WireMessage};
use super::queue::{Inbound, InboxSender};
use super::transport::Transport;
use crate::core::{Result, TableError, TableRng};

/// Index of a connected peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeerId(pub usize);

/// Link fault probabilities, each in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelayFaults {
    /// Deliver a payload twice.
    pub duplicate: f64,
    /// Hold a payload back until the next delivery to the same peer.
    pub reorder: f64,
    /// Lose a best-effort payload. The reliable channel never loses.
    pub best_effort_loss: f64,
}

impl RelayFaults {
    /// A perfect link.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_duplicate(mut self, p: f64) -> Self {
        self.duplicate = p;
        self
    }

    #[must_use]
    pub fn with_reorder(mut self, p: f64) -> Self {
        self.reorder = p;
        self
    }

    #[must_use]
    pub fn with_best_effort_loss(mut self, p: f64) -> Self {
        self.best_effort_loss = p;
        self
    }
}

/// Fan-out relay over in-process inboxes.
#[derive(Debug)]
pub struct MemoryRelay {
    peers: Vec<InboxSender>,
    /// Held-back payloads per peer.
    held: Vec<Vec<Inbound>>,
    faults: RelayFaults,
    rng: TableRng,
    /// Base64 board served to joining peers.
    game_state: Option<String>,
}

impl MemoryRelay {
    pub fn new(seed: u64) -> Self {
        Self {
            peers: Vec::new(),
            held: Vec::new(),
            faults: RelayFaults::none(),
            rng: TableRng::new(seed),
            game_state: None,
        }
    }

    #[must_use]
    pub fn with_faults(mut self, faults: RelayFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Board served to peers that ask for it.
    pub fn set_game_state(&mut self, encoded: impl Into<String>) {
        self.game_state = Some(encoded.into());
    }

    /// Connect a peer by the producer half of its inbox.
    pub fn connect(&mut self, inbox: InboxSender) -> PeerId {
        self.peers.push(inbox);
        self.held.push(Vec::new());
        PeerId(self.peers.len() - 1)
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Transport handle that sends as `peer`.
    pub fn port(&mut self, peer: PeerId) -> RelayPort<'_> {
        RelayPort { relay: self, peer }
    }

    /// Route one payload from `from`.
    pub fn route(&mut self, from: PeerId, channel: Channel, payload: &[u8]) -> Result<()> {
        if from.0 >= self.peers.len() {
            return Err(TableError::Transport(format!("unknown peer {}", from.0)));
        }

        if let Ok(WireMessage::GetGameState { game_state: None }) = WireMessage::decode(payload) {
            return self.answer_board_request(from);
        }

        for to in 0..self.peers.len() {
            if to == from.0 {
                continue;
            }
            let inbound = Inbound { channel, payload: payload.to_vec() };
            self.deliver(to, inbound)?;
        }
        Ok(())
    }

    fn answer_board_request(&mut self, from: PeerId) -> Result<()> {
        let Some(state) = self.game_state.clone() else {
            debug!(peer = from.0, "board requested but none is loaded");
            return Ok(());
        };
        let reply = WireMessage::GetGameState { game_state: Some(state) }.encode()?;
        self.peers[from.0].send(Channel::Reliable, reply)
    }

    fn deliver(&mut self, to: usize, inbound: Inbound) -> Result<()> {
        if inbound.channel == Channel::BestEffort && self.rng.gen_bool(self.faults.best_effort_loss) {
            trace!(peer = to, "best-effort payload lost");
            return Ok(());
        }
        if self.rng.gen_bool(self.faults.reorder) {
            trace!(peer = to, "payload held back");
            self.held[to].push(inbound);
            return Ok(());
        }

        let copies = if self.rng.gen_bool(self.faults.duplicate) { 2 } else { 1 };
        for _ in 0..copies {
            self.peers[to].send(inbound.channel, inbound.payload.clone())?;
        }
        for late in std::mem::take(&mut self.held[to]) {
            self.peers[to].send(late.channel, late.payload)?;
        }
        Ok(())
    }

    /// Deliver everything still held back.
    pub fn release_held(&mut self) -> Result<usize> {
        let mut released = 0;
        for to in 0..self.peers.len() {
            for late in std::mem::take(&mut self.held[to]) {
                self.peers[to].send(late.channel, late.payload)?;
                released += 1;
            }
        }
        Ok(released)
    }
}

/// A peer's sending end of a [`MemoryRelay`].
pub struct RelayPort<'a> {
    relay: &'a mut MemoryRelay,
    peer: PeerId,
}

impl Transport for RelayPort<'_> {
    fn send(&mut self, channel: Channel, payload: &[u8]) -> Result<()> {
        self.relay.route(self.peer, channel, payload)
    }
}
