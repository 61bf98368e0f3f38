//! Real-time coordination: the challenge board, the waiting room and the
//! per-pair session relay, all fanning out through one [`Hub`].

mod board;
mod hub;
mod pair;
mod relay;
mod waiting;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

pub use board::ChallengeBoard;
pub use hub::{Hub, Topic};
pub use pair::PairKey;
pub use relay::SessionRelay;
pub use waiting::{SystemSignal, WaitingRoom};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LobbyError {
    #[error("a pairing needs two different players, got {0} twice")]
    SamePlayer(String),
    #[error("{user} is not a player of {pair}")]
    NotAParticipant { user: String, pair: String },
    #[error("{0} has no such open challenge")]
    ChallengeNotOpen(String),
    #[error("challenge by {creator} cannot be accepted as {target}'s")]
    CreatorMismatch { creator: String, target: String },
    #[error("unknown topic {0}")]
    UnknownTopic(String),
}

#[derive(Clone)]
pub struct Lobby {
    pub hub: Hub,
    pub board: Arc<ChallengeBoard>,
    pub waiting: Arc<WaitingRoom>,
    pub relay: SessionRelay,
}

impl Lobby {
    pub fn new(channel_capacity: usize) -> Self {
        let hub = Hub::new(channel_capacity);
        Self {
            board: Arc::new(ChallengeBoard::new(hub.clone())),
            waiting: Arc::new(WaitingRoom::new(hub.clone())),
            relay: SessionRelay::new(hub.clone()),
            hub,
        }
    }

    /// Periodically expires pairings nobody completed within `max_wait`.
    pub fn spawn_sweeper(&self, every: Duration, max_wait: Duration) -> JoinHandle<()> {
        let waiting = Arc::clone(&self.waiting);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let dropped = waiting.sweep(max_wait).await;
                if dropped > 0 {
                    tracing::debug!(dropped, "swept waiting room");
                }
            }
        })
    }
}
