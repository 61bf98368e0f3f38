use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{Hub, LobbyError, PairKey, Topic};

/// Signals published on a pair's `system` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemSignal {
    Joined,
    ConnectionEstablished,
    Disconnected,
}

struct Waiting {
    joined: BTreeSet<String>,
    since: Instant,
}

/// Rendezvous point where the two players of a pairing meet before their
/// session starts. Waiting players are kept per pair key, so a player
/// waiting for one opponent never completes somebody else's pairing.
pub struct WaitingRoom {
    pairs: Mutex<HashMap<PairKey, Waiting>>,
    hub: Hub,
}

impl WaitingRoom {
    pub fn new(hub: Hub) -> Self {
        Self {
            pairs: Mutex::new(HashMap::new()),
            hub,
        }
    }

    /// Marks `user` as ready for `pair`. Once both players are in, the pair
    /// is cleared and `ConnectionEstablished` goes out on the pair's channel.
    pub async fn join(&self, pair: &PairKey, user: &str) -> Result<SystemSignal, LobbyError> {
        if !pair.contains(user) {
            return Err(LobbyError::NotAParticipant {
                user: user.to_owned(),
                pair: pair.to_string(),
            });
        }

        let mut pairs = self.pairs.lock().await;
        let waiting = pairs.entry(pair.clone()).or_insert_with(|| Waiting {
            joined: BTreeSet::new(),
            since: Instant::now(),
        });
        waiting.joined.insert(user.to_owned());

        let (first, second) = pair.players();
        let signal = if waiting.joined.contains(first) && waiting.joined.contains(second) {
            pairs.remove(pair);
            tracing::info!(%pair, "session established");
            SystemSignal::ConnectionEstablished
        } else {
            tracing::debug!(%pair, %user, "waiting for opponent");
            SystemSignal::Joined
        };

        self.hub.publish(&Topic::System(pair.clone()), &signal);
        Ok(signal)
    }

    /// Announces that the pairing was abandoned and forgets anyone still
    /// waiting on it.
    pub async fn leave(&self, pair: &PairKey) -> SystemSignal {
        let mut pairs = self.pairs.lock().await;
        if pairs.remove(pair).is_some() {
            tracing::debug!(%pair, "dropped waiting entry on leave");
        }

        self.hub.publish(&Topic::System(pair.clone()), &SystemSignal::Disconnected);
        SystemSignal::Disconnected
    }

    /// Drops pairings that have been waiting longer than `max_wait` and tells
    /// their channels. Returns how many were dropped.
    pub async fn sweep(&self, max_wait: Duration) -> usize {
        let mut pairs = self.pairs.lock().await;
        let now = Instant::now();
        let stale: Vec<PairKey> = pairs
            .iter()
            .filter(|(_, waiting)| now.duration_since(waiting.since) > max_wait)
            .map(|(pair, _)| pair.clone())
            .collect();

        for pair in &stale {
            pairs.remove(pair);
            self.hub.publish(&Topic::System(pair.clone()), &SystemSignal::Disconnected);
            tracing::info!(%pair, "waiting pairing expired");
        }
        stale.len()
    }

    /// Players currently waiting on `pair`, in name order.
    pub async fn waiting(&self, pair: &PairKey) -> Vec<String> {
        self.pairs
            .lock()
            .await
            .get(pair)
            .map(|waiting| waiting.joined.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn is_empty(&self) -> bool {
        self.pairs.lock().await.is_empty()
    }
}
