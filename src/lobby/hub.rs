//! Topic fan-out shared by every lobby component.
//!
//! Each topic owns a `tokio::sync::broadcast` channel, created when the first
//! subscriber shows up and dropped again once a publish finds nobody
//! listening. A publish renders the outbound frame to JSON once and every
//! receiver gets the same `Arc<str>`. Delivery is fire-and-forget: a receiver
//! that falls more than `capacity` frames behind loses the oldest ones.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::ServerFrame;

use super::{LobbyError, PairKey};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Full open-challenge set, sent to everyone.
    Challenges,
    /// Accepted challenges addressed to one creator.
    Accepted(String),
    /// Pairing signals: joined, established, disconnected.
    System(PairKey),
    Chat(PairKey),
    Game(PairKey),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topic::Challenges => write!(f, "challenges"),
            Topic::Accepted(user) => write!(f, "acceptChallenge/{user}"),
            Topic::System(pair) => write!(f, "system/{pair}"),
            Topic::Chat(pair) => write!(f, "chat/{pair}"),
            Topic::Game(pair) => write!(f, "game/{pair}"),
        }
    }
}

impl FromStr for Topic {
    type Err = LobbyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim_start_matches('/').split('/').collect();
        match parts.as_slice() {
            ["challenges"] => Ok(Topic::Challenges),
            ["acceptChallenge", user] if !user.is_empty() => Ok(Topic::Accepted(user.to_string())),
            ["system", a, b] => Ok(Topic::System(PairKey::new(*a, *b)?)),
            ["chat", a, b] => Ok(Topic::Chat(PairKey::new(*a, *b)?)),
            ["game", a, b] => Ok(Topic::Game(PairKey::new(*a, *b)?)),
            _ => Err(LobbyError::UnknownTopic(s.to_owned())),
        }
    }
}

#[derive(Clone)]
pub struct Hub {
    channels: Arc<Mutex<HashMap<Topic, broadcast::Sender<Arc<str>>>>>,
    capacity: usize,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    /// Frames a subscriber may fall behind before it starts losing them.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscribe(&self, topic: &Topic) -> broadcast::Receiver<Arc<str>> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Sends `body` to every current subscriber of `topic` and returns how
    /// many were reached.
    pub fn publish<T: Serialize>(&self, topic: &Topic, body: &T) -> usize {
        let frame = match serde_json::to_value(body) {
            Ok(body) => ServerFrame::Message {
                topic: topic.to_string(),
                body,
            },
            Err(err) => {
                tracing::error!(%topic, %err, "could not encode broadcast");
                return 0;
            }
        };
        let text: Arc<str> = match serde_json::to_string(&frame) {
            Ok(text) => text.into(),
            Err(err) => {
                tracing::error!(%topic, %err, "could not encode broadcast");
                return 0;
            }
        };

        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = channels.get(topic) else {
            tracing::trace!(%topic, "publish with no subscribers");
            return 0;
        };

        match tx.send(text) {
            Ok(reached) => reached,
            Err(_) => {
                channels.remove(topic);
                0
            }
        }
    }
}
