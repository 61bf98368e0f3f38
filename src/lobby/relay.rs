use crate::models::{ChatMessage, GameMessage};

use super::{Hub, PairKey, Topic};

/// Forwards session traffic to the subscribers of a pair's channels.
///
/// Holds no state of its own and never inspects what it forwards; messages
/// reach each subscriber in the order they were relayed.
#[derive(Clone)]
pub struct SessionRelay {
    hub: Hub,
}

impl SessionRelay {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }

    pub fn relay_chat(&self, pair: &PairKey, msg: ChatMessage) -> ChatMessage {
        self.hub.publish(&Topic::Chat(pair.clone()), &msg);
        msg
    }

    pub fn relay_move(&self, pair: &PairKey, msg: GameMessage) -> GameMessage {
        self.hub.publish(&Topic::Game(pair.clone()), &msg);
        msg
    }
}
