//! One authenticated WebSocket client.
//!
//! A `Connection` turns client frames into lobby operations on behalf of the
//! user it was authenticated as. It never lets a frame act for somebody else:
//! challenges must be the user's own, pair destinations and pair topics must
//! include the user, relayed chat and moves must carry the user as sender,
//! and accepted-challenge notices are only readable by the creator they are
//! addressed to.
//!
//! Everything the client should see goes through one queue bounded by the
//! hub's channel capacity. Each subscription is a small task forwarding from
//! the topic's broadcast receiver into that queue; the socket writer drains
//! it. A client that stops reading loses frames once the queue is full.
//! Rejections are written to the same queue as `error` frames and never end
//! the connection.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::lobby::{Lobby, PairKey, Topic};
use crate::models::{Challenge, ChatMessage, ClientFrame, GameMessage, ServerFrame};

use super::{Destination, FrameError};

pub struct Connection {
    id: Uuid,
    user: String,
    lobby: Lobby,
    outbound: mpsc::Sender<Arc<str>>,
    subscriptions: HashMap<Topic, JoinHandle<()>>,
}

impl Connection {
    /// Returns the connection and the receiving end of its outbound queue.
    pub fn new(user: String, lobby: Lobby) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (outbound, rx) = mpsc::channel(lobby.hub.capacity());
        let conn = Self {
            id: Uuid::now_v7(),
            user,
            lobby,
            outbound,
            subscriptions: HashMap::new(),
        };
        (conn, rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn is_subscribed(&self, topic: &Topic) -> bool {
        self.subscriptions.contains_key(topic)
    }

    /// Handles one text frame from the client.
    pub async fn handle_text(&mut self, text: &str) {
        let result = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => self.handle_frame(frame).await,
            Err(err) => Err(FrameError::Malformed(err)),
        };

        if let Err(err) = result {
            tracing::debug!(conn = %self.id, user = %self.user, %err, "frame rejected");
            self.send_error(err.to_string());
        }
    }

    pub async fn handle_frame(&mut self, frame: ClientFrame) -> Result<(), FrameError> {
        match frame {
            ClientFrame::Subscribe { topic } => self.subscribe(topic.parse::<Topic>()?),
            ClientFrame::Unsubscribe { topic } => {
                self.unsubscribe(&topic.parse::<Topic>()?);
                Ok(())
            }
            ClientFrame::Send { destination, body } => {
                self.dispatch(destination.parse::<Destination>()?, body).await
            }
        }
    }

    fn subscribe(&mut self, topic: Topic) -> Result<(), FrameError> {
        self.check_can_read(&topic)?;
        if self.subscriptions.contains_key(&topic) {
            return Ok(());
        }

        let mut rx = self.lobby.hub.subscribe(&topic);
        let outbound = self.outbound.clone();
        let conn = self.id;
        let forward = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(text) => match outbound.try_send(text) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(%conn, "outbound queue full, frame dropped");
                        }
                        Err(TrySendError::Closed(_)) => break,
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(%conn, skipped, "subscriber fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        tracing::debug!(conn = %self.id, %topic, "subscribed");
        self.subscriptions.insert(topic, forward);
        Ok(())
    }

    fn unsubscribe(&mut self, topic: &Topic) {
        if let Some(forward) = self.subscriptions.remove(topic) {
            forward.abort();
            tracing::debug!(conn = %self.id, %topic, "unsubscribed");
        }
    }

    async fn dispatch(&mut self, destination: Destination, body: Value) -> Result<(), FrameError> {
        match destination {
            Destination::Connect => {
                self.lobby.board.connect().await;
            }
            Destination::AddChallenge => {
                let challenge: Challenge = decode(body)?;
                self.check_self(&challenge.creator, "post a challenge")?;
                self.lobby.board.add_challenge(challenge).await;
            }
            Destination::DeleteChallenge => {
                let creator = self.user_or_self(body)?;
                self.check_self(&creator, "cancel challenges")?;
                self.lobby.board.cancel_challenges(&creator).await;
            }
            Destination::AcceptChallenge(target) => {
                if target == self.user {
                    return Err(FrameError::Forbidden("cannot accept your own challenge".to_owned()));
                }
                let mut challenge: Challenge = decode(body)?;
                challenge.opponent = Some(self.user.clone());
                self.lobby.board.accept_challenge(&target, challenge).await?;
            }
            Destination::JoinGame(pair) => {
                self.check_member(&pair)?;
                let user = self.user_or_self(body)?;
                self.check_self(&user, "join")?;
                self.lobby.waiting.join(&pair, &user).await?;
            }
            Destination::LeaveGame(pair) => {
                self.check_member(&pair)?;
                self.lobby.waiting.leave(&pair).await;
            }
            Destination::Chat(pair) => {
                self.check_member(&pair)?;
                let msg: ChatMessage = decode(body)?;
                self.check_self(&msg.user, "chat")?;
                self.lobby.relay.relay_chat(&pair, msg);
            }
            Destination::Game(pair) => {
                self.check_member(&pair)?;
                let msg: GameMessage = decode(body)?;
                self.check_self(msg.sender(), "move")?;
                self.lobby.relay.relay_move(&pair, msg);
            }
        }
        Ok(())
    }

    /// A string body naming a user, or the connection's own user when absent.
    fn user_or_self(&self, body: Value) -> Result<String, FrameError> {
        match body {
            Value::Null => Ok(self.user.clone()),
            body => decode(body),
        }
    }

    fn check_self(&self, claimed: &str, action: &str) -> Result<(), FrameError> {
        if claimed == self.user {
            Ok(())
        } else {
            Err(FrameError::Forbidden(format!("{} cannot {action} as {claimed}", self.user)))
        }
    }

    fn check_member(&self, pair: &PairKey) -> Result<(), FrameError> {
        if pair.contains(&self.user) {
            Ok(())
        } else {
            Err(FrameError::Forbidden(format!("{} is not a player of {pair}", self.user)))
        }
    }

    fn check_can_read(&self, topic: &Topic) -> Result<(), FrameError> {
        match topic {
            Topic::Challenges => Ok(()),
            Topic::Accepted(creator) => self.check_self(creator, "read accepted challenges"),
            Topic::System(pair) | Topic::Chat(pair) | Topic::Game(pair) => self.check_member(pair),
        }
    }

    fn send_error(&self, message: String) {
        match serde_json::to_string(&ServerFrame::Error { message }) {
            Ok(text) => {
                if self.outbound.try_send(text.into()).is_err() {
                    tracing::warn!(conn = %self.id, "error frame dropped");
                }
            }
            Err(err) => tracing::error!(%err, "could not encode error frame"),
        }
    }

    /// Stops every subscription.
    pub fn close(&mut self) {
        for (_, forward) in self.subscriptions.drain() {
            forward.abort();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, FrameError> {
    serde_json::from_value(body).map_err(FrameError::Malformed)
}
