use std::sync::Arc;
use std::time::Duration;

use goban_lobby::{models::ServerFrame, ws::Connection, Lobby};
use serde_json::{json, Value};
use tokio::sync::mpsc::Receiver;

struct Client {
    conn: Connection,
    rx: Receiver<Arc<str>>,
}

impl Client {
    fn new(user: &str, lobby: &Lobby) -> Self {
        let (conn, rx) = Connection::new(user.to_owned(), lobby.clone());
        Self { conn, rx }
    }

    async fn send(&mut self, frame: Value) {
        self.conn.handle_text(&frame.to_string()).await;
    }

    async fn subscribe(&mut self, topic: &str) {
        self.send(json!({"type": "subscribe", "topic": topic})).await;
    }

    async fn next(&mut self) -> ServerFrame {
        let text = tokio::time::timeout(Duration::from_secs(1), self.rx.recv())
            .await
            .expect("frame in time")
            .expect("queue open");
        serde_json::from_str(&text).unwrap()
    }

    /// Next message on `topic`, skipping traffic on other topics.
    async fn next_on(&mut self, topic: &str) -> Value {
        loop {
            match self.next().await {
                ServerFrame::Message { topic: t, body } if t == topic => return body,
                ServerFrame::Message { .. } => continue,
                ServerFrame::Error { message } => panic!("unexpected error frame: {message}"),
            }
        }
    }

    async fn next_error(&mut self) -> String {
        loop {
            if let ServerFrame::Error { message } = self.next().await {
                return message;
            }
        }
    }

    async fn assert_quiet(&mut self) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(self.rx.try_recv().is_err(), "expected no more frames");
    }
}

fn challenge(creator: &str, id: i64) -> Value {
    json!({
        "creator": creator,
        "id": id,
        "rating": 120,
        "boardSize": 13,
        "duration": 600,
        "timeIncrement": 5,
        "mode": "rated",
    })
}

#[tokio::test]
async fn challenge_to_session() {
    let lobby = Lobby::new(16);
    let mut alice = Client::new("alice", &lobby);
    let mut bob = Client::new("bob", &lobby);
    let mut carol = Client::new("carol", &lobby);

    for client in [&mut alice, &mut bob, &mut carol] {
        client.subscribe("challenges").await;
    }
    alice.subscribe("acceptChallenge/alice").await;
    carol.subscribe("acceptChallenge/carol").await;

    // a second challenge by the same creator replaces the first
    alice.send(json!({"type": "send", "destination": "addChallenge", "body": challenge("alice", 1)})).await;
    alice.send(json!({"type": "send", "destination": "addChallenge", "body": challenge("alice", 2)})).await;
    assert_eq!(bob.next_on("challenges").await, json!([challenge("alice", 1)]));
    assert_eq!(bob.next_on("challenges").await, json!([challenge("alice", 2)]));

    bob.send(json!({"type": "send", "destination": "acceptChallenge/alice", "body": challenge("alice", 2)})).await;
    assert_eq!(bob.next_on("challenges").await, json!([]));

    let accepted = alice.next_on("acceptChallenge/alice").await;
    assert_eq!(accepted["opponent"], "bob");
    assert_eq!(accepted["id"], 2);

    // already taken
    bob.send(json!({"type": "send", "destination": "acceptChallenge/alice", "body": challenge("alice", 2)})).await;
    assert!(bob.next_error().await.contains("alice"));

    carol.next_on("challenges").await;
    carol.next_on("challenges").await;
    carol.next_on("challenges").await;
    carol.assert_quiet().await;

    // pairing
    alice.subscribe("system/alice/bob").await;
    bob.subscribe("system/bob/alice").await;
    alice.send(json!({"type": "send", "destination": "joinGame/alice/bob"})).await;
    assert_eq!(bob.next_on("system/alice/bob").await, json!("JOINED"));
    bob.send(json!({"type": "send", "destination": "joinGame/bob/alice", "body": "bob"})).await;
    assert_eq!(alice.next_on("system/alice/bob").await, json!("JOINED"));
    assert_eq!(alice.next_on("system/alice/bob").await, json!("CONNECTION_ESTABLISHED"));
    assert!(lobby.waiting.is_empty().await);

    // session traffic
    for client in [&mut alice, &mut bob] {
        client.subscribe("chat/alice/bob").await;
        client.subscribe("game/alice/bob").await;
    }
    bob.send(json!({"type": "send", "destination": "chat/alice/bob", "body": {"user": "bob", "text": "gl"}})).await;
    assert_eq!(alice.next_on("chat/alice/bob").await, json!({"user": "bob", "text": "gl"}));

    let stone = json!({"type": "MOVE", "sender": "alice", "x": 3, "y": 3});
    alice.send(json!({"type": "send", "destination": "game/alice/bob", "body": stone})).await;
    assert_eq!(bob.next_on("game/alice/bob").await, stone);
    assert_eq!(alice.next_on("game/alice/bob").await, stone);

    // carol can neither listen in nor talk on their channels
    carol.subscribe("chat/alice/bob").await;
    carol.next_error().await;
    carol.send(json!({"type": "send", "destination": "chat/alice/bob", "body": {"user": "carol", "text": "hi"}})).await;
    carol.next_error().await;
    alice.assert_quiet().await;
}

#[tokio::test]
async fn leaving_resets_the_pairing() {
    let lobby = Lobby::new(16);
    let mut alice = Client::new("alice", &lobby);
    let mut bob = Client::new("bob", &lobby);
    alice.subscribe("system/alice/bob").await;

    alice.send(json!({"type": "send", "destination": "joinGame/alice/bob"})).await;
    assert_eq!(alice.next_on("system/alice/bob").await, json!("JOINED"));

    alice.send(json!({"type": "send", "destination": "leaveGame/alice/bob"})).await;
    assert_eq!(alice.next_on("system/alice/bob").await, json!("DISCONNECTED"));

    // bob joining after alice left only puts bob in the waiting room
    bob.send(json!({"type": "send", "destination": "joinGame/alice/bob"})).await;
    assert_eq!(alice.next_on("system/alice/bob").await, json!("JOINED"));
    alice.assert_quiet().await;
}

#[tokio::test]
async fn connect_replays_board_to_late_subscribers() {
    let lobby = Lobby::new(16);
    let mut alice = Client::new("alice", &lobby);
    alice.send(json!({"type": "send", "destination": "addChallenge", "body": challenge("alice", 7)})).await;

    let mut bob = Client::new("bob", &lobby);
    bob.subscribe("challenges").await;
    bob.send(json!({"type": "send", "destination": "connect"})).await;
    assert_eq!(bob.next_on("challenges").await, json!([challenge("alice", 7)]));

    alice.send(json!({"type": "send", "destination": "deleteChallenge"})).await;
    assert_eq!(bob.next_on("challenges").await, json!([]));
}
