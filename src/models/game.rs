use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::rating::engine;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game {0} not found")]
    NotFound(i64),
    #[error("game has already terminated")]
    AlreadyTerminated,
    #[error("{0} is not a player of this game")]
    NotAPlayer(String),
}

/// Lifecycle of a game record. The only transition is
/// `InProgress -> Terminated`, and it fires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    Terminated,
}

/// A game record as kept by the store.
///
/// The `new_rating_*` and `player1_winner` fields only mean something once
/// `status` is [`GameStatus::Terminated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default)]
    pub id: Option<i64>,
    pub player1: String,
    pub player2: String,
    pub rated: bool,
    pub board_size: u32,
    pub time: u32,
    pub time_increment: u32,
    pub old_rating_player1: u32,
    pub new_rating_player1: u32,
    pub old_rating_player2: u32,
    pub new_rating_player2: u32,
    pub player1_winner: bool,
    pub status: GameStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Body of `POST /games`: what the two clients know when a session starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub player1: String,
    pub player2: String,
    pub rated: bool,
    pub board_size: u32,
    pub time: u32,
    pub time_increment: u32,
    #[serde(alias = "oldRatingPlayer1")]
    pub rating_player1: u32,
    #[serde(alias = "oldRatingPlayer2")]
    pub rating_player2: u32,
}

impl Game {
    pub fn start(new: NewGame, timestamp: OffsetDateTime) -> Self {
        Self {
            id: None,
            player1: new.player1,
            player2: new.player2,
            rated: new.rated,
            board_size: new.board_size,
            time: new.time,
            time_increment: new.time_increment,
            old_rating_player1: new.rating_player1,
            new_rating_player1: new.rating_player1,
            old_rating_player2: new.rating_player2,
            new_rating_player2: new.rating_player2,
            player1_winner: false,
            status: GameStatus::InProgress,
            timestamp,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.status == GameStatus::Terminated
    }

    pub fn has_player(&self, username: &str) -> bool {
        self.player1 == username || self.player2 == username
    }

    /// Records the outcome and moves the game to `Terminated`.
    ///
    /// New ratings are computed from the old ones by the rating engine. A
    /// game that already terminated is left untouched.
    pub fn terminate(&mut self, player1_won: bool) -> Result<(), GameError> {
        if self.is_terminated() {
            return Err(GameError::AlreadyTerminated);
        }

        let (new1, new2) = engine::apply_result(
            self.old_rating_player1,
            self.old_rating_player2,
            player1_won,
            self.rated,
        );
        self.new_rating_player1 = new1;
        self.new_rating_player2 = new2;
        self.player1_winner = player1_won;
        self.status = GameStatus::Terminated;
        Ok(())
    }

    /// Rating `username` ended this game with, if they played in it.
    pub fn rating_after(&self, username: &str) -> Option<u32> {
        if self.player1 == username {
            Some(self.new_rating_player1)
        } else if self.player2 == username {
            Some(self.new_rating_player2)
        } else {
            None
        }
    }

    pub fn won_by(&self, username: &str) -> bool {
        self.is_terminated()
            && ((self.player1 == username && self.player1_winner)
                || (self.player2 == username && !self.player1_winner))
    }
}

/// In-game event relayed between the two session participants.
///
/// The relay never looks inside; legality of a move is the clients' business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMessage {
    Move { sender: String, x: u32, y: u32 },
    Pass { sender: String },
    Forfeit { sender: String },
    Result { sender: String, game: Box<Game> },
}

impl GameMessage {
    pub fn sender(&self) -> &str {
        match self {
            GameMessage::Move { sender, .. }
            | GameMessage::Pass { sender }
            | GameMessage::Forfeit { sender }
            | GameMessage::Result { sender, .. } => sender,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn new_game(rated: bool) -> Game {
        Game::start(
            NewGame {
                player1: "alice".to_owned(),
                player2: "bob".to_owned(),
                rated,
                board_size: 9,
                time: 600,
                time_increment: 5,
                rating_player1: 100,
                rating_player2: 100,
            },
            datetime!(2024-03-01 12:00 UTC),
        )
    }

    #[test]
    fn terminate_fires_once() {
        let mut game = new_game(true);
        game.terminate(true).unwrap();
        assert!(game.is_terminated());
        assert_eq!(game.new_rating_player1, 105);
        assert_eq!(game.new_rating_player2, 95);

        let before = game.clone();
        assert_eq!(game.terminate(false), Err(GameError::AlreadyTerminated));
        assert_eq!(game, before);
    }

    #[test]
    fn unrated_game_keeps_ratings() {
        let mut game = new_game(false);
        game.terminate(false).unwrap();
        assert_eq!(game.new_rating_player1, 100);
        assert_eq!(game.new_rating_player2, 100);
        assert!(game.won_by("bob"));
        assert!(!game.won_by("alice"));
    }

    #[test]
    fn game_message_tagged_by_type() {
        let msg: GameMessage =
            serde_json::from_str(r#"{"type":"MOVE","sender":"alice","x":3,"y":4}"#).unwrap();
        assert_eq!(
            msg,
            GameMessage::Move { sender: "alice".to_owned(), x: 3, y: 4 }
        );
        assert_eq!(msg.sender(), "alice");

        let pass = serde_json::to_value(GameMessage::Pass { sender: "bob".to_owned() }).unwrap();
        assert_eq!(pass["type"], "PASS");
    }

    #[test]
    fn terminate_saturates_at_top_rating() {
        let mut game = new_game(true);
        game.old_rating_player1 = u32::MAX;
        game.terminate(true).unwrap();
        assert_eq!(game.new_rating_player1, u32::MAX);
        assert_eq!(game.new_rating_player2, 95);
    }

    #[test]
    fn new_game_accepts_old_rating_names() {
        let new: NewGame = serde_json::from_str(
            r#"{"player1":"alice","player2":"bob","time":600,"timeIncrement":5,"boardSize":19,
                "rated":true,"oldRatingPlayer1":120,"oldRatingPlayer2":80,
                "timestamp":"2024-03-01T12:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!((new.rating_player1, new.rating_player2), (120, 80));
    }
}
