mod challenge;
mod chat;
mod frame;
mod game;
mod user;

pub use challenge::Challenge;
pub use chat::ChatMessage;
pub use frame::{ClientFrame, ServerFrame};
pub use game::{Game, GameError, GameMessage, GameStatus, NewGame};
pub use user::User;
