use std::str::FromStr;

use crate::lobby::PairKey;

use super::FrameError;

/// Where a client `send` frame is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Connect,
    AddChallenge,
    DeleteChallenge,
    AcceptChallenge(String),
    JoinGame(PairKey),
    LeaveGame(PairKey),
    Chat(PairKey),
    Game(PairKey),
}

impl FromStr for Destination {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim_start_matches('/').split('/').collect();
        let destination = match parts.as_slice() {
            ["connect"] => Destination::Connect,
            ["addChallenge"] => Destination::AddChallenge,
            ["deleteChallenge"] => Destination::DeleteChallenge,
            ["acceptChallenge", target] if !target.is_empty() => {
                Destination::AcceptChallenge(target.to_string())
            }
            ["joinGame", a, b] => Destination::JoinGame(PairKey::new(*a, *b)?),
            ["leaveGame", a, b] => Destination::LeaveGame(PairKey::new(*a, *b)?),
            ["chat", a, b] => Destination::Chat(PairKey::new(*a, *b)?),
            ["game", a, b] => Destination::Game(PairKey::new(*a, *b)?),
            _ => return Err(FrameError::UnknownDestination(s.to_owned())),
        };
        Ok(destination)
    }
}
