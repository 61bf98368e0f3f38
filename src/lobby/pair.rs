use std::fmt;

use super::LobbyError;

/// The two participants of a session, stored in sorted order so that
/// `alice/bob` and `bob/alice` name the same pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Result<Self, LobbyError> {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Err(LobbyError::SamePlayer(a));
        }

        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    pub fn players(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    pub fn contains(&self, user: &str) -> bool {
        self.first == user || self.second == user
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}
