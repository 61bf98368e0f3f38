use serde::{Deserialize, Serialize};

/// An open invitation on the challenge board.
///
/// The board keys challenges by `creator`, not by `id`: a player has at most
/// one open challenge at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    pub id: i64,
    pub rating: u32,
    pub board_size: u32,
    pub duration: u32,
    pub time_increment: u32,
    pub mode: String,
}

impl Challenge {
    pub fn is_by(&self, creator: &str) -> bool {
        self.creator == creator
    }
}
