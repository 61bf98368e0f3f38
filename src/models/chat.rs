use serde::{Deserialize, Serialize};

/// A chat line between the two players of a session. Relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
}
