use tokio::sync::Mutex;

use crate::models::Challenge;

use super::{Hub, LobbyError, Topic};

/// Process-wide set of open challenges.
///
/// Every mutation runs under one lock together with its broadcast, so all
/// subscribers see the full post-mutation set in the order mutations happened.
pub struct ChallengeBoard {
    challenges: Mutex<Vec<Challenge>>,
    hub: Hub,
}

impl ChallengeBoard {
    pub fn new(hub: Hub) -> Self {
        Self {
            challenges: Mutex::new(Vec::new()),
            hub,
        }
    }

    pub async fn snapshot(&self) -> Vec<Challenge> {
        self.challenges.lock().await.clone()
    }

    /// Rebroadcasts the current set, for a client that just subscribed.
    pub async fn connect(&self) -> Vec<Challenge> {
        let challenges = self.challenges.lock().await;
        self.hub.publish(&Topic::Challenges, &*challenges);
        challenges.clone()
    }

    /// Posts `challenge`, replacing whatever its creator had open before.
    pub async fn add_challenge(&self, challenge: Challenge) -> Vec<Challenge> {
        let mut challenges = self.challenges.lock().await;
        challenges.retain(|c| !c.is_by(&challenge.creator));
        tracing::debug!(creator = %challenge.creator, id = challenge.id, "challenge posted");
        challenges.push(challenge);

        self.hub.publish(&Topic::Challenges, &*challenges);
        challenges.clone()
    }

    pub async fn cancel_challenges(&self, creator: &str) -> Vec<Challenge> {
        let mut challenges = self.challenges.lock().await;
        challenges.retain(|c| !c.is_by(creator));
        tracing::debug!(%creator, "challenges cancelled");

        self.hub.publish(&Topic::Challenges, &*challenges);
        challenges.clone()
    }

    /// Takes `target`'s open challenge off the board and hands `accepted`
    /// to `target` alone.
    ///
    /// Fails without sending anything when `target` has no open challenge
    /// with the same id, so a challenge can be accepted at most once.
    pub async fn accept_challenge(
        &self,
        target: &str,
        accepted: Challenge,
    ) -> Result<Challenge, LobbyError> {
        if !accepted.is_by(target) {
            return Err(LobbyError::CreatorMismatch {
                creator: accepted.creator,
                target: target.to_owned(),
            });
        }

        let mut challenges = self.challenges.lock().await;
        let Some(index) = challenges
            .iter()
            .position(|c| c.is_by(target) && c.id == accepted.id)
        else {
            return Err(LobbyError::ChallengeNotOpen(target.to_owned()));
        };
        challenges.remove(index);

        self.hub.publish(&Topic::Challenges, &*challenges);
        self.hub.publish(&Topic::Accepted(target.to_owned()), &accepted);
        tracing::info!(
            creator = %target,
            opponent = accepted.opponent.as_deref().unwrap_or("?"),
            id = accepted.id,
            "challenge accepted"
        );
        Ok(accepted)
    }
}
