use serde::Serialize;
use time::OffsetDateTime;

/// The slice of an account the lobby reads. Accounts themselves are managed
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
}
