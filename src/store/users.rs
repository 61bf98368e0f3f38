use time::{OffsetDateTime, UtcOffset};

use crate::models::User;

use super::Store;

impl Store {
    pub async fn find_user_by_username(&self, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as("SELECT username,member_since FROM users WHERE username=?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    /// The user a bearer token belongs to, if it is that user's current token.
    pub async fn validate_token(&self, token: &str) -> sqlx::Result<Option<String>> {
        if token.is_empty() {
            return Ok(None);
        }

        let row: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE token=?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(username,)| username))
    }

    /// Creates or refreshes an account record with its current token.
    ///
    /// Accounts are issued elsewhere; this is how they are mirrored in.
    pub async fn put_user(
        &self,
        username: &str,
        member_since: OffsetDateTime,
        token: Option<&str>,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO users (username,member_since,token) VALUES (?,?,?) \
            ON CONFLICT(username) DO UPDATE SET token=excluded.token",
        )
        .bind(username)
        .bind(member_since.to_offset(UtcOffset::UTC))
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
