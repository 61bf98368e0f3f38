use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::{appresult::{AppError, Rejection}, store::Store};

/// The user a request was authenticated as.
///
/// Extracting it checks the `Authorization: Bearer` token against the
/// store; handlers that take an `AuthUser` are closed to anonymous callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Resolves `token` to a username, or refuses.
pub async fn authenticate(store: &Store, token: Option<&str>) -> Result<AuthUser, AppError> {
    let Some(token) = token else {
        return Err(Rejection::Unauthorized.into());
    };

    match store.validate_token(token).await? {
        Some(username) => Ok(AuthUser(username)),
        None => {
            tracing::debug!("rejected unknown token");
            Err(Rejection::Unauthorized.into())
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Store: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = Store::from_ref(state);
        authenticate(&store, bearer_token(&parts.headers)).await
    }
}
