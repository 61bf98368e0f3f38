use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

use crate::{lobby::LobbyError, models::GameError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

/// Request-level refusals that are not domain errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        if let Some(rejection) = self.0.downcast_ref::<Rejection>() {
            return match rejection {
                Rejection::Unauthorized => StatusCode::UNAUTHORIZED,
                Rejection::NotFound(_) => StatusCode::NOT_FOUND,
                Rejection::Forbidden(_) => StatusCode::FORBIDDEN,
            };
        }
        if let Some(err) = self.0.downcast_ref::<GameError>() {
            return match err {
                GameError::NotFound(_) => StatusCode::NOT_FOUND,
                GameError::AlreadyTerminated => StatusCode::CONFLICT,
                GameError::NotAPlayer(_) => StatusCode::FORBIDDEN,
            };
        }
        if self.0.downcast_ref::<LobbyError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(err = %self.0, "request failed");
            return (status, format!("{}\n\n{}", self.0, self.0.backtrace())).into_response();
        }
        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(AppError::from(Rejection::Unauthorized).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::from(GameError::NotFound(3)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(GameError::AlreadyTerminated).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(LobbyError::SamePlayer("a".to_owned())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(anyhow::anyhow!("disk on fire")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
