mod page;

use axum::{routing::get, Router};

use crate::AppState;

pub use page::Profile;

pub fn router() -> Router<AppState> {
    Router::new().route("/users/{username}", get(page::profile))
}
