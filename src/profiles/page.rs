use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    appresult::Rejection,
    auth::AuthUser,
    config::Config,
    rating::{rating_timeline, RatingPoint},
    store::Store,
    AppResult,
    AppState,
};

/// Public view of an account: who they are and how their rating moved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
    pub ratings: Vec<RatingPoint>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    State(store): State<Store>,
    State(config): State<Arc<Config>>,
    _: AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<Profile>> {
    let Some(user) = store.find_user_by_username(&username).await? else {
        return Err(Rejection::NotFound(format!("user {username}")).into());
    };

    let games = store.find_games_of_player(&user.username).await?;
    let ratings = rating_timeline(&user.username, user.member_since, &games, config.timeline_offset);

    Ok(Json(Profile {
        username: user.username,
        member_since: user.member_since,
        ratings,
    }))
}
