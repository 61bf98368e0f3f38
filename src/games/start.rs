use axum::{debug_handler, extract::State, http::StatusCode, Json};
use time::OffsetDateTime;

use crate::{
    appresult::Rejection,
    auth::AuthUser,
    lobby::PairKey,
    models::{Game, NewGame},
    store::Store,
    AppResult,
    AppState,
};

/// Records a game as it starts. Only one of its players may do that.
#[debug_handler(state = AppState)]
pub(crate) async fn start_game(
    State(store): State<Store>,
    AuthUser(user): AuthUser,
    Json(new): Json<NewGame>,
) -> AppResult<(StatusCode, Json<Game>)> {
    if new.player1 != user && new.player2 != user {
        return Err(Rejection::Forbidden(format!("{user} cannot start a game between others")).into());
    }
    PairKey::new(&new.player1, &new.player2)?;

    let game = store.save_game(&Game::start(new, OffsetDateTime::now_utc())).await?;
    tracing::info!(id = ?game.id, player1 = %game.player1, player2 = %game.player2, "game started");
    Ok((StatusCode::CREATED, Json(game)))
}
