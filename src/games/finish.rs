use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    models::{Game, GameError},
    store::Store,
    AppResult,
    AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Outcome {
    player1_won: bool,
}

/// Ends a game and rates it. Either player may report the outcome; the
/// first report wins and later ones get 409.
#[debug_handler(state = AppState)]
pub(crate) async fn finish_game(
    State(store): State<Store>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(Outcome { player1_won }): Json<Outcome>,
) -> AppResult<Json<Game>> {
    let game = store.find_game(id).await?.ok_or(GameError::NotFound(id))?;
    if !game.has_player(&user) {
        return Err(GameError::NotAPlayer(user).into());
    }

    Ok(Json(store.finish_game(id, player1_won).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::datetime;

    use super::*;
    use crate::games::testing::stored;

    async fn finish(store: &Store, user: &str, id: i64, player1_won: bool) -> AppResult<Json<Game>> {
        finish_game(
            State(store.clone()),
            AuthUser(user.to_owned()),
            Path(id),
            Json(Outcome { player1_won }),
        )
        .await
    }

    #[tokio::test]
    async fn first_report_rates_the_game() {
        let store = Store::in_memory().await.unwrap();
        let id = stored(&store, "alice", "bob", datetime!(2024-05-01 10:00 UTC)).await.id.unwrap();

        let Json(game) = finish(&store, "bob", id, false).await.unwrap();
        assert_eq!((game.new_rating_player1, game.new_rating_player2), (95, 105));

        let err = finish(&store, "alice", id, true).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        let stored = store.find_game(id).await.unwrap().unwrap();
        assert_eq!(stored.new_rating_player2, 105);
    }

    #[tokio::test]
    async fn outsiders_and_unknown_ids_are_refused() {
        let store = Store::in_memory().await.unwrap();
        let id = stored(&store, "alice", "bob", datetime!(2024-05-01 10:00 UTC)).await.id.unwrap();

        let err = finish(&store, "mallory", id, true).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        let err = finish(&store, "alice", id + 100, true).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
