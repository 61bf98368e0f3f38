mod finish;
mod list;
mod start;

use axum::{routing::get, Router};

use crate::AppState;

pub use list::{GamePage, PAGE_SIZE};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/games", get(list::games_between).post(start::start_game))
        .route("/games/active", get(list::active_game))
        // `{key}` is a player name for GET and a game id for PATCH.
        .route("/games/{key}", get(list::player_games).patch(finish::finish_game))
}

#[cfg(test)]
pub(crate) mod testing {
    use time::OffsetDateTime;

    use crate::{models::{Game, NewGame}, store::Store};

    pub fn new_game(player1: &str, player2: &str) -> NewGame {
        NewGame {
            player1: player1.to_owned(),
            player2: player2.to_owned(),
            rated: true,
            board_size: 19,
            time: 900,
            time_increment: 10,
            rating_player1: 100,
            rating_player2: 100,
        }
    }

    pub async fn stored(store: &Store, player1: &str, player2: &str, at: OffsetDateTime) -> Game {
        store.save_game(&Game::start(new_game(player1, player2), at)).await.unwrap()
    }
}
