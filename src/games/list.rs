use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{auth::AuthUser, models::Game, store::Store, AppResult, AppState};

pub const PAGE_SIZE: usize = 7;

#[derive(Debug, Deserialize)]
pub(crate) struct PlayersQuery {
    player1: String,
    player2: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    page: Option<usize>,
}

/// One page of a player's history plus their overall record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePage {
    pub games: Vec<Game>,
    pub wins: usize,
    pub losses: usize,
}

impl GamePage {
    /// Cuts page `page` (1-based, 0 read as 1) out of `games`, which must be
    /// newest first. Wins and losses count every terminated game.
    pub fn of(player: &str, games: Vec<Game>, page: usize) -> Self {
        let finished = games.iter().filter(|game| game.is_terminated());
        let wins = finished.clone().filter(|game| game.won_by(player)).count();
        let losses = finished.count() - wins;

        let skip = (page.max(1) - 1).saturating_mul(PAGE_SIZE);
        Self {
            games: games.into_iter().skip(skip).take(PAGE_SIZE).collect(),
            wins,
            losses,
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn games_between(
    State(store): State<Store>,
    _: AuthUser,
    Query(PlayersQuery { player1, player2 }): Query<PlayersQuery>,
) -> AppResult<Json<Vec<Game>>> {
    Ok(Json(store.find_games_by_players(&player1, &player2).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn active_game(
    State(store): State<Store>,
    _: AuthUser,
    Query(PlayersQuery { player1, player2 }): Query<PlayersQuery>,
) -> AppResult<Response> {
    Ok(match store.find_active_game(&player1, &player2).await? {
        Some(game) => Json(game).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

#[debug_handler(state = AppState)]
pub(crate) async fn player_games(
    State(store): State<Store>,
    _: AuthUser,
    Path(player): Path<String>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> AppResult<Json<GamePage>> {
    let games = store.find_games_of_player(&player).await?;
    Ok(Json(GamePage::of(&player, games, page.unwrap_or(1))))
}
