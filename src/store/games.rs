use time::UtcOffset;

use crate::models::{Game, GameError, GameStatus};

use super::Store;

const GAME_COLUMNS: &str = "id,player1,player2,rated,board_size,time,time_increment,\
    old_rating_player1,new_rating_player1,old_rating_player2,new_rating_player2,\
    player1_winner,status,timestamp";

impl Store {
    /// Inserts a new game, or overwrites the stored one when `game.id` is set.
    /// Returns the game with its id filled in. Timestamps are stored in UTC
    /// so that ordering by the text column is chronological.
    pub async fn save_game(&self, game: &Game) -> sqlx::Result<Game> {
        let mut saved = game.clone();
        match game.id {
            None => {
                let result = sqlx::query(
                    "INSERT INTO games (player1,player2,rated,board_size,time,time_increment,\
                    old_rating_player1,new_rating_player1,old_rating_player2,new_rating_player2,\
                    player1_winner,status,timestamp) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?)",
                )
                .bind(&game.player1)
                .bind(&game.player2)
                .bind(game.rated)
                .bind(game.board_size)
                .bind(game.time)
                .bind(game.time_increment)
                .bind(game.old_rating_player1)
                .bind(game.new_rating_player1)
                .bind(game.old_rating_player2)
                .bind(game.new_rating_player2)
                .bind(game.player1_winner)
                .bind(game.status)
                .bind(game.timestamp.to_offset(UtcOffset::UTC))
                .execute(&self.pool)
                .await?;
                saved.id = Some(result.last_insert_rowid());
            }
            Some(id) => {
                sqlx::query(
                    "UPDATE games SET player1=?,player2=?,rated=?,board_size=?,time=?,time_increment=?,\
                    old_rating_player1=?,new_rating_player1=?,old_rating_player2=?,new_rating_player2=?,\
                    player1_winner=?,status=?,timestamp=? WHERE id=?",
                )
                .bind(&game.player1)
                .bind(&game.player2)
                .bind(game.rated)
                .bind(game.board_size)
                .bind(game.time)
                .bind(game.time_increment)
                .bind(game.old_rating_player1)
                .bind(game.new_rating_player1)
                .bind(game.old_rating_player2)
                .bind(game.new_rating_player2)
                .bind(game.player1_winner)
                .bind(game.status)
                .bind(game.timestamp.to_offset(UtcOffset::UTC))
                .bind(id)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(saved)
    }

    pub async fn find_game(&self, id: i64) -> sqlx::Result<Option<Game>> {
        sqlx::query_as(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id=?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Games where `player1` and `player2` held exactly those seats, newest first.
    pub async fn find_games_by_players(&self, player1: &str, player2: &str) -> sqlx::Result<Vec<Game>> {
        sqlx::query_as(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE player1=? AND player2=? ORDER BY timestamp DESC, id DESC"
        ))
        .bind(player1)
        .bind(player2)
        .fetch_all(&self.pool)
        .await
    }

    /// The newest game between the two seats, if it is still being played.
    pub async fn find_active_game(&self, player1: &str, player2: &str) -> sqlx::Result<Option<Game>> {
        let newest: Option<Game> = sqlx::query_as(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE player1=? AND player2=? ORDER BY timestamp DESC, id DESC LIMIT 1"
        ))
        .bind(player1)
        .bind(player2)
        .fetch_optional(&self.pool)
        .await?;

        Ok(newest.filter(|game| !game.is_terminated()))
    }

    /// Every game `player` took part in, newest first.
    pub async fn find_games_of_player(&self, player: &str) -> sqlx::Result<Vec<Game>> {
        sqlx::query_as(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE player1=? OR player2=? ORDER BY timestamp DESC, id DESC"
        ))
        .bind(player)
        .bind(player)
        .fetch_all(&self.pool)
        .await
    }

    /// Applies the outcome to game `id` and stores the new ratings.
    ///
    /// The write only goes through while the stored row is still in
    /// progress, so two racing completions cannot both rate the game.
    pub async fn finish_game(&self, id: i64, player1_won: bool) -> anyhow::Result<Game> {
        let mut game = self.find_game(id).await?.ok_or(GameError::NotFound(id))?;
        game.terminate(player1_won)?;

        let result = sqlx::query(
            "UPDATE games SET new_rating_player1=?,new_rating_player2=?,player1_winner=?,status=? \
            WHERE id=? AND status=?",
        )
        .bind(game.new_rating_player1)
        .bind(game.new_rating_player2)
        .bind(game.player1_winner)
        .bind(game.status)
        .bind(id)
        .bind(GameStatus::InProgress)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GameError::AlreadyTerminated.into());
        }
        tracing::info!(
            id,
            player1 = %game.player1,
            player2 = %game.player2,
            new1 = game.new_rating_player1,
            new2 = game.new_rating_player2,
            "game finished"
        );
        Ok(game)
    }
}
