//! SQLite-backed game and account records.
//!
//! The lobby only needs a handful of queries from persistence: games between
//! two players, games of one player, saving a game, looking up a user and
//! checking a bearer token. Schema creation lives here too so a fresh
//! database file works out of the box.

mod games;
mod users;

use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect(database_url)
            .await
            .with_context(|| format!("connect to sqlite via {database_url}"))?;
        Ok(Self { pool })
    }

    /// A store over a private in-memory database, mostly for tests.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("open in-memory sqlite")?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        let stmts = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username     TEXT PRIMARY KEY,
                member_since TEXT NOT NULL,
                token        TEXT
            );"#,
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                player1            TEXT NOT NULL,
                player2            TEXT NOT NULL,
                rated              INTEGER NOT NULL,
                board_size         INTEGER NOT NULL,
                time               INTEGER NOT NULL,
                time_increment     INTEGER NOT NULL,
                old_rating_player1 INTEGER NOT NULL,
                new_rating_player1 INTEGER NOT NULL,
                old_rating_player2 INTEGER NOT NULL,
                new_rating_player2 INTEGER NOT NULL,
                player1_winner     INTEGER NOT NULL,
                status             TEXT NOT NULL,
                timestamp          TEXT NOT NULL
            );"#,
            "CREATE INDEX IF NOT EXISTS games_by_player1 ON games (player1, timestamp);",
            "CREATE INDEX IF NOT EXISTS games_by_player2 ON games (player2, timestamp);",
        ];

        for s in stmts {
            sqlx::query(s)
                .execute(&self.pool)
                .await
                .with_context(|| format!("apply migration: {}", s.trim().lines().next().unwrap_or(s)))?;
        }
        Ok(())
    }
}
