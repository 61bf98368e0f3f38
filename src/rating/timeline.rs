use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use crate::models::Game;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub rating: u32,
}

/// Builds the public rating timeline of `username`.
///
/// `games` must be ordered newest first. Only the newest result of each
/// calendar day (as seen from `offset`) is kept. A zero-rating anchor at
/// `member_since` always goes last, even though it is the oldest point.
/// Games that have not terminated yet contribute nothing.
pub fn rating_timeline(
    username: &str,
    member_since: OffsetDateTime,
    games: &[Game],
    offset: UtcOffset,
) -> Vec<RatingPoint> {
    let points = games.iter().filter(|game| game.is_terminated()).filter_map(|game| {
        game.rating_after(username).map(|rating| RatingPoint {
            time: game.timestamp,
            rating,
        })
    });

    let mut daily: Vec<RatingPoint> = Vec::new();
    let mut last_day = None;
    for point in points {
        let day = point.time.to_offset(offset).date();
        if last_day != Some(day) {
            daily.push(point);
            last_day = Some(day);
        }
    }

    daily.push(RatingPoint {
        time: member_since,
        rating: 0,
    });
    daily
}

#[cfg(test)]
mod tests {
    use time::macros::{datetime, offset};

    use super::*;
    use crate::models::{GameStatus, NewGame};

    fn finished(player1: &str, player2: &str, at: OffsetDateTime, new1: u32, new2: u32) -> Game {
        let mut game = Game::start(
            NewGame {
                player1: player1.to_owned(),
                player2: player2.to_owned(),
                rated: true,
                board_size: 9,
                time: 300,
                time_increment: 0,
                rating_player1: new1,
                rating_player2: new2,
            },
            at,
        );
        game.status = GameStatus::Terminated;
        game
    }

    #[test]
    fn keeps_newest_point_per_day_and_anchors_last() {
        let games = vec![
            finished("alice", "bob", datetime!(2024-01-03 18:00 UTC), 40, 0),
            finished("bob", "alice", datetime!(2024-01-03 09:00 UTC), 0, 35),
            finished("alice", "carol", datetime!(2024-01-01 10:00 UTC), 20, 0),
        ];
        let since = datetime!(2023-12-31 08:00 UTC);

        let timeline = rating_timeline("alice", since, &games, UtcOffset::UTC);

        assert_eq!(
            timeline,
            vec![
                RatingPoint { time: datetime!(2024-01-03 18:00 UTC), rating: 40 },
                RatingPoint { time: datetime!(2024-01-01 10:00 UTC), rating: 20 },
                RatingPoint { time: since, rating: 0 },
            ]
        );
    }

    #[test]
    fn calendar_day_follows_offset() {
        // 23:30 UTC on the 1st and 00:30 UTC on the 2nd share a day at -02:00.
        let games = vec![
            finished("alice", "bob", datetime!(2024-01-02 00:30 UTC), 30, 0),
            finished("alice", "bob", datetime!(2024-01-01 23:30 UTC), 25, 0),
        ];
        let since = datetime!(2023-06-01 00:00 UTC);

        let utc = rating_timeline("alice", since, &games, UtcOffset::UTC);
        assert_eq!(utc.len(), 3);

        let shifted = rating_timeline("alice", since, &games, offset!(-2));
        assert_eq!(shifted.len(), 2);
        assert_eq!(shifted[0].rating, 30);
    }

    #[test]
    fn no_games_yields_only_anchor() {
        let since = datetime!(2024-05-05 05:05 UTC);
        let timeline = rating_timeline("dave", since, &[], UtcOffset::UTC);
        assert_eq!(timeline, vec![RatingPoint { time: since, rating: 0 }]);
    }

    #[test]
    fn in_progress_games_are_skipped() {
        let mut open = finished("alice", "bob", datetime!(2024-02-02 10:00 UTC), 99, 0);
        open.status = GameStatus::InProgress;
        let since = datetime!(2024-01-01 00:00 UTC);

        let timeline = rating_timeline("alice", since, &[open], UtcOffset::UTC);
        assert_eq!(timeline.len(), 1);
    }
}
