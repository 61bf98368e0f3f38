//! Two-tier rating adjustment applied when a rated game ends.

/// Points moved from loser to winner: 5 normally, 20 when the loser was
/// rated above the winner.
pub fn delta(winner: u32, loser: u32) -> u32 {
    5 + 15 * (loser / winner.saturating_add(1)).min(1)
}

/// New `(player1, player2)` ratings after a game.
///
/// Both sides move by the same delta, computed once from the ratings the
/// players had before the game. Ratings saturate at both ends of `u32`.
pub fn apply_result(old1: u32, old2: u32, player1_won: bool, rated: bool) -> (u32, u32) {
    if !rated {
        return (old1, old2);
    }

    if player1_won {
        let d = delta(old1, old2);
        (old1.saturating_add(d), old2.saturating_sub(d))
    } else {
        let d = delta(old2, old1);
        (old1.saturating_sub(d), old2.saturating_add(d))
    }
}
