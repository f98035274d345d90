use connect4::{check_win, Board, PlayerId};
use tracing::trace;

use crate::Bot;

/// Score of a position in which the searching player has won.
pub const WIN_SCORE: i32 = 1000;

/// Search depth used by the suggestion service unless configured otherwise.
pub const DEFAULT_DEPTH: u32 = 4;

/// Depth-limited alpha-beta search.
///
/// Positions are only told apart by forced wins and losses within the
/// horizon; everything else scores zero, and ties go to the leftmost column.
#[derive(Clone, Copy, Debug)]
pub struct MinimaxBot {
    /// Plies searched after the candidate move.
    pub depth: u32,
}

impl Default for MinimaxBot {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}

impl MinimaxBot {
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    pub fn best_column(&self, board: &Board, player: PlayerId) -> Option<usize> {
        // Take a win if there is one
        for column in board.legal_columns() {
            let mut child = *board;
            if let Ok(row) = child.play(column, player) {
                if check_win(&child, row, column) {
                    return Some(column);
                }
            }
        }

        let mut best: Option<(usize, i32)> = None;
        for column in board.legal_columns() {
            let mut child = *board;
            if child.play(column, player).is_err() {
                continue;
            }
            let score = minimax(&child, self.depth, false, player, i32::MIN, i32::MAX);
            trace!(column, score, "Evaluated candidate");
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((column, score));
            }
        }
        best.map(|(column, _)| column)
    }
}

impl Bot for MinimaxBot {
    fn suggest_column(&mut self, board: &Board, player: PlayerId) -> Option<usize> {
        self.best_column(board, player)
    }
}

// Scores `board` from the point of view of `me`. When `maximizing`, it's
// `me` to move, otherwise the opponent.
fn minimax(
    board: &Board,
    depth: u32,
    maximizing: bool,
    me: PlayerId,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    if depth == 0 {
        return 0;
    }
    let to_move = if maximizing { me } else { me.other() };
    let mut best = None;
    for column in board.legal_columns() {
        let mut child = *board;
        let Ok(row) = child.play(column, to_move) else {
            continue;
        };
        if check_win(&child, row, column) {
            return if maximizing { WIN_SCORE } else { -WIN_SCORE };
        }
        let score = minimax(&child, depth - 1, !maximizing, me, alpha, beta);
        if maximizing {
            best = Some(best.map_or(score, |b: i32| b.max(score)));
            alpha = alpha.max(score);
        } else {
            best = Some(best.map_or(score, |b: i32| b.min(score)));
            beta = beta.min(score);
        }
        if beta <= alpha {
            break;
        }
    }
    // A full board is a draw
    best.unwrap_or(0)
}
