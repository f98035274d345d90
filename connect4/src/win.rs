use crate::{Board, Cell, COLS, ROWS};

/// Number of pieces in a row needed to win.
pub const WINNING_LENGTH: usize = 4;

/// Vertical, horizontal, diagonal down-right and diagonal down-left, as
/// (row delta, column delta). Each one is walked in both signs.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Does the piece at `(row, column)` complete a line of four?
///
/// The player owning that cell is the candidate. Only lines through this
/// cell are considered, so this is meant to be called right after every
/// placement with the landing cell. An empty cell never wins.
pub fn check_win(board: &Board, row: usize, column: usize) -> bool {
    let Cell::Occupied(player) = board.get(row, column) else {
        return false;
    };
    DIRECTIONS.iter().any(|&(dr, dc)| {
        let count = 1
            + count_consecutive(board, row, column, dr, dc, Cell::Occupied(player))
            + count_consecutive(board, row, column, -dr, -dc, Cell::Occupied(player));
        count >= WINNING_LENGTH
    })
}

// Counts the cells equal to `cell` walking away from the anchor, not
// including the anchor. At most WINNING_LENGTH - 1 cells are looked at.
fn count_consecutive(
    board: &Board,
    row: usize,
    column: usize,
    dr: isize,
    dc: isize,
    cell: Cell,
) -> usize {
    let mut count = 0;
    let (mut r, mut c) = (row as isize + dr, column as isize + dc);
    while count < WINNING_LENGTH - 1
        && (0..ROWS as isize).contains(&r)
        && (0..COLS as isize).contains(&c)
        && board.get(r as usize, c as usize) == cell
    {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}
