use quickcheck::{Arbitrary, Gen};

use crate::{Board, PlayerId, COLS, ROWS};

/// A sequence of column choices, not necessarily legal.
#[derive(Clone, Debug)]
pub struct ColumnSequence(pub Vec<usize>);

impl Arbitrary for ColumnSequence {
    fn arbitrary(g: &mut Gen) -> Self {
        // Long enough to fill some columns completely
        let len = usize::arbitrary(g) % (2 * ROWS * COLS);
        ColumnSequence(
            (0..len)
                .map(|_| usize::from(u8::arbitrary(g)) % COLS)
                .collect(),
        )
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(ColumnSequence))
    }
}

/// Four cells in a straight line that fit on the board.
#[derive(Clone, Debug)]
pub struct LineOfFour {
    pub cells: [(usize, usize); 4],
    pub player: PlayerId,
}

impl Arbitrary for LineOfFour {
    fn arbitrary(g: &mut Gen) -> Self {
        let (dr, dc) = *g.choose(&[(1isize, 0isize), (0, 1), (1, 1), (1, -1)]).unwrap();
        let player = *g.choose(&PlayerId::ALL).unwrap();
        // Pick a start cell until the whole line fits
        loop {
            let row = (u8::arbitrary(g) as usize % ROWS) as isize;
            let col = (u8::arbitrary(g) as usize % COLS) as isize;
            let end_row = row + 3 * dr;
            let end_col = col + 3 * dc;
            if (0..ROWS as isize).contains(&end_row) && (0..COLS as isize).contains(&end_col) {
                let cells = [0, 1, 2, 3].map(|k| ((row + k * dr) as usize, (col + k * dc) as usize));
                break LineOfFour { cells, player };
            }
        }
    }
}

impl LineOfFour {
    /// Builds a legal board holding the line, filling the cells beneath it
    /// with the other player's pieces.
    pub fn to_board(&self) -> Board {
        let mut cells = self.cells;
        // Bottom cells first, so that vertical lines stack up
        cells.sort_by_key(|&(row, _)| std::cmp::Reverse(row));
        let mut board = Board::new();
        for (row, column) in cells {
            while board.drop_piece(column) != Ok(row) {
                board.play(column, self.player.other()).unwrap();
            }
            board.place(row, column, self.player);
        }
        board
    }
}
