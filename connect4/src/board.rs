use crate::{ColumnFull, InvalidGrid, PlayerId};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// The content of a single grid position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(PlayerId),
}

impl Cell {
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The wire encoding: `0` for an empty cell, the player's code otherwise.
    pub fn encode(self) -> u8 {
        self.player().map_or(0, PlayerId::encode)
    }

    pub fn decode(value: u8) -> Option<Cell> {
        match value {
            0 => Some(Cell::Empty),
            _ => PlayerId::decode(value).map(Cell::Occupied),
        }
    }
}

/// The 6 x 7 grid.
///
/// Rows are numbered from 0 (top) to 5 (bottom), columns from 0 to 6.
//
// Invariant: within a column, the occupied cells form a contiguous run
// starting at the bottom row. Every mutation goes through `place()` (which
// only accepts the landing cell) or `reset()`, and `from_grid()` rejects
// grids that violate it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Panics if the coordinates are out of range.
    pub fn get(&self, row: usize, column: usize) -> Cell {
        self.cells[row][column]
    }

    /// Finds the landing row for a piece dropped into `column`.
    ///
    /// Scans from the bottom row upwards and returns the first empty row.
    /// The board is not modified; pass the result to [`Self::place()`].
    ///
    /// Panics if `column` is not in `0..COLS`. Column indices come from
    /// trusted callers, untrusted input must be range-checked first.
    pub fn drop_piece(&self, column: usize) -> Result<usize, ColumnFull> {
        assert!(column < COLS, "column index {} out of range", column);
        (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][column].is_empty())
            .ok_or(ColumnFull { column })
    }

    /// Marks the cell as occupied by `player`.
    ///
    /// The cell must be the landing cell of its column, as returned by
    /// [`Self::drop_piece()`].
    pub fn place(&mut self, row: usize, column: usize, player: PlayerId) {
        assert!(
            row < ROWS && column < COLS,
            "cell ({}, {}) out of range",
            row,
            column
        );
        debug_assert_eq!(
            self.drop_piece(column),
            Ok(row),
            "({}, {}) is not the landing cell of its column",
            row,
            column
        );
        self.cells[row][column] = Cell::Occupied(player);
    }

    /// Drops a piece and places it in one step. Returns the landing row.
    pub fn play(&mut self, column: usize, player: PlayerId) -> Result<usize, ColumnFull> {
        let row = self.drop_piece(column)?;
        self.place(row, column, player);
        Ok(row)
    }

    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; COLS]; ROWS];
    }

    pub fn is_column_full(&self, column: usize) -> bool {
        !self.cells[0][column].is_empty()
    }

    /// True iff no column has an empty cell left.
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|column| self.is_column_full(column))
    }

    /// The columns that can still take a piece, in ascending order.
    pub fn legal_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLS).filter(|&column| !self.is_column_full(column))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    /// Encodes the board row by row, top row first.
    pub fn to_grid(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.encode()).collect())
            .collect()
    }

    /// Decodes a board received from outside, e.g. in a suggestion request.
    pub fn from_grid(grid: &[Vec<u8>]) -> Result<Self, InvalidGrid> {
        if grid.len() != ROWS {
            return Err(InvalidGrid::WrongRowCount { found: grid.len() });
        }
        let mut board = Board::new();
        for (row, values) in grid.iter().enumerate() {
            if values.len() != COLS {
                return Err(InvalidGrid::WrongColumnCount {
                    row,
                    found: values.len(),
                });
            }
            for (column, &value) in values.iter().enumerate() {
                board.cells[row][column] = Cell::decode(value).ok_or(
                    InvalidGrid::UnknownCellValue { row, column, value },
                )?;
            }
        }
        // Gravity: no occupied cell may sit on top of an empty one
        for row in 0..ROWS - 1 {
            for column in 0..COLS {
                if !board.cells[row][column].is_empty() && board.cells[row + 1][column].is_empty()
                {
                    return Err(InvalidGrid::FloatingPiece { row, column });
                }
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
