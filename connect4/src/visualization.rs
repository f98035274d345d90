use crate::{Board, Cell, COLS, ROWS};

/// Renders the board as text, with 1-based column numbers on top.
///
/// After P1 plays column 2, P2 column 3 and P1 column 3 again:
///
/// ```text
///   1 2 3 4 5 6 7
/// ╭───────────────╮
/// │ · · · · · · · │
/// │ · · · · · · · │
/// │ · · · · · · · │
/// │ · · · · · · · │
/// │ · · X · · · · │
/// │ · X O · · · · │
/// ╰───────────────╯
/// ```
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, " ")?;
        for column in 0..COLS {
            write!(f, " {}", column + 1)?;
        }
        writeln!(f)?;
        writeln!(f, "╭{}╮", "─".repeat(2 * COLS + 1))?;
        for row in 0..ROWS {
            write!(f, "│")?;
            for column in 0..COLS {
                let symbol = match self.get(row, column) {
                    Cell::Empty => '·',
                    Cell::Occupied(player) => player.symbol(),
                };
                write!(f, " {}", symbol)?;
            }
            writeln!(f, " │")?;
        }
        write!(f, "╰{}╯", "─".repeat(2 * COLS + 1))
    }
}
