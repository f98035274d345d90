use crate::PlayerId;

/// The error type for [`Board::drop_piece()`](crate::Board::drop_piece), i.e. the column
/// has no empty cell left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnFull {
    pub column: usize,
}

impl std::error::Error for ColumnFull {}

impl std::fmt::Display for ColumnFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column {} is full", self.column)
    }
}

/// The error type for [`Board::from_grid()`](crate::Board::from_grid).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidGrid {
    WrongRowCount { found: usize },
    WrongColumnCount { row: usize, found: usize },
    UnknownCellValue { row: usize, column: usize, value: u8 },
    FloatingPiece { row: usize, column: usize },
}

impl std::error::Error for InvalidGrid {}

impl std::fmt::Display for InvalidGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidGrid::WrongRowCount { found } => {
                write!(f, "Expected {} rows, found {}", crate::ROWS, found)
            }
            InvalidGrid::WrongColumnCount { row, found } => write!(
                f,
                "Expected {} cells in row {}, found {}",
                crate::COLS,
                row,
                found
            ),
            InvalidGrid::UnknownCellValue { row, column, value } => write!(
                f,
                "Cell ({}, {}) holds {}, but only 0, 1 and 2 are allowed",
                row, column, value
            ),
            InvalidGrid::FloatingPiece { row, column } => write!(
                f,
                "The piece at ({}, {}) has an empty cell beneath it",
                row, column
            ),
        }
    }
}

/// Why an automated move source did not produce a usable column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestionFailure {
    /// No answer arrived within the configured time.
    Timeout,
    /// The request could not be delivered or the answer could not be read.
    Transport(String),
    /// An answer arrived but could not be understood.
    Malformed(String),
    /// The source answered that it has no move to offer.
    NoMoveAvailable,
    ColumnOutOfRange { column: usize },
    ColumnFull(ColumnFull),
}

impl std::error::Error for SuggestionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SuggestionFailure::ColumnFull(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for SuggestionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionFailure::Timeout => write!(f, "The move source did not answer in time"),
            SuggestionFailure::Transport(msg) => {
                write!(f, "Could not reach the move source: {}", msg)
            }
            SuggestionFailure::Malformed(msg) => {
                write!(f, "The move source sent an unreadable answer: {}", msg)
            }
            SuggestionFailure::NoMoveAvailable => {
                write!(f, "The move source had no move to offer")
            }
            SuggestionFailure::ColumnOutOfRange { column } => write!(
                f,
                "The move source chose column {}, which is not on the board",
                column
            ),
            SuggestionFailure::ColumnFull(err) => {
                write!(f, "The move source chose a full column ({})", err.column)
            }
        }
    }
}

/// What the controller did after a failed automated attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaultResolution {
    /// The same player is awaiting a move again. `attempt` counts the failed
    /// attempts in this turn so far.
    Retry { attempt: u32 },
    /// The attempts were used up and the turn passed to the other player.
    Forfeited,
}

/// The error type for the move entry points of [`TurnController`](crate::TurnController).
///
/// None of these leave a mark on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveError {
    /// The controller is not waiting for this kind of input right now.
    NotAwaitingMove,
    /// A human move arrived while an automated player is to move.
    NotHumanTurn { turn: PlayerId },
    ColumnFull(ColumnFull),
    /// The ticket is not the outstanding suggestion request.
    StaleTicket { ticket: u64 },
    /// The automated suggestion was unusable and counted as a failed attempt.
    SuggestionRejected {
        failure: SuggestionFailure,
        resolution: FaultResolution,
    },
}

impl std::error::Error for MoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MoveError::ColumnFull(err) => Some(err),
            MoveError::SuggestionRejected { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::NotAwaitingMove => write!(f, "No move is expected right now"),
            MoveError::NotHumanTurn { turn } => {
                write!(f, "It is the turn of {}, who is not a human", turn)
            }
            MoveError::ColumnFull(err) => write!(f, "{}", err),
            MoveError::StaleTicket { ticket } => {
                write!(f, "Suggestion request {} is no longer outstanding", ticket)
            }
            MoveError::SuggestionRejected {
                failure: _,
                resolution: FaultResolution::Retry { attempt },
            } => write!(
                f,
                "The automated move was rejected (attempt {}), asking again",
                attempt
            ),
            MoveError::SuggestionRejected {
                failure: _,
                resolution: FaultResolution::Forfeited,
            } => write!(f, "The automated move was rejected and the turn is forfeited"),
        }
    }
}
