use connect4::{Board, GameEvent, Observer, Outcome, PlayerId};

/// Prints the match to stdout as it happens.
///
/// The view keeps its own copy of the board, built from the events alone.
pub struct ConsoleView {
    names: [String; 2],
    board: Board,
}

impl ConsoleView {
    pub fn new(names: [String; 2]) -> Self {
        Self {
            names,
            board: Board::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn name(&self, player: PlayerId) -> &str {
        &self.names[player.index()]
    }
}

impl Observer for ConsoleView {
    fn notify(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::PieceDropped {
                row,
                column,
                player,
            } => {
                self.board.place(row, column, player);
                println!(
                    "{} drops {} into column {}\n{}",
                    self.name(player),
                    player.symbol(),
                    column + 1,
                    self.board
                );
            }
            GameEvent::TurnChanged(player) => {
                println!("{}'s turn ({})", self.name(player), player.symbol());
            }
            GameEvent::RoundOver { outcome, scores } => {
                match outcome {
                    Outcome::Winner(player) => println!("{} wins!", self.name(player)),
                    Outcome::Draw => println!("It's a draw"),
                }
                println!(
                    "Score: {} {} - {} {}",
                    self.names[0],
                    scores.of(PlayerId::P1),
                    scores.of(PlayerId::P2),
                    self.names[1]
                );
            }
            GameEvent::Reset => {
                self.board.reset();
                println!("New round\n{}", self.board);
            }
        }
    }
}
