mod minimax;
pub use minimax::*;

use std::io::{BufRead, Write};

use connect4::{Board, BotRequest, Okay, PlayerId, SuggestionResponse};
use tracing::debug;

/// A trait to simplify writing bots.
pub trait Bot {
    fn new_game(&mut self, _player: PlayerId) {}

    /// Chooses a column for `player`, or `None` if the board has no legal move.
    fn suggest_column(&mut self, board: &Board, player: PlayerId) -> Option<usize>;

    fn run(&mut self) -> anyhow::Result<()> {
        // Communication happens through stdin/stdout.
        // Stderr can be used for logging.
        let stdin = std::io::stdin().lock();
        let stdout = std::io::stdout().lock();
        self.run_with(stdin, stdout)
    }

    /// Answers requests from `input` until it is closed or a
    /// [`BotRequest::Bye`] arrives.
    fn run_with<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> anyhow::Result<()> {
        let mut buf = String::new();

        loop {
            // Read the next line into buf
            buf.clear(); // because read_line() appends to the buffer
            let num_bytes_read = input.read_line(&mut buf)?;
            if num_bytes_read == 0 {
                // 0 bytes read means EOF - the referee has exited.
                break Ok(());
            }

            let req = serde_json::from_str::<BotRequest>(buf.trim_end())?;
            debug!(?req, "Received request");

            match req {
                BotRequest::NewGame { player } => {
                    self.new_game(player);
                    serde_json::to_writer(&mut output, &Okay())?;
                }
                BotRequest::SuggestMove { board, player } => {
                    let board = Board::from_grid(&board)?;
                    let column = self.suggest_column(&board, player);
                    serde_json::to_writer(&mut output, &SuggestionResponse { column })?;
                }
                BotRequest::Bye => break Ok(()),
            }
            writeln!(output)?;
            output.flush()?;
        }
    }
}
