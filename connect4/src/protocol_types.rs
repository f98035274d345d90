use serde::{Deserialize, Serialize};

use crate::{Board, PlayerId};

fn default_player() -> u8 {
    PlayerId::P2.encode()
}

/// Body of a request to the move-suggestion service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// The full grid, see [`Board::to_grid()`].
    pub board: Vec<Vec<u8>>,
    /// The wire code of the player to move. Older clients leave this out,
    /// in which case the service plays the second player.
    #[serde(default = "default_player")]
    pub player: u8,
}

impl SuggestionRequest {
    pub fn new(board: &Board, player: PlayerId) -> Self {
        Self {
            board: board.to_grid(),
            player: player.encode(),
        }
    }
}

/// Answer of the move-suggestion service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    /// The chosen column, or `None` if there is no legal move.
    pub column: Option<usize>,
}

/// Request for a bot process to do something.
///
/// Bots read one JSON request per line from stdin and answer with one
/// JSON response per line on stdout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BotRequest {
    /// Request to reset the bot's state for a new round.
    ///
    /// The response should be an [`Okay`].
    NewGame { player: PlayerId },
    /// Request to choose a column.
    ///
    /// The response should be a [`SuggestionResponse`].
    SuggestMove { board: Vec<Vec<u8>>, player: PlayerId },
    /// The bot should shut down. There is no response.
    Bye,
}

/// Dummy struct for use in bot communication.
///
/// Used to signal an acknowledgement without data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Okay();
