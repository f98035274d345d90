use serde::{Deserialize, Serialize};

/// One of the two seats at the table.
///
/// On the wire, players are encoded as `1` and `2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PlayerId {
    /// Moves first in every round.
    P1,
    P2,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::P1, PlayerId::P2];

    pub fn other(self) -> PlayerId {
        match self {
            PlayerId::P1 => PlayerId::P2,
            PlayerId::P2 => PlayerId::P1,
        }
    }

    /// Index into per-player arrays such as scores and seats.
    pub fn index(self) -> usize {
        match self {
            PlayerId::P1 => 0,
            PlayerId::P2 => 1,
        }
    }

    /// The integer used for this player's stones in the grid encoding.
    pub fn encode(self) -> u8 {
        match self {
            PlayerId::P1 => 1,
            PlayerId::P2 => 2,
        }
    }

    pub fn decode(value: u8) -> Option<PlayerId> {
        match value {
            1 => Some(PlayerId::P1),
            2 => Some(PlayerId::P2),
            _ => None,
        }
    }

    /// Character used when rendering the board as text.
    pub fn symbol(self) -> char {
        match self {
            PlayerId::P1 => 'X',
            PlayerId::P2 => 'O',
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.encode())
    }
}

impl From<PlayerId> for u8 {
    fn from(player: PlayerId) -> u8 {
        player.encode()
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PlayerId::decode(value).ok_or_else(|| format!("{} is not a player, expected 1 or 2", value))
    }
}
