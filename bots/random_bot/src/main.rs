use connect4::{Board, PlayerId};
use connect4_bot_utils::Bot;
use rand::rngs::ThreadRng;
use rand::seq::IteratorRandom;

fn main() -> anyhow::Result<()> {
    RandomBot {
        rng: rand::thread_rng(),
    }
    .run()
}

struct RandomBot {
    rng: ThreadRng,
}

impl Bot for RandomBot {
    fn suggest_column(&mut self, board: &Board, _player: PlayerId) -> Option<usize> {
        board.legal_columns().choose(&mut self.rng)
    }
}
