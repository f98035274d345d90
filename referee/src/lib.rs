//! Runs Connect Four matches between humans, bot processes and the
//! suggestion service.

mod config;
mod error;
mod game;
mod player;
mod recording;
mod view;
pub use config::*;
pub use error::*;
pub use game::*;
pub use player::*;
pub use recording::*;
pub use view::*;
