pub use board::*;
pub use controller::*;
pub use errors::*;
pub use player::*;
pub use protocol_types::*;
pub use win::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod controller;
mod errors;
mod player;
mod protocol_types;
mod visualization;
mod win;
