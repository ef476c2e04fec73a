pub mod code;
pub mod game;

pub use code::{Code, ParseCodeError};
pub use game::{Difficulty, Game, GameStatus, GuessRecord};
