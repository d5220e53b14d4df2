pub mod error;

mod questions;
mod scores;

pub use questions::JsonQuestions;
pub use scores::ScoreFiles;
