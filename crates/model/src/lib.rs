#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod question;
pub mod score;

pub use question::Question;
pub use score::{standings, ScoreBoard, Standing};
