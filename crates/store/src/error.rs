use core::fmt::{self, Display};
use std::io;

#[derive(Debug)]
pub enum Error {
    /// The channel name cannot be used as a file name.
    BadChannel,
    /// The repository holds no well-formed question.
    NoQuestions,
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadChannel => f.write_str("Channel name is not a valid file name."),
            Self::NoQuestions => f.write_str("The question repository is empty."),
            Self::Io(err) => write!(f, "Cannot access the store: {err}."),
            Self::Json(err) => write!(f, "Malformed JSON in the store: {err}."),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
