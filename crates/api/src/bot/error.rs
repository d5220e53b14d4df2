use core::fmt::{self, Display};

pub enum Error {
    UnsupportedInteraction,
    UnknownUser,
    UnknownChannel,
    UnknownCommandName,
    UnknownParamName,
    InvalidParams,
    Fatal,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnsupportedInteraction => "Unsupported interaction.",
            Self::UnknownUser => "Unknown user.",
            Self::UnknownChannel => "Trivia can only be played in a channel.",
            Self::UnknownCommandName => "Unknown command name.",
            Self::UnknownParamName => "Unknown parameter name.",
            Self::InvalidParams => "Invalid parameter list.",
            Self::Fatal => "Oops! We have encountered an unrecoverable error on our end.",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
