use crate::{api, MAX_REPLY_LEVEL};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Comment content must not be empty.")]
    EmptyContent,

    #[error("Null byte in comment content is not allowed.")]
    NullByte,

    #[error("Rate must be between 1 and 5.")]
    RateOutOfRange(i64),

    #[error("Please rate the spot (1-5).")]
    MissingRate,

    #[error("Spot comments cannot be liked.")]
    LikesUnsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Replies are limited to {} levels.", MAX_REPLY_LEVEL)]
    DepthLimitExceeded { level: u32 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store refused; its message is shown as-is
    #[error("{0}")]
    Store(#[from] api::ErrorReport),

    #[error("{context}")]
    Transport {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl From<api::Error> for Error {
    fn from(err: api::Error) -> Error {
        Error::Store(err.into())
    }
}

impl Error {
    pub fn transport(context: &'static str, source: impl Into<anyhow::Error>) -> Error {
        Error::Transport {
            context,
            source: source.into(),
        }
    }

    /// True when the error was raised before any request left the client
    pub fn is_local(&self) -> bool {
        matches!(self, Error::DepthLimitExceeded { .. } | Error::Validation(_))
    }
}
