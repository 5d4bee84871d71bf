use anyhow::{anyhow, Context};
use serde_json::json;

use crate::CommentId;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Also covers any store message whose type we do not know
    #[error("{0}")]
    Unknown(String),

    #[error("not authorized")]
    PermissionDenied,

    #[error("comment {0} not found")]
    NotFound(CommentId),

    #[error("parent comment {0} is not part of this thread")]
    InvalidParent(CommentId),

    #[error("comment content must not be empty")]
    EmptyContent,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("rate must be between 1 and 5, got {0}")]
    InvalidRate(i64),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidParent(_) => StatusCode::BAD_REQUEST,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRate(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        let message = self.to_string();
        serde_json::to_vec(&match self {
            Error::Unknown(_) => json!({
                "message": message,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": message,
                "type": "permission-denied",
            }),
            Error::NotFound(id) => json!({
                "message": message,
                "type": "not-found",
                "id": id,
            }),
            Error::InvalidParent(id) => json!({
                "message": message,
                "type": "invalid-parent",
                "id": id,
            }),
            Error::EmptyContent => json!({
                "message": message,
                "type": "empty-content",
            }),
            Error::NullByteInString(s) => json!({
                "message": message,
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidRate(r) => json!({
                "message": message,
                "type": "invalid-rate",
                "rate": r,
            }),
        })
        .expect("serializing error contents")
    }

    /// Reads the typed error out of an error body, or `None` when the body
    /// names no known type or lacks the fields that type needs
    fn from_fields(data: &serde_json::Value) -> Option<Error> {
        let id = || data.get("id").and_then(|id| id.as_i64()).map(CommentId);
        Some(match data.get("type")?.as_str()? {
            "permission-denied" => Error::PermissionDenied,
            "not-found" => Error::NotFound(id()?),
            "invalid-parent" => Error::InvalidParent(id()?),
            "empty-content" => Error::EmptyContent,
            "null-byte" => Error::NullByteInString(String::from(data.get("string")?.as_str()?)),
            "invalid-rate" => Error::InvalidRate(data.get("rate")?.as_i64()?),
            _ => return None,
        })
    }
}

/// An error as the store reported it. `message` is the store's own wording
/// and is what gets displayed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ErrorReport {
    pub error: Error,
    pub message: String,
}

impl From<Error> for ErrorReport {
    fn from(error: Error) -> ErrorReport {
        ErrorReport {
            message: error.to_string(),
            error,
        }
    }
}

impl ErrorReport {
    /// Bodies whose type is unknown, or incomplete, become `Unknown` with the
    /// store's message. A body with neither a usable type nor a message is
    /// not an error body.
    pub fn parse(body: &[u8]) -> anyhow::Result<ErrorReport> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = data
            .get("message")
            .and_then(|msg| msg.as_str())
            .map(String::from);
        Ok(match (Error::from_fields(&data), message) {
            (Some(error), Some(message)) => ErrorReport { error, message },
            (Some(error), None) => ErrorReport::from(error),
            (None, Some(message)) => ErrorReport::from(Error::Unknown(message)),
            (None, None) => return Err(anyhow!("error contents carries no message")),
        })
    }
}
