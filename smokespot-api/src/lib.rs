use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{Comment, CommentEdit, CommentId, NewComment, MAX_RATE, MIN_RATE};

mod error;
pub use error::{Error, ErrorReport};

mod thread;
pub use thread::{PostId, SpotId, ThreadId, ThreadKind};

mod user;
pub use user::{AuthToken, Author};

pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}

pub fn validate_content(s: &str) -> Result<(), Error> {
    if s.is_empty() {
        return Err(Error::EmptyContent);
    }
    validate_string(s)
}

pub fn validate_rate(rate: i64) -> Result<u8, Error> {
    if (MIN_RATE as i64..=MAX_RATE as i64).contains(&rate) {
        Ok(rate as u8)
    } else {
        Err(Error::InvalidRate(rate))
    }
}
