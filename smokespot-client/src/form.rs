use crate::{
    api::{self, CommentEdit, CommentId, NewComment, ThreadKind},
    ValidationError,
};

/// What the user typed into a comment, reply or edit box
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentForm {
    pub content: String,
    pub rate: Option<i64>,
}

impl CommentForm {
    pub fn new(content: impl Into<String>) -> CommentForm {
        CommentForm {
            content: content.into(),
            rate: None,
        }
    }

    pub fn with_rate(mut self, rate: i64) -> CommentForm {
        self.rate = Some(rate);
        self
    }

    fn content(&self) -> Result<String, ValidationError> {
        match api::validate_content(&self.content) {
            Ok(()) => Ok(self.content.clone()),
            Err(api::Error::EmptyContent) => Err(ValidationError::EmptyContent),
            Err(_) => Err(ValidationError::NullByte),
        }
    }

    /// Post comments never carry a rate; spot comments may
    fn rate(&self, kind: ThreadKind) -> Result<Option<u8>, ValidationError> {
        match (kind, self.rate) {
            (ThreadKind::Post, _) | (ThreadKind::Spot, None) => Ok(None),
            (ThreadKind::Spot, Some(r)) => api::validate_rate(r)
                .map(Some)
                .map_err(|_| ValidationError::RateOutOfRange(r)),
        }
    }

    pub fn new_comment(
        &self,
        kind: ThreadKind,
        parent_id: Option<CommentId>,
    ) -> Result<NewComment, ValidationError> {
        let content = self.content()?;
        let rate = self.rate(kind)?;
        if kind == ThreadKind::Spot && parent_id.is_none() && rate.is_none() {
            return Err(ValidationError::MissingRate);
        }
        Ok(NewComment {
            content,
            parent_id,
            rate,
        })
    }

    /// `rated` tells whether the comment being edited carries a rate; on
    /// spots that rate has to be given again
    pub fn edit(&self, kind: ThreadKind, rated: bool) -> Result<CommentEdit, ValidationError> {
        let content = self.content()?;
        let rate = self.rate(kind)?;
        if kind == ThreadKind::Spot && rated && rate.is_none() {
            return Err(ValidationError::MissingRate);
        }
        Ok(CommentEdit { content, rate })
    }
}
