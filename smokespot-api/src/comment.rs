use crate::{Author, Error, Time};

pub const MIN_RATE: u8 = 1;
pub const MAX_RATE: u8 = 5;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A comment as served by the store, already nested: `children` holds the
/// direct replies in the order the store returned them.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author: Author,

    /// Spot comments carry no like counter
    #[serde(rename = "likenum", default)]
    pub like_count: u64,

    pub created_at: Time,

    #[serde(default)]
    pub parent_id: Option<CommentId>,

    /// 1 to 5, only set on spot comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u8>,

    #[serde(default)]
    pub children: Vec<Comment>,
}

impl Comment {
    pub fn find_in<'a>(comments: &'a [Comment], id: CommentId) -> Option<&'a Comment> {
        for c in comments {
            if c.id == id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in(&c.children, id) {
                return Some(res);
            }
        }
        None
    }

    /// Number of comments in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Comment::subtree_len).sum::<usize>()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u8>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)?;
        if let Some(rate) = self.rate {
            crate::validate_rate(rate as i64)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentEdit {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u8>,
}

impl CommentEdit {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)?;
        if let Some(rate) = self.rate {
            crate::validate_rate(rate as i64)?;
        }
        Ok(())
    }
}
