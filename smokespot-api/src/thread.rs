use crate::CommentId;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct SpotId(pub i64);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ThreadKind {
    Post,
    Spot,
}

/// The post or spot a comment thread hangs off
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ThreadId {
    Post(PostId),
    Spot(SpotId),
}

impl ThreadId {
    pub fn kind(&self) -> ThreadKind {
        match self {
            ThreadId::Post(_) => ThreadKind::Post,
            ThreadId::Spot(_) => ThreadKind::Spot,
        }
    }

    pub fn comments_path(&self) -> String {
        match self {
            ThreadId::Post(p) => format!("posts/{}/comments", p.0),
            ThreadId::Spot(s) => format!("spots/{}/spotcomments", s.0),
        }
    }
}

impl ThreadKind {
    pub fn comment_path(&self, comment: CommentId) -> String {
        match self {
            ThreadKind::Post => format!("posts/comments/{comment}"),
            ThreadKind::Spot => format!("spots/spotcomments/{comment}"),
        }
    }

    /// Spot comments cannot be liked
    pub fn likes_path(&self, comment: CommentId) -> Option<String> {
        match self {
            ThreadKind::Post => Some(format!("posts/comments/{comment}/likes")),
            ThreadKind::Spot => None,
        }
    }

    pub fn has_likes(&self) -> bool {
        matches!(self, ThreadKind::Post)
    }
}
