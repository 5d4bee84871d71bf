use crate::api::{Author, Comment, CommentId, ThreadKind, Time};

/// Deepest level that gets drawn; children of a node at this level are not
pub const MAX_RENDER_LEVEL: u32 = 2;

/// Replies whose target level reaches this are refused before submission
pub const MAX_REPLY_LEVEL: u32 = 3;

pub const INDENT_UNIT_PX: u32 = 20;

/// Something the user can do from a rendered row
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RowAction {
    Like(CommentId),
    Unlike(CommentId),
    /// `level` is the level the reply would land on
    Reply {
        parent: CommentId,
        level: u32,
    },
    Edit {
        comment: CommentId,
        current: String,
    },
    Delete(CommentId),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    pub id: CommentId,
    pub level: u32,
    pub indent_px: u32,
    pub author: Author,
    pub content: String,
    pub like_count: u64,
    pub rate: Option<u8>,
    pub created_at: Time,
    pub actions: Vec<RowAction>,
}

impl Row {
    fn for_comment(c: &Comment, level: u32, kind: ThreadKind) -> Row {
        let mut actions = Vec::with_capacity(5);
        if kind.has_likes() {
            actions.push(RowAction::Like(c.id));
            actions.push(RowAction::Unlike(c.id));
        }
        actions.push(RowAction::Reply {
            parent: c.id,
            level: level + 1,
        });
        actions.push(RowAction::Edit {
            comment: c.id,
            current: c.content.clone(),
        });
        actions.push(RowAction::Delete(c.id));
        Row {
            id: c.id,
            level,
            indent_px: level * INDENT_UNIT_PX,
            author: c.author.clone(),
            content: c.content.clone(),
            like_count: c.like_count,
            rate: c.rate,
            created_at: c.created_at,
            actions,
        }
    }
}

/// Flattens a thread into rows, depth-first and in store order, stopping at
/// `MAX_RENDER_LEVEL`.
pub fn render(forest: &[Comment], kind: ThreadKind) -> Vec<Row> {
    let mut rows = Vec::new();
    render_into(&mut rows, forest, 0, kind);
    rows
}

fn render_into(rows: &mut Vec<Row>, comments: &[Comment], level: u32, kind: ThreadKind) {
    for c in comments {
        rows.push(Row::for_comment(c, level, kind));
        if !c.children.is_empty() && level < MAX_RENDER_LEVEL {
            render_into(rows, &c.children, level + 1, kind);
        }
    }
}
