use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;

use crate::{
    api::{CommentId, ThreadId, ThreadKind},
    render, CommentForm, CommentStore, Error, Row, RowAction, ValidationError, MAX_REPLY_LEVEL,
};

/// Confirmation shown after a mutation went through
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notice {
    /// Spot threads word this confirmation differently
    CommentAdded(ThreadKind),
    ReplyAdded,
    CommentUpdated,
    CommentDeleted,
    CommentLiked,
    CommentUnliked,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Notice::CommentAdded(ThreadKind::Post) => "Comment added!",
            Notice::CommentAdded(ThreadKind::Spot) => "Comment added successfully!",
            Notice::ReplyAdded => "Reply added!",
            Notice::CommentUpdated => "Comment updated successfully!",
            Notice::CommentDeleted => "Comment deleted successfully!",
            Notice::CommentLiked => "Comment liked successfully!",
            Notice::CommentUnliked => "Comment unliked successfully!",
        })
    }
}

#[derive(Default)]
struct View {
    /// Sequence number of the reload currently displayed
    applied: u64,
    rows: Vec<Row>,
}

/// Owns everything about the thread being viewed. Rows are only ever
/// replaced wholesale by a reload; mutations never touch them directly.
pub struct ThreadController<S> {
    store: S,
    thread: ThreadId,
    issued: AtomicU64,
    view: Mutex<View>,
}

impl<S: CommentStore> ThreadController<S> {
    pub fn new(store: S, thread: ThreadId) -> ThreadController<S> {
        ThreadController {
            store,
            thread,
            issued: AtomicU64::new(0),
            view: Mutex::new(View::default()),
        }
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn kind(&self) -> ThreadKind {
        self.thread.kind()
    }

    pub fn rows(&self) -> Vec<Row> {
        self.view.lock().rows.clone()
    }

    /// Refetches the whole thread. When several reloads overlap, the one
    /// issued last is the one that stays displayed, whatever order they
    /// complete in.
    pub async fn refresh(&self) -> Result<(), Error> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(thread = ?self.thread, seq, "reloading thread");
        let forest = self.store.fetch_thread(self.thread).await?;
        let rows = render(&forest, self.kind());
        let mut view = self.view.lock();
        if seq < view.applied {
            tracing::debug!(seq, applied = view.applied, "dropping stale reload");
            return Ok(());
        }
        view.applied = seq;
        view.rows = rows;
        Ok(())
    }

    /// Top-level comment
    pub async fn comment(&self, form: &CommentForm) -> Result<Notice, Error> {
        let comment = form.new_comment(self.kind(), None)?;
        self.store.create_comment(self.thread, &comment).await?;
        self.refresh().await?;
        Ok(Notice::CommentAdded(self.kind()))
    }

    /// `level` is the level the reply would be displayed at
    pub async fn reply(
        &self,
        parent: CommentId,
        level: u32,
        form: &CommentForm,
    ) -> Result<Notice, Error> {
        if level >= MAX_REPLY_LEVEL {
            return Err(Error::DepthLimitExceeded { level });
        }
        let comment = form.new_comment(self.kind(), Some(parent))?;
        self.store.create_comment(self.thread, &comment).await?;
        self.refresh().await?;
        Ok(Notice::ReplyAdded)
    }

    pub async fn edit(&self, comment: CommentId, form: &CommentForm) -> Result<Notice, Error> {
        let rated = self
            .view
            .lock()
            .rows
            .iter()
            .any(|r| r.id == comment && r.rate.is_some());
        let edit = form.edit(self.kind(), rated)?;
        self.store
            .edit_comment(self.kind(), comment, &edit)
            .await?;
        self.refresh().await?;
        Ok(Notice::CommentUpdated)
    }

    pub async fn delete(&self, comment: CommentId) -> Result<Notice, Error> {
        self.store.delete_comment(self.kind(), comment).await?;
        self.refresh().await?;
        Ok(Notice::CommentDeleted)
    }

    pub async fn like(&self, comment: CommentId) -> Result<Notice, Error> {
        if !self.kind().has_likes() {
            return Err(ValidationError::LikesUnsupported.into());
        }
        self.store.like_comment(self.kind(), comment).await?;
        self.refresh().await?;
        Ok(Notice::CommentLiked)
    }

    pub async fn unlike(&self, comment: CommentId) -> Result<Notice, Error> {
        if !self.kind().has_likes() {
            return Err(ValidationError::LikesUnsupported.into());
        }
        self.store.unlike_comment(self.kind(), comment).await?;
        self.refresh().await?;
        Ok(Notice::CommentUnliked)
    }

    /// Runs what a row affordance describes. `form` is only read by reply and
    /// edit.
    pub async fn perform(&self, action: &RowAction, form: &CommentForm) -> Result<Notice, Error> {
        match action {
            RowAction::Like(c) => self.like(*c).await,
            RowAction::Unlike(c) => self.unlike(*c).await,
            RowAction::Reply { parent, level } => self.reply(*parent, *level, form).await,
            RowAction::Edit { comment, .. } => self.edit(*comment, form).await,
            RowAction::Delete(c) => self.delete(*c).await,
        }
    }
}
