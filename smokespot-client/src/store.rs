use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;

use crate::{
    api::{self, AuthToken, Comment, CommentEdit, CommentId, NewComment, ThreadId, ThreadKind},
    Error, ValidationError,
};

/// The authoritative comment store. Implementations never cache: every call
/// is one request.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn fetch_thread(&self, thread: ThreadId) -> Result<Vec<Comment>, Error>;
    async fn create_comment(&self, thread: ThreadId, comment: &NewComment) -> Result<(), Error>;
    async fn edit_comment(
        &self,
        kind: ThreadKind,
        comment: CommentId,
        edit: &CommentEdit,
    ) -> Result<(), Error>;
    async fn delete_comment(&self, kind: ThreadKind, comment: CommentId) -> Result<(), Error>;
    async fn like_comment(&self, kind: ThreadKind, comment: CommentId) -> Result<(), Error>;
    async fn unlike_comment(&self, kind: ThreadKind, comment: CommentId) -> Result<(), Error>;
}

pub struct HttpStore {
    client: reqwest::Client,
    host: String,
    token: Option<AuthToken>,
}

impl HttpStore {
    pub fn new(host: impl Into<String>, token: Option<AuthToken>) -> HttpStore {
        HttpStore {
            client: reqwest::Client::new(),
            host: host.into(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.request(
            method,
            format!("{}/{}", self.host.trim_end_matches('/'), path),
        );
        match &self.token {
            Some(tok) => req.bearer_auth(&tok.0),
            None => req,
        }
    }

    /// Sends `req`, turning any non-success answer into an `Error`. `context`
    /// is what the user sees when the store gives no usable message.
    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        context: &'static str,
    ) -> Result<reqwest::Response, Error> {
        let resp = req.send().await.map_err(|err| {
            tracing::warn!(?err, context, "request to comment store failed");
            Error::transport(context, err)
        })?;
        check(resp, context).await
    }
}

async fn check(resp: reqwest::Response, context: &'static str) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .bytes()
        .await
        .map_err(|err| Error::transport(context, err))?;
    match api::ErrorReport::parse(&body) {
        Ok(err) => {
            tracing::debug!(%status, error = ?err.error, "comment store refused request");
            Err(Error::Store(err))
        }
        Err(err) => {
            tracing::warn!(%status, ?err, "unreadable error from comment store");
            Err(Error::transport(
                context,
                err.context(format!("comment store answered {status}")),
            ))
        }
    }
}

const FETCH_FAILED: &str = "Failed to fetch comments";
const REPLY_FAILED: &str = "Failed to post reply";
const COMMENT_FAILED: &str = "Failed to post comment";
const EDIT_FAILED: &str = "Failed to update comment";
const DELETE_FAILED: &str = "Failed to delete comment";
const LIKE_FAILED: &str = "Failed to like the comment";
const UNLIKE_FAILED: &str = "Failed to unlike the comment";

#[async_trait]
impl CommentStore for HttpStore {
    async fn fetch_thread(&self, thread: ThreadId) -> Result<Vec<Comment>, Error> {
        self.send(
            self.request(Method::GET, &thread.comments_path()),
            FETCH_FAILED,
        )
        .await?
        .json()
        .await
        .with_context(|| format!("parsing comments of {thread:?}"))
        .map_err(|err| Error::transport(FETCH_FAILED, err))
    }

    async fn create_comment(&self, thread: ThreadId, comment: &NewComment) -> Result<(), Error> {
        let context = match comment.parent_id {
            Some(_) => REPLY_FAILED,
            None => COMMENT_FAILED,
        };
        self.send(
            self.request(Method::POST, &thread.comments_path())
                .json(comment),
            context,
        )
        .await?;
        Ok(())
    }

    async fn edit_comment(
        &self,
        kind: ThreadKind,
        comment: CommentId,
        edit: &CommentEdit,
    ) -> Result<(), Error> {
        self.send(
            self.request(Method::PUT, &kind.comment_path(comment))
                .json(edit),
            EDIT_FAILED,
        )
        .await?;
        Ok(())
    }

    async fn delete_comment(&self, kind: ThreadKind, comment: CommentId) -> Result<(), Error> {
        self.send(
            self.request(Method::DELETE, &kind.comment_path(comment)),
            DELETE_FAILED,
        )
        .await?;
        Ok(())
    }

    async fn like_comment(&self, kind: ThreadKind, comment: CommentId) -> Result<(), Error> {
        let path = kind
            .likes_path(comment)
            .ok_or(ValidationError::LikesUnsupported)?;
        self.send(self.request(Method::POST, &path), LIKE_FAILED)
            .await?;
        Ok(())
    }

    async fn unlike_comment(&self, kind: ThreadKind, comment: CommentId) -> Result<(), Error> {
        let path = kind
            .likes_path(comment)
            .ok_or(ValidationError::LikesUnsupported)?;
        self.send(self.request(Method::DELETE, &path), UNLIKE_FAILED)
            .await?;
        Ok(())
    }
}
