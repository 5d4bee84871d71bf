use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDate, Utc};
use smokespot_api::{
    Author, AuthToken, Comment, CommentEdit, CommentId, Error, NewComment, ThreadId, ThreadKind,
    Time,
};

mod error;
mod extractors;
mod router;
pub use router::{router, serve, SharedServer};

/// In-memory authoritative store. Comments are kept flat and nested on
/// every fetch.
#[derive(Debug, Default)]
pub struct MockServer {
    sessions: HashMap<AuthToken, Author>,
    comments: BTreeMap<CommentId, StoredComment>,
    next_id: i64,
}

#[derive(Debug)]
struct StoredComment {
    thread: ThreadId,
    author: Author,
    content: String,
    created_at: Time,
    parent_id: Option<CommentId>,
    rate: Option<u8>,
    /// Nicknames of the users who like this comment
    likes: BTreeSet<String>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }

    /// Registers a user and returns a session token for them
    pub fn add_user(&mut self, nickname: &str, started_at: Option<NaiveDate>) -> AuthToken {
        let tok = AuthToken(format!("session-{}-{nickname}", self.sessions.len()));
        self.sessions.insert(
            tok.clone(),
            Author {
                nickname: String::from(nickname),
                started_at,
            },
        );
        tok
    }

    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    fn resolve(&self, tok: Option<&AuthToken>) -> Result<Author, Error> {
        tok.and_then(|t| self.sessions.get(t))
            .cloned()
            .ok_or(Error::PermissionDenied)
    }

    /// Looks `id` up among the comments of threads of kind `kind`
    fn get(&self, kind: ThreadKind, id: CommentId) -> Result<&StoredComment, Error> {
        match self.comments.get(&id) {
            Some(c) if c.thread.kind() == kind => Ok(c),
            _ => Err(Error::NotFound(id)),
        }
    }

    fn owned_by(
        &self,
        tok: Option<&AuthToken>,
        kind: ThreadKind,
        id: CommentId,
    ) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        if self.get(kind, id)?.author.nickname != user.nickname {
            return Err(Error::PermissionDenied);
        }
        Ok(())
    }

    pub fn fetch_thread(&self, thread: ThreadId) -> Vec<Comment> {
        self.assemble(thread, None)
    }

    fn assemble(&self, thread: ThreadId, parent: Option<CommentId>) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|(_, c)| c.thread == thread && c.parent_id == parent)
            .map(|(id, c)| Comment {
                id: *id,
                content: c.content.clone(),
                author: c.author.clone(),
                like_count: c.likes.len() as u64,
                created_at: c.created_at,
                parent_id: c.parent_id,
                rate: c.rate,
                children: self.assemble(thread, Some(*id)),
            })
            .collect()
    }

    pub fn create_comment(
        &mut self,
        tok: Option<&AuthToken>,
        thread: ThreadId,
        comment: NewComment,
    ) -> Result<CommentId, Error> {
        let author = self.resolve(tok)?;
        comment.validate()?;
        if let Some(parent) = comment.parent_id {
            match self.comments.get(&parent) {
                Some(p) if p.thread == thread => (),
                _ => return Err(Error::InvalidParent(parent)),
            }
        }
        self.next_id += 1;
        let id = CommentId(self.next_id);
        self.comments.insert(
            id,
            StoredComment {
                thread,
                author,
                content: comment.content,
                created_at: Utc::now(),
                parent_id: comment.parent_id,
                rate: comment.rate,
                likes: BTreeSet::new(),
            },
        );
        tracing::debug!(?thread, ?id, "comment created");
        Ok(id)
    }

    pub fn edit_comment(
        &mut self,
        tok: Option<&AuthToken>,
        kind: ThreadKind,
        id: CommentId,
        edit: CommentEdit,
    ) -> Result<(), Error> {
        self.owned_by(tok, kind, id)?;
        edit.validate()?;
        if let Some(c) = self.comments.get_mut(&id) {
            c.content = edit.content;
            if edit.rate.is_some() {
                c.rate = edit.rate;
            }
        }
        Ok(())
    }

    /// Removes `id` and everything that replies to it
    pub fn delete_comment(
        &mut self,
        tok: Option<&AuthToken>,
        kind: ThreadKind,
        id: CommentId,
    ) -> Result<(), Error> {
        self.owned_by(tok, kind, id)?;
        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i];
            doomed.extend(
                self.comments
                    .iter()
                    .filter(|(_, c)| c.parent_id == Some(parent))
                    .map(|(id, _)| *id),
            );
            i += 1;
        }
        for id in &doomed {
            self.comments.remove(id);
        }
        tracing::debug!(?id, removed = doomed.len(), "comment deleted");
        Ok(())
    }

    pub fn like_comment(&mut self, tok: Option<&AuthToken>, id: CommentId) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        self.get(ThreadKind::Post, id)?;
        if let Some(c) = self.comments.get_mut(&id) {
            c.likes.insert(user.nickname);
        }
        Ok(())
    }

    pub fn unlike_comment(&mut self, tok: Option<&AuthToken>, id: CommentId) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        self.get(ThreadKind::Post, id)?;
        if let Some(c) = self.comments.get_mut(&id) {
            c.likes.remove(&user.nickname);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use smokespot_api::{PostId, SpotId};

    use super::*;

    const POST: ThreadId = ThreadId::Post(PostId(1));

    fn reply(content: &str, parent: Option<i64>) -> NewComment {
        NewComment {
            content: String::from(content),
            parent_id: parent.map(CommentId),
            rate: None,
        }
    }

    fn shape(forest: &[Comment]) -> Vec<(i64, Vec<i64>)> {
        forest
            .iter()
            .map(|c| (c.id.0, c.children.iter().map(|c| c.id.0).collect()))
            .collect()
    }

    #[test]
    fn assembles_the_forest() {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        let t = Some(&kim);
        s.create_comment(t, POST, reply("a", None)).unwrap();
        s.create_comment(t, POST, reply("b", None)).unwrap();
        s.create_comment(t, POST, reply("a.1", Some(1))).unwrap();
        s.create_comment(t, POST, reply("a.2", Some(1))).unwrap();
        s.create_comment(t, POST, reply("a.1.1", Some(3))).unwrap();
        s.create_comment(t, ThreadId::Post(PostId(2)), reply("elsewhere", None))
            .unwrap();

        let forest = s.fetch_thread(POST);
        assert_eq!(shape(&forest), vec![(1, vec![3, 4]), (2, vec![])]);
        assert_eq!(forest[0].children[0].children[0].content, "a.1.1");
        assert_eq!(forest[0].children[0].parent_id, Some(CommentId(1)));
    }

    #[test]
    fn parent_must_be_in_the_same_thread() {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        s.create_comment(Some(&kim), POST, reply("a", None)).unwrap();
        assert_eq!(
            s.create_comment(
                Some(&kim),
                ThreadId::Post(PostId(2)),
                reply("b", Some(1))
            ),
            Err(Error::InvalidParent(CommentId(1)))
        );
        assert_eq!(
            s.create_comment(Some(&kim), POST, reply("c", Some(42))),
            Err(Error::InvalidParent(CommentId(42)))
        );
    }

    #[test]
    fn anonymous_users_cannot_write() {
        let mut s = MockServer::new();
        assert_eq!(
            s.create_comment(None, POST, reply("a", None)),
            Err(Error::PermissionDenied)
        );
        let forged = AuthToken(String::from("forged"));
        assert_eq!(
            s.create_comment(Some(&forged), POST, reply("a", None)),
            Err(Error::PermissionDenied)
        );
    }

    #[test]
    fn only_the_author_edits_or_deletes() {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        let lee = s.add_user("lee", None);
        s.create_comment(Some(&kim), POST, reply("mine", None))
            .unwrap();
        let edit = CommentEdit {
            content: String::from("yours now"),
            rate: None,
        };
        assert_eq!(
            s.edit_comment(Some(&lee), ThreadKind::Post, CommentId(1), edit.clone()),
            Err(Error::PermissionDenied)
        );
        assert_eq!(
            s.delete_comment(Some(&lee), ThreadKind::Post, CommentId(1)),
            Err(Error::PermissionDenied)
        );
        s.edit_comment(Some(&kim), ThreadKind::Post, CommentId(1), edit)
            .unwrap();
        assert_eq!(s.fetch_thread(POST)[0].content, "yours now");
    }

    #[test]
    fn delete_takes_the_subtree() {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        let t = Some(&kim);
        s.create_comment(t, POST, reply("a", None)).unwrap();
        s.create_comment(t, POST, reply("a.1", Some(1))).unwrap();
        s.create_comment(t, POST, reply("a.1.1", Some(2))).unwrap();
        s.create_comment(t, POST, reply("b", None)).unwrap();
        s.delete_comment(t, ThreadKind::Post, CommentId(1)).unwrap();
        assert_eq!(shape(&s.fetch_thread(POST)), vec![(4, vec![])]);
        assert_eq!(s.test_num_comments(), 1);
    }

    #[test]
    fn likes_are_a_set() {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        let lee = s.add_user("lee", None);
        s.create_comment(Some(&kim), POST, reply("a", None)).unwrap();
        s.like_comment(Some(&kim), CommentId(1)).unwrap();
        s.like_comment(Some(&kim), CommentId(1)).unwrap();
        s.like_comment(Some(&lee), CommentId(1)).unwrap();
        assert_eq!(s.fetch_thread(POST)[0].like_count, 2);
        s.unlike_comment(Some(&kim), CommentId(1)).unwrap();
        s.unlike_comment(Some(&kim), CommentId(1)).unwrap();
        assert_eq!(s.fetch_thread(POST)[0].like_count, 1);
    }

    #[test]
    fn comment_kinds_do_not_mix() {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        let spot = ThreadId::Spot(SpotId(9));
        s.create_comment(
            Some(&kim),
            spot,
            NewComment {
                content: String::from("good view"),
                parent_id: None,
                rate: Some(5),
            },
        )
        .unwrap();
        assert_eq!(
            s.like_comment(Some(&kim), CommentId(1)),
            Err(Error::NotFound(CommentId(1)))
        );
        assert_eq!(
            s.delete_comment(Some(&kim), ThreadKind::Post, CommentId(1)),
            Err(Error::NotFound(CommentId(1)))
        );
        assert_eq!(s.fetch_thread(spot)[0].rate, Some(5));
        s.delete_comment(Some(&kim), ThreadKind::Spot, CommentId(1))
            .unwrap();
        assert!(s.fetch_thread(spot).is_empty());
    }

    #[test]
    fn validates_like_the_client() {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        assert_eq!(
            s.create_comment(Some(&kim), POST, reply("", None)),
            Err(Error::EmptyContent)
        );
    }
}
