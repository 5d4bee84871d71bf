#![cfg(test)]

use smokespot_mock_server::{serve, MockServer};

use crate::{
    api::{AuthToken, CommentId, PostId, SpotId, ThreadId, ThreadKind},
    CommentForm, Error, HttpStore, Notice, RowAction, ThreadController, ValidationError,
};

const POST: ThreadId = ThreadId::Post(PostId(11));

async fn start() -> (String, AuthToken, AuthToken) {
    let mut server = MockServer::new();
    let kim = server.add_user("kim", None);
    let lee = server.add_user("lee", None);
    let (addr, _) = serve(server).await.expect("starting mock server");
    (format!("http://{addr}"), kim, lee)
}

#[tokio::test]
async fn threaded_conversation() {
    let (host, kim, lee) = start().await;
    let as_kim = ThreadController::new(HttpStore::new(host.clone(), Some(kim)), POST);
    let as_lee = ThreadController::new(HttpStore::new(host, Some(lee)), POST);

    as_kim.refresh().await.unwrap();
    assert!(as_kim.rows().is_empty());

    assert_eq!(
        as_kim.comment(&CommentForm::new("root")).await.unwrap(),
        Notice::CommentAdded(ThreadKind::Post)
    );
    as_lee.refresh().await.unwrap();
    let root = as_lee.rows()[0].clone();
    assert_eq!(root.author.nickname, "kim");

    let reply = RowAction::Reply {
        parent: root.id,
        level: 1,
    };
    assert_eq!(
        as_lee
            .perform(&reply, &CommentForm::new("child"))
            .await
            .unwrap(),
        Notice::ReplyAdded
    );
    let child = as_lee.rows()[1].clone();
    assert_eq!((child.level, child.indent_px), (1, 20));
    as_kim
        .reply(child.id, 2, &CommentForm::new("grandchild"))
        .await
        .unwrap();

    let rows = as_kim.rows();
    assert_eq!(
        rows.iter()
            .map(|r| (r.content.as_str(), r.level))
            .collect::<Vec<_>>(),
        vec![("root", 0), ("child", 1), ("grandchild", 2)]
    );

    let err = as_kim
        .reply(rows[2].id, 3, &CommentForm::new("great-grandchild"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DepthLimitExceeded { level: 3 }));
    as_kim.refresh().await.unwrap();
    assert_eq!(as_kim.rows().len(), 3);
}

#[tokio::test]
async fn likes_come_back_from_the_store() {
    let (host, kim, lee) = start().await;
    let as_kim = ThreadController::new(HttpStore::new(host.clone(), Some(kim)), POST);
    let as_lee = ThreadController::new(HttpStore::new(host, Some(lee)), POST);
    as_kim.comment(&CommentForm::new("like me")).await.unwrap();
    let id = as_kim.rows()[0].id;

    as_kim.like(id).await.unwrap();
    as_kim.like(id).await.unwrap();
    assert_eq!(as_kim.rows()[0].like_count, 1);
    as_lee.like(id).await.unwrap();
    assert_eq!(as_lee.rows()[0].like_count, 2);
    as_kim.unlike(id).await.unwrap();
    assert_eq!(as_kim.rows()[0].like_count, 1);
}

#[tokio::test]
async fn refused_delete_surfaces_the_store_message() {
    let (host, kim, lee) = start().await;
    let as_kim = ThreadController::new(HttpStore::new(host.clone(), Some(kim)), POST);
    let as_lee = ThreadController::new(HttpStore::new(host, Some(lee)), POST);
    as_kim.comment(&CommentForm::new("root")).await.unwrap();
    as_kim
        .reply(CommentId(1), 1, &CommentForm::new("child"))
        .await
        .unwrap();
    as_lee.refresh().await.unwrap();
    let before = as_lee.rows();

    let err = as_lee.delete(CommentId(1)).await.unwrap_err();
    assert_eq!(err.to_string(), "not authorized");
    assert_eq!(as_lee.rows(), before);

    as_kim.delete(CommentId(1)).await.unwrap();
    assert!(as_kim.rows().is_empty());
}

#[tokio::test]
async fn edits_and_spot_threads() {
    let (host, kim, _) = start().await;
    let spot = ThreadController::new(
        HttpStore::new(host, Some(kim)),
        ThreadId::Spot(SpotId(4)),
    );
    spot.comment(&CommentForm::new("shade").with_rate(4))
        .await
        .unwrap();
    let row = spot.rows()[0].clone();
    assert_eq!(row.rate, Some(4));
    assert!(matches!(
        spot.like(row.id).await,
        Err(Error::Validation(ValidationError::LikesUnsupported))
    ));

    assert!(matches!(
        spot.edit(row.id, &CommentForm::new("")).await,
        Err(Error::Validation(ValidationError::EmptyContent))
    ));
    assert!(matches!(
        spot.edit(row.id, &CommentForm::new("more shade")).await,
        Err(Error::Validation(ValidationError::MissingRate))
    ));
    spot.edit(row.id, &CommentForm::new("more shade").with_rate(5))
        .await
        .unwrap();
    let row = spot.rows()[0].clone();
    assert_eq!((row.content.as_str(), row.rate), ("more shade", Some(5)));
}

#[tokio::test]
async fn anonymous_reads_but_cannot_write() {
    let (host, kim, _) = start().await;
    let as_kim = ThreadController::new(HttpStore::new(host.clone(), Some(kim)), POST);
    as_kim.comment(&CommentForm::new("hello")).await.unwrap();

    let anon = ThreadController::new(HttpStore::new(host, None), POST);
    anon.refresh().await.unwrap();
    assert_eq!(anon.rows().len(), 1);
    let err = anon.like(CommentId(1)).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(err.to_string(), "not authorized");
}

#[tokio::test]
async fn unreachable_store_uses_the_generic_message() {
    let c = ThreadController::new(HttpStore::new("http://127.0.0.1:9", None), POST);
    let err = c.refresh().await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
    assert_eq!(err.to_string(), "Failed to fetch comments");
}
