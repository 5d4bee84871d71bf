use std::{net::SocketAddr, sync::Arc};

use anyhow::{anyhow, Context};
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use smokespot_api::{
    Comment, CommentEdit, CommentId, NewComment, PostId, SpotId, ThreadId, ThreadKind,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::{error::Error, extractors::Bearer, MockServer};

pub type SharedServer = Arc<Mutex<MockServer>>;

pub fn router(server: SharedServer) -> Router {
    Router::new()
        .route(
            "/posts/:post/comments",
            get(fetch_post_comments).post(create_post_comment),
        )
        .route(
            "/posts/comments/:comment",
            put(edit_post_comment).delete(delete_post_comment),
        )
        .route(
            "/posts/comments/:comment/likes",
            post(like_comment).delete(unlike_comment),
        )
        .route(
            "/spots/:spot/spotcomments",
            get(fetch_spot_comments).post(create_spot_comment),
        )
        .route(
            "/spots/spotcomments/:comment",
            put(edit_spot_comment).delete(delete_spot_comment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Serves `server` on an ephemeral loopback port until the runtime stops
pub async fn serve(server: MockServer) -> anyhow::Result<(SocketAddr, SharedServer)> {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").context("binding mock server listener")?;
    let addr = listener
        .local_addr()
        .context("reading mock server address")?;
    let server = Arc::new(Mutex::new(server));
    let app = router(server.clone());
    let running = axum::Server::from_tcp(listener)
        .context("starting mock server")?
        .serve(app.into_make_service());
    tokio::spawn(async move {
        if let Err(err) = running.await {
            tracing::error!(?err, "mock server stopped");
        }
    });
    tracing::info!("mock server listening on {}", addr);
    Ok((addr, server))
}

async fn fetch_post_comments(
    State(server): State<SharedServer>,
    Path(post): Path<i64>,
) -> Json<Vec<Comment>> {
    Json(server.lock().await.fetch_thread(ThreadId::Post(PostId(post))))
}

async fn fetch_spot_comments(
    State(server): State<SharedServer>,
    Path(spot): Path<i64>,
) -> Json<Vec<Comment>> {
    Json(server.lock().await.fetch_thread(ThreadId::Spot(SpotId(spot))))
}

async fn create(
    server: SharedServer,
    user: Bearer,
    thread: ThreadId,
    data: NewComment,
) -> Result<Json<Comment>, Error> {
    let mut server = server.lock().await;
    let id = server.create_comment(user.token(), thread, data)?;
    let forest = server.fetch_thread(thread);
    let created = Comment::find_in(&forest, id)
        .cloned()
        .ok_or_else(|| anyhow!("comment {id} missing right after its creation"))?;
    Ok(Json(created))
}

async fn create_post_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(post): Path<i64>,
    Json(data): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    create(server, user, ThreadId::Post(PostId(post)), data).await
}

async fn create_spot_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(spot): Path<i64>,
    Json(data): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    create(server, user, ThreadId::Spot(SpotId(spot)), data).await
}

async fn edit_post_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(comment): Path<i64>,
    Json(data): Json<CommentEdit>,
) -> Result<(), Error> {
    Ok(server
        .lock()
        .await
        .edit_comment(user.token(), ThreadKind::Post, CommentId(comment), data)?)
}

async fn edit_spot_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(comment): Path<i64>,
    Json(data): Json<CommentEdit>,
) -> Result<(), Error> {
    Ok(server
        .lock()
        .await
        .edit_comment(user.token(), ThreadKind::Spot, CommentId(comment), data)?)
}

async fn delete_post_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(comment): Path<i64>,
) -> Result<(), Error> {
    Ok(server
        .lock()
        .await
        .delete_comment(user.token(), ThreadKind::Post, CommentId(comment))?)
}

async fn delete_spot_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(comment): Path<i64>,
) -> Result<(), Error> {
    Ok(server
        .lock()
        .await
        .delete_comment(user.token(), ThreadKind::Spot, CommentId(comment))?)
}

async fn like_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(comment): Path<i64>,
) -> Result<(), Error> {
    Ok(server
        .lock()
        .await
        .like_comment(user.token(), CommentId(comment))?)
}

async fn unlike_comment(
    State(server): State<SharedServer>,
    user: Bearer,
    Path(comment): Path<i64>,
) -> Result<(), Error> {
    Ok(server
        .lock()
        .await
        .unlike_comment(user.token(), CommentId(comment))?)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use smokespot_api::AuthToken;
    use tower::ServiceExt;

    use super::*;

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        tok: Option<&AuthToken>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(tok) = tok {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", tok.0));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        let body = match body.is_empty() {
            true => serde_json::Value::Null,
            false => serde_json::from_slice(&body).unwrap(),
        };
        (status, body)
    }

    fn app() -> (Router, AuthToken, AuthToken) {
        let mut s = MockServer::new();
        let kim = s.add_user("kim", None);
        let lee = s.add_user("lee", None);
        (router(Arc::new(Mutex::new(s))), kim, lee)
    }

    #[tokio::test]
    async fn post_thread_round_trip() {
        let (app, kim, lee) = app();
        let (status, created) = call(
            &app,
            Method::POST,
            "/posts/3/comments",
            Some(&kim),
            Some(serde_json::json!({ "content": "first" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        assert_eq!(created["author"]["nickname"], "kim");

        let (status, _) = call(
            &app,
            Method::POST,
            "/posts/3/comments",
            Some(&lee),
            Some(serde_json::json!({ "content": "second", "parentId": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            Method::POST,
            "/posts/comments/2/likes",
            Some(&kim),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, thread) = call(&app, Method::GET, "/posts/3/comments", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(thread[0]["content"], "first");
        assert_eq!(thread[0]["children"][0]["content"], "second");
        assert_eq!(thread[0]["children"][0]["likenum"], 1);
        assert_eq!(thread[0]["children"][0]["parentId"], 1);
    }

    #[tokio::test]
    async fn refusals_carry_a_message() {
        let (app, kim, lee) = app();
        call(
            &app,
            Method::POST,
            "/posts/3/comments",
            Some(&kim),
            Some(serde_json::json!({ "content": "mine" })),
        )
        .await;

        let (status, body) =
            call(&app, Method::DELETE, "/posts/comments/1", Some(&lee), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "not authorized");
        assert_eq!(body["type"], "permission-denied");

        let (status, body) = call(
            &app,
            Method::PUT,
            "/posts/comments/1",
            Some(&kim),
            Some(serde_json::json!({ "content": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "empty-content");

        let (status, body) =
            call(&app, Method::DELETE, "/posts/comments/9", Some(&kim), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["id"], 9);
    }

    #[tokio::test]
    async fn malformed_authorization_is_refused() {
        let (app, _, _) = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/posts/comments/1/likes")
            .header(header::AUTHORIZATION, "Basic a2ltOmtpbQ==")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn spot_threads() {
        let (app, kim, _) = app();
        let (status, _) = call(
            &app,
            Method::POST,
            "/spots/5/spotcomments",
            Some(&kim),
            Some(serde_json::json!({ "content": "breezy", "rate": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(
            &app,
            Method::PUT,
            "/spots/spotcomments/1",
            Some(&kim),
            Some(serde_json::json!({ "content": "too breezy", "rate": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, thread) = call(&app, Method::GET, "/spots/5/spotcomments", None, None).await;
        assert_eq!(thread[0]["content"], "too breezy");
        assert_eq!(thread[0]["rate"], 2);
        assert_eq!(thread[0]["likenum"], 0);
    }
}
