//! In-memory stand-in for the social API: accounts, bearer tokens, posts and likes.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use bot_api::{
    Credentials, LikedPost, NewPost, Post, PostId, SignupResponse, TokenResponse, POSTS_PATH,
    SIGNUP_PATH, TOKEN_PATH,
};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    pub username: String,
    pub post_id: PostId,
}

#[derive(Default)]
struct Store {
    passwords: HashMap<String, String>,
    signup_order: Vec<String>,
    tokens: HashMap<String, String>,
    posts: Vec<Post>,
    likes: Vec<Like>,
    next_post_id: PostId,
    next_token: u64,
}

impl Store {
    fn insert_post(&mut self, title: String, body: String, user: String) -> Post {
        self.next_post_id += 1;
        let post = Post {
            id: self.next_post_id,
            title,
            body,
            user,
        };
        self.posts.push(post.clone());
        post
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<String, ApiFailure> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|hv| hv.to_str().ok())
            .and_then(|hv| hv.strip_prefix("Bearer "))
            .ok_or(ApiFailure::Unauthorized)?;
        self.tokens
            .get(token)
            .cloned()
            .ok_or(ApiFailure::Unauthorized)
    }
}

/// Shared handle to the server state, cheap to clone into handlers and tests.
#[derive(Clone, Default)]
pub struct MockState {
    store: Arc<Mutex<Store>>,
}

impl MockState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registered usernames in signup order.
    #[must_use]
    pub fn usernames(&self) -> Vec<String> {
        self.store().signup_order.clone()
    }

    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.store().posts.clone()
    }

    #[must_use]
    pub fn likes(&self) -> Vec<Like> {
        self.store().likes.clone()
    }

    /// Creates a post directly, bypassing authentication.
    pub fn insert_post(&self, title: &str, body: &str, user: &str) -> Post {
        self.store()
            .insert_post(title.to_owned(), body.to_owned(), user.to_owned())
    }
}

#[derive(Debug)]
pub enum ApiFailure {
    BadRequest(String),
    Unauthorized,
    NotFound,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiFailure::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiFailure::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided or are invalid.".to_owned(),
            ),
            ApiFailure::NotFound => (StatusCode::NOT_FOUND, "Not found.".to_owned()),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route(SIGNUP_PATH, post(signup))
        .route(TOKEN_PATH, post(token))
        .route(POSTS_PATH, get(list_posts).post(create_post))
        .route("/posts/:id/like/", post(like_post))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: MockState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

async fn signup(
    State(state): State<MockState>,
    Form(creds): Form<Credentials>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiFailure> {
    if creds.username.is_empty() || creds.password.is_empty() {
        return Err(ApiFailure::BadRequest(
            "username and password are required".to_owned(),
        ));
    }
    let mut store = state.store();
    if store.passwords.contains_key(&creds.username) {
        return Err(ApiFailure::BadRequest(
            "A user with that username already exists.".to_owned(),
        ));
    }
    store
        .passwords
        .insert(creds.username.clone(), creds.password);
    store.signup_order.push(creds.username.clone());
    tracing::info!(username = %creds.username, "Signed up");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            username: creds.username,
        }),
    ))
}

async fn token(
    State(state): State<MockState>,
    Form(creds): Form<Credentials>,
) -> Result<Json<TokenResponse>, ApiFailure> {
    let mut store = state.store();
    if store.passwords.get(&creds.username) != Some(&creds.password) {
        return Err(ApiFailure::Unauthorized);
    }
    store.next_token += 1;
    let access = format!("token-{}-{}", store.next_token, creds.username);
    store.tokens.insert(access.clone(), creds.username);
    Ok(Json(TokenResponse { access }))
}

async fn list_posts(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Post>>, ApiFailure> {
    let store = state.store();
    store.authorize(&headers)?;
    Ok(Json(store.posts.clone()))
}

async fn create_post(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(new_post): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), ApiFailure> {
    let mut store = state.store();
    let owner = store.authorize(&headers)?;
    if new_post.user != owner {
        return Err(ApiFailure::BadRequest(format!(
            "cannot create a post for {} as {owner}",
            new_post.user
        )));
    }
    let post = store.insert_post(new_post.title, new_post.body, owner);
    Ok((StatusCode::CREATED, Json(post)))
}

async fn like_post(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<PostId>,
) -> Result<Json<LikedPost>, ApiFailure> {
    let mut store = state.store();
    let username = store.authorize(&headers)?;
    let post = store
        .posts
        .iter()
        .find(|post| post.id == id)
        .ok_or(ApiFailure::NotFound)?;
    let liked = LikedPost {
        title: post.title.clone(),
        user: post.user.clone(),
    };
    store.likes.push(Like {
        username,
        post_id: id,
    });
    Ok(Json(liked))
}
