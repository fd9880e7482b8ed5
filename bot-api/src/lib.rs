//! Wire types of the social API exercised by the bot, shared by the bot and the mock server.
pub mod drain;

use std::fmt;

use bytes::Bytes;
use http_body_util::Full;
use serde::{Deserialize, Serialize};

pub const SIGNUP_PATH: &str = "/accounts/signup/";
pub const TOKEN_PATH: &str = "/accounts/token/";
pub const POSTS_PATH: &str = "/posts/";

pub type PostId = u64;

#[inline]
#[must_use]
pub fn like_path(id: PostId) -> String {
    format!("{POSTS_PATH}{id}/like/")
}

#[inline]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[inline]
pub fn byte_body<B: Into<Bytes>>(bytes: B) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// Encodes `value` as `application/x-www-form-urlencoded`.
#[inline]
pub fn form_body<T: Serialize>(value: &T) -> Result<Full<Bytes>, serde_urlencoded::ser::Error> {
    serde_urlencoded::to_string(value).map(byte_body)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Signup,
    Token,
    CreatePost,
    ListPosts,
    LikePost,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Signup,
        Endpoint::Token,
        Endpoint::CreatePost,
        Endpoint::ListPosts,
        Endpoint::LikePost,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Signup => "signup",
            Endpoint::Token => "login",
            Endpoint::CreatePost => "create_post",
            Endpoint::ListPosts => "list_posts",
            Endpoint::LikePost => "like_post",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Form sent to both signup and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub user: String,
}

/// The only field of a listed post the bot reads.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedPost {
    pub title: String,
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn like_path_embeds_id() {
        assert_eq!("/posts/42/like/", like_path(42));
    }

    #[test]
    fn credentials_are_form_encoded() {
        let form = serde_urlencoded::to_string(Credentials::new("bot_1", "Ab c&d")).unwrap();
        assert_eq!("username=bot_1&password=Ab+c%26d", form);
    }

    #[test]
    fn listed_posts_ignore_extra_fields() {
        let raw = br#"[{"id":3,"title":"t","body":"b","user":"u","likes":[1]},{"id":9}]"#;
        let posts: Vec<PostSummary> = serde_json::from_slice(raw).unwrap();
        assert_eq!(vec![PostSummary { id: 3 }, PostSummary { id: 9 }], posts);
    }
}
