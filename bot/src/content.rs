//! Post creation and liking for an established session.
use bot_api::{NewPost, PostId};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::client::{ApiClient, Transport};
use crate::credentials::{post_title, Clock, DEFAULT_POST_BODY};
use crate::error::BotError;
use crate::session::Session;

/// Creates `count` posts owned by the session's user, one request each.
///
/// Stops at the first failure; posts created before it stay on the server.
pub async fn create_posts<T, C>(
    api: &mut ApiClient<T>,
    clock: &C,
    count: usize,
    session: &Session,
    title: Option<&str>,
    body: Option<&str>,
) -> Result<usize, BotError>
where
    T: Transport,
    C: Clock,
{
    for n in 0..count {
        let post = NewPost {
            title: title.map_or_else(|| post_title(clock), str::to_owned),
            body: body.unwrap_or(DEFAULT_POST_BODY).to_owned(),
            user: session.username.clone(),
        };
        let created = api.create_post(&session.token, &post).await?;
        tracing::info!(
            n = n + 1,
            title = %created.title,
            body = %created.body,
            user = %session.username,
            "Post created"
        );
    }
    Ok(count)
}

/// Likes `count` posts drawn with replacement from one snapshot of the post list.
pub async fn like_posts<T, R>(
    api: &mut ApiClient<T>,
    rng: &mut R,
    count: usize,
    session: &Session,
) -> Result<usize, BotError>
where
    T: Transport,
    R: Rng + ?Sized,
{
    let snapshot: Vec<PostId> = api
        .list_posts(&session.token)
        .await?
        .into_iter()
        .map(|post| post.id)
        .collect();
    tracing::debug!(candidates = snapshot.len(), "Fetched post snapshot");
    for n in 0..count {
        let id = *snapshot.choose(rng).ok_or(BotError::NoPostsToLike)?;
        let liked = api.like_post(&session.token, id).await?;
        tracing::info!(
            n = n + 1,
            id,
            title = %liked.title,
            author = %liked.user,
            "Liked post"
        );
    }
    Ok(count)
}
