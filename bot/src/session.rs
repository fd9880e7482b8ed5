use rand::Rng;

use crate::client::{ApiClient, Transport};
use crate::credentials::{self, Clock};
use crate::error::BotError;

/// An authenticated user, valid for one simulated user's actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

/// Signs up and logs in a user, generating whichever credential is not given.
///
/// The returned username is the one the server confirmed on signup.
pub async fn establish<T, R, C>(
    api: &mut ApiClient<T>,
    rng: &mut R,
    clock: &C,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Session, BotError>
where
    T: Transport,
    R: Rng + ?Sized,
    C: Clock,
{
    let creds = credentials::credentials(rng, clock, username, password);
    let signed_up = api.signup(&creds).await?;
    let token = api.login(&creds).await?;
    tracing::info!(username = %signed_up.username, "Successfully created and logged in user");
    Ok(Session {
        username: signed_up.username,
        token: token.access,
    })
}
