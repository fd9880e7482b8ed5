use rand::Rng;

use crate::client::{ApiClient, Transport};
use crate::config::{BotConfig, FailurePolicy, RunSettings};
use crate::content::{create_posts, like_posts};
use crate::credentials::Clock;
use crate::error::{BotError, RunError};
use crate::session::establish;
use crate::statistics::RunSummary;

/// Loads the config named by `settings`, then runs it against `settings.api_url`.
///
/// A config that fails to load stops the run before any request is sent.
pub async fn run_from_settings<T, R, C>(
    settings: &RunSettings,
    transport: T,
    rng: R,
    clock: C,
) -> Result<RunSummary, RunError>
where
    T: Transport,
    R: Rng,
    C: Clock,
{
    let config = BotConfig::load(&settings.config_path)?;
    tracing::info!(api_url = %settings.api_url, ?config, "Starting bot");
    let api = ApiClient::new(transport, settings.api_url.as_str());
    let mut bot = Bot::new(api, rng, clock);
    Ok(bot.run(&config).await?)
}

/// Drives whole runs: every simulated user signs up, posts, then likes.
pub struct Bot<T, R, C> {
    api: ApiClient<T>,
    rng: R,
    clock: C,
}

impl<T, R, C> Bot<T, R, C>
where
    T: Transport,
    R: Rng,
    C: Clock,
{
    pub fn new(api: ApiClient<T>, rng: R, clock: C) -> Self {
        Self { api, rng, clock }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Runs `config.number_of_users` user sequences one after another.
    ///
    /// With [`FailurePolicy::Abort`] the first failure is returned. With
    /// [`FailurePolicy::ContinueWithNextUser`] failures are logged, counted in
    /// [`RunSummary::failed_users`] and the next user starts.
    pub async fn run(&mut self, config: &BotConfig) -> Result<RunSummary, BotError> {
        let mut summary = RunSummary::new(*config);
        for user in 0..config.number_of_users {
            if let Err(e) = self.run_user(config, &mut summary).await {
                match config.on_failure {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::ContinueWithNextUser => {
                        tracing::error!(user = user + 1, error = %e, "User sequence failed, continuing");
                        summary.failed_users += 1;
                    }
                }
            }
        }
        summary.requests = self.api.statistics().clone();
        Ok(summary)
    }

    async fn run_user(
        &mut self,
        config: &BotConfig,
        summary: &mut RunSummary,
    ) -> Result<(), BotError> {
        let session = establish(&mut self.api, &mut self.rng, &self.clock, None, None).await?;
        summary.users_created += 1;
        summary.posts_created += create_posts(
            &mut self.api,
            &self.clock,
            config.max_posts_per_user,
            &session,
            None,
            None,
        )
        .await?;
        summary.likes_given +=
            like_posts(&mut self.api, &mut self.rng, config.max_likes_per_user, &session).await?;
        Ok(())
    }
}
