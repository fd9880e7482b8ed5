use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use bot_api::Endpoint;

use crate::config::BotConfig;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EndpointStatistics {
    pub count: u64,
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
}

impl EndpointStatistics {
    fn first(rtt: Duration) -> Self {
        Self {
            count: 1,
            min: rtt,
            max: rtt,
            total: rtt,
        }
    }

    fn update(&mut self, rtt: Duration) {
        if rtt < self.min {
            self.min = rtt;
        }
        if rtt > self.max {
            self.max = rtt;
        }
        self.total += rtt;
        self.count += 1;
    }

    #[inline]
    #[must_use]
    pub fn mean_micros(&self) -> f64 {
        self.total.as_micros() as f64 / self.count as f64
    }
}

/// Round-trip times per endpoint, successful or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatistics {
    per_endpoint: BTreeMap<Endpoint, EndpointStatistics>,
}

impl RequestStatistics {
    pub fn record(&mut self, endpoint: Endpoint, rtt: Duration) {
        self.per_endpoint
            .entry(endpoint)
            .and_modify(|stats| stats.update(rtt))
            .or_insert_with(|| EndpointStatistics::first(rtt));
    }

    #[must_use]
    pub fn get(&self, endpoint: Endpoint) -> Option<&EndpointStatistics> {
        self.per_endpoint.get(&endpoint)
    }

    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.per_endpoint.values().map(|s| s.count).sum()
    }
}

impl fmt::Display for RequestStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for endpoint in Endpoint::ALL {
            let Some(stats) = self.get(endpoint) else {
                continue;
            };
            writeln!(
                f,
                "    {:<12} my s [n, min, mean, max] = [{}, {}, {:.2}, {}]",
                endpoint.name(),
                stats.count,
                stats.min.as_micros(),
                stats.mean_micros(),
                stats.max.as_micros(),
            )?;
        }
        Ok(())
    }
}

/// Configured versus achieved work of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub config: BotConfig,
    pub users_created: usize,
    pub posts_created: usize,
    pub likes_given: usize,
    pub failed_users: usize,
    pub requests: RequestStatistics,
}

impl RunSummary {
    #[must_use]
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            users_created: 0,
            posts_created: 0,
            likes_given: 0,
            failed_users: 0,
            requests: RequestStatistics::default(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bar = "=".repeat(20);
        writeln!(f, "{bar}")?;
        writeln!(
            f,
            "Bot finished\n{}: users created, {}: posts created, {} likes left :) ",
            self.config.number_of_users,
            self.config.number_of_users * self.config.max_posts_per_user,
            self.config.number_of_users * self.config.max_likes_per_user,
        )?;
        writeln!(
            f,
            "Achieved: {} users, {} posts, {} likes, {} failed users",
            self.users_created, self.posts_created, self.likes_given, self.failed_users,
        )?;
        writeln!(f, "Requests ({} total):", self.requests.total_requests())?;
        write!(f, "{}", self.requests)?;
        writeln!(f, "{bar}")
    }
}
